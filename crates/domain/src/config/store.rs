use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Key-value store connection
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Where working memory lives.
///
/// With no `redis_url` the process keeps working memory in an in-memory
/// store, which is only useful for tests and local experiments: nothing
/// survives a restart.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StoreConfig {
    /// e.g. `redis://127.0.0.1:6379/0`
    #[serde(default)]
    pub redis_url: Option<String>,
}
