use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Working memory behaviour
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkingMemoryConfig {
    /// Rebuild working memory from long-term message records when the
    /// fast-path key is missing or expired. Only meaningful when every
    /// message is also indexed in long-term memory.
    #[serde(default)]
    pub reconstruct_from_long_term: bool,

    /// Search cap used by reconstruction when the caller gives no
    /// recent-messages limit.
    #[serde(default = "d_reconstruction_limit")]
    pub reconstruction_default_limit: usize,

    /// Page size used by `wmctl list` when `--limit` is omitted.
    #[serde(default = "d_list_limit")]
    pub default_list_limit: usize,

    /// Namespace applied by `wmctl` when `--namespace` is omitted.
    #[serde(default)]
    pub default_namespace: Option<String>,
}

impl Default for WorkingMemoryConfig {
    fn default() -> Self {
        Self {
            reconstruct_from_long_term: false,
            reconstruction_default_limit: d_reconstruction_limit(),
            default_list_limit: d_list_limit(),
            default_namespace: None,
        }
    }
}

fn d_reconstruction_limit() -> usize {
    1000
}

fn d_list_limit() -> usize {
    10
}
