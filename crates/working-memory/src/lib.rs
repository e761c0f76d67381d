//! Session-scoped working memory for conversational agents.
//!
//! Each session's active messages, memory candidates, free-form context and
//! metadata live as one JSON document in a key-value store, optionally with
//! a TTL. When a document has expired or never existed, it can be rebuilt
//! from message records in long-term memory.
//!
//! [`WorkingMemoryManager`] is the entry point; [`build_manager`] wires it
//! from configuration.

pub mod gateway;
pub mod keys;
pub mod manager;
pub mod model;
pub mod reconstruct;
pub mod store;

pub use gateway::{ReadOutcome, StoreGateway};
pub use keys::{session_index_key, working_memory_key};
pub use manager::WorkingMemoryManager;
pub use model::{
    MemoryMessage, MemoryRecord, MemoryStrategy, MemoryStrategyConfig, MemoryType, WorkingMemory,
};
pub use reconstruct::Reconstructor;
pub use store::{IndexEntry, IndexPage, KvStore, MemoryKvStore, RedisKvStore};

use std::sync::Arc;

use wm_domain::config::{Config, ConfigSeverity};
use wm_domain::error::{Error, Result};

/// Build a [`WorkingMemoryManager`] from configuration.
///
/// | `store.redis_url` | Store           |
/// |-------------------|-----------------|
/// | set               | [`RedisKvStore`] |
/// | unset             | [`MemoryKvStore`] |
///
/// The config is validated first; any error-severity issue is returned as
/// `Error::Config` before a store is opened. The long-term search client is
/// only created when reconstruction is enabled.
pub async fn build_manager(cfg: &Config) -> Result<WorkingMemoryManager> {
    let problems: Vec<String> = cfg
        .validate()
        .into_iter()
        .filter(|issue| issue.severity == ConfigSeverity::Error)
        .map(|issue| issue.to_string())
        .collect();
    if !problems.is_empty() {
        return Err(Error::Config(problems.join("; ")));
    }

    let kv: Arc<dyn KvStore> = match &cfg.store.redis_url {
        Some(url) => Arc::new(RedisKvStore::connect(url).await?),
        None => {
            tracing::warn!("no store.redis_url configured; using in-process store");
            Arc::new(MemoryKvStore::new())
        }
    };

    let search = if cfg.working_memory.reconstruct_from_long_term {
        Some(wm_longterm::create_provider(&cfg.long_term)?)
    } else {
        None
    };

    Ok(WorkingMemoryManager::new(kv, search, &cfg.working_memory))
}
