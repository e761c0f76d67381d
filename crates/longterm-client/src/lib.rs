//! `wm-longterm`: long-term memory search client.
//!
//! Provides the [`LongTermSearchProvider`] trait that abstracts over the
//! durable long-term memory index, a production REST implementation
//! ([`RestLongTermClient`]), and typed DTOs for the search endpoint.
//!
//! Working memory only ever *reads* long-term memory (to reconstruct an
//! expired session), so the surface here is search and nothing else.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use wm_domain::config::LongTermConfig;
//! use wm_longterm::{LongTermSearchProvider, LongTermSearchRequest, RestLongTermClient};
//!
//! # async fn example() -> wm_domain::error::Result<()> {
//! let cfg = LongTermConfig::default();
//! let client = RestLongTermClient::new(&cfg)?;
//!
//! let results = client
//!     .search(LongTermSearchRequest::session_messages("session-1", None, None, 50))
//!     .await?;
//!
//! println!("found {} records", results.memories.len());
//! # Ok(())
//! # }
//! ```

pub mod provider;
pub mod rest;
pub mod types;

// ── Re-exports for ergonomic imports ─────────────────────────────────

pub use provider::LongTermSearchProvider;
pub use rest::{from_reqwest, RestLongTermClient};
pub use types::{
    EqFilter, LongTermMemory, LongTermSearchRequest, LongTermSearchResponse, MESSAGE_MEMORY_TYPE,
};

use std::sync::Arc;

use wm_domain::config::LongTermConfig;
use wm_domain::error::Result;

/// Build the shared [`LongTermSearchProvider`] for this process.
pub fn create_provider(cfg: &LongTermConfig) -> Result<Arc<dyn LongTermSearchProvider>> {
    let client = RestLongTermClient::new(cfg)?;
    tracing::info!(
        base_url = %cfg.base_url,
        timeout_ms = cfg.timeout_ms,
        max_retries = cfg.max_retries,
        "long-term search client ready"
    );
    Ok(Arc::new(client))
}
