//! The `LongTermSearchProvider` trait defines the interface for every
//! long-term memory search backend (REST, test doubles).

use async_trait::async_trait;
use wm_domain::error::Result;

use crate::types::{LongTermSearchRequest, LongTermSearchResponse};

/// Search capability over the durable long-term memory index.
///
/// Filters are exact-match; an empty `text` means metadata-only filtering.
/// Implementations surface transport and decode failures as errors; deciding
/// whether to tolerate them is the caller's job.
#[async_trait]
pub trait LongTermSearchProvider: Send + Sync {
    async fn search(&self, req: LongTermSearchRequest) -> Result<LongTermSearchResponse>;
}
