//! The key-value capability working memory is stored in.
//!
//! Two families of operations: single-key blobs (`get`/`set`/`set_ex`/
//! `delete`) holding serialized documents, and per-namespace sorted sets
//! (`index_add`/`index_page`) holding session ids for pagination.
//! `set_indexed` spans both and is what document writes go through.

pub mod memory_kv;
pub mod redis_kv;

pub use memory_kv::MemoryKvStore;
pub use redis_kv::RedisKvStore;

use async_trait::async_trait;
use wm_domain::error::Result;

/// One page of a session index plus the index's total size, read together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexPage {
    pub total: u64,
    pub members: Vec<String>,
}

/// Sorted-set registration that travels with a document write.
#[derive(Debug, Clone, Copy)]
pub struct IndexEntry<'a> {
    pub index_key: &'a str,
    pub member: &'a str,
    pub score: f64,
}

/// Abstraction over the external key-value store.
///
/// Every failure is reported as `Error::Store`. Implementations must make
/// `set_ex` atomic (the key is never observable without its expiry), must
/// apply `set_indexed` all-or-nothing, and must read both halves of
/// `index_page` from the same snapshot.
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Store without expiry, replacing any previous value and TTL.
    async fn set(&self, key: &str, value: Vec<u8>) -> Result<()>;

    /// Store with an expiry of `ttl_seconds`, replacing any previous value.
    async fn set_ex(&self, key: &str, ttl_seconds: u64, value: Vec<u8>) -> Result<()>;

    /// Store `value` (with an expiry when `ttl_seconds` is set) and add
    /// `index.member` to `index.index_key`, as one atomic unit. On error
    /// neither change is visible.
    async fn set_indexed(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl_seconds: Option<u64>,
        index: IndexEntry<'_>,
    ) -> Result<()>;

    /// Remove `key`. Removing a missing key succeeds.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Add `member` to the sorted set at `index_key`, or update its score.
    async fn index_add(&self, index_key: &str, member: &str, score: f64) -> Result<()>;

    /// Cardinality of the sorted set and its members ranked `start..=stop`
    /// (ascending by score, ties by member), as one atomic batch.
    async fn index_page(&self, index_key: &str, start: usize, stop: usize) -> Result<IndexPage>;
}
