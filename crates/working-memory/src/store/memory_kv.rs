//! In-process [`KvStore`].
//!
//! Keeps blobs and sorted sets behind a single `RwLock` so an index page is
//! read from one consistent snapshot. Expiry uses `tokio::time::Instant`,
//! which lets tests pause and advance the clock. Expired keys are treated as
//! absent on read and dropped on the next write.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use tokio::time::{Duration, Instant};
use wm_domain::error::Result;

use super::{IndexEntry, IndexPage, KvStore};

#[derive(Debug, Clone)]
struct Entry {
    value: Vec<u8>,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |at| now < at)
    }
}

#[derive(Debug, Default)]
struct Inner {
    values: HashMap<String, Entry>,
    /// index key -> member -> score
    indexes: HashMap<String, HashMap<String, f64>>,
}

impl Inner {
    fn purge_expired(&mut self, now: Instant) {
        self.values.retain(|_, e| e.is_live(now));
    }
}

/// Key-value store living in process memory. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryKvStore {
    inner: RwLock<Inner>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `key` currently holds an unexpired value.
    pub fn contains_key(&self, key: &str) -> bool {
        let now = Instant::now();
        self.inner
            .read()
            .values
            .get(key)
            .is_some_and(|e| e.is_live(now))
    }

    /// Remaining time to live of `key`, if it exists and expires.
    pub fn ttl(&self, key: &str) -> Option<Duration> {
        let now = Instant::now();
        let inner = self.inner.read();
        let entry = inner.values.get(key).filter(|e| e.is_live(now))?;
        entry.expires_at.map(|at| at - now)
    }

    /// Number of unexpired keys.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.inner
            .read()
            .values
            .values()
            .filter(|e| e.is_live(now))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn put(&self, key: &str, value: Vec<u8>, expires_at: Option<Instant>) {
        let mut inner = self.inner.write();
        inner.purge_expired(Instant::now());
        inner
            .values
            .insert(key.to_owned(), Entry { value, expires_at });
    }
}

#[async_trait]
impl KvStore for MemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let now = Instant::now();
        Ok(self
            .inner
            .read()
            .values
            .get(key)
            .filter(|e| e.is_live(now))
            .map(|e| e.value.clone()))
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<()> {
        self.put(key, value, None);
        Ok(())
    }

    async fn set_ex(&self, key: &str, ttl_seconds: u64, value: Vec<u8>) -> Result<()> {
        // Past the clock's range the key simply never expires.
        let expires_at = Instant::now().checked_add(Duration::from_secs(ttl_seconds));
        self.put(key, value, expires_at);
        Ok(())
    }

    async fn set_indexed(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl_seconds: Option<u64>,
        index: IndexEntry<'_>,
    ) -> Result<()> {
        let now = Instant::now();
        let expires_at = ttl_seconds.and_then(|ttl| now.checked_add(Duration::from_secs(ttl)));

        let mut inner = self.inner.write();
        inner.purge_expired(now);
        inner
            .values
            .insert(key.to_owned(), Entry { value, expires_at });
        inner
            .indexes
            .entry(index.index_key.to_owned())
            .or_default()
            .insert(index.member.to_owned(), index.score);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.inner.write().values.remove(key);
        Ok(())
    }

    async fn index_add(&self, index_key: &str, member: &str, score: f64) -> Result<()> {
        self.inner
            .write()
            .indexes
            .entry(index_key.to_owned())
            .or_default()
            .insert(member.to_owned(), score);
        Ok(())
    }

    async fn index_page(&self, index_key: &str, start: usize, stop: usize) -> Result<IndexPage> {
        let inner = self.inner.read();
        let Some(set) = inner.indexes.get(index_key) else {
            return Ok(IndexPage::default());
        };

        let mut ranked: Vec<(&String, f64)> = set.iter().map(|(m, s)| (m, *s)).collect();
        ranked.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(b.0)));

        let members = if start > stop {
            Vec::new()
        } else {
            ranked
                .into_iter()
                .skip(start)
                .take(stop.saturating_sub(start).saturating_add(1))
                .map(|(m, _)| m.clone())
                .collect()
        };

        Ok(IndexPage {
            total: set.len() as u64,
            members,
        })
    }
}
