//! Store gateway: moves working-memory documents in and out of the
//! key-value store.
//!
//! Writes are strict: validation happens before any I/O and store failures
//! are returned. Reads report an explicit [`ReadOutcome`]; deciding how
//! lenient to be is left to the caller.

use std::sync::Arc;

use chrono::Utc;
use wm_domain::error::{Error, Result};
use wm_domain::trace::TraceEvent;

use crate::keys::{session_index_key, working_memory_key};
use crate::model::WorkingMemory;
use crate::store::{IndexEntry, KvStore};

/// Result of reading one session's key.
#[derive(Debug)]
pub enum ReadOutcome {
    Found(WorkingMemory),
    NotFound,
    /// The read or the decode failed.
    Failed(Error),
}

#[derive(Clone)]
pub struct StoreGateway {
    kv: Arc<dyn KvStore>,
}

impl StoreGateway {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self { kv }
    }

    /// Read and decode the document stored for a session.
    ///
    /// `session_id` and `namespace` on the result are the ones addressed,
    /// since the key already encodes them. With `recent_messages_limit > 0`
    /// messages are sorted oldest first and trimmed to the latest N.
    pub async fn read(
        &self,
        session_id: &str,
        user_id: Option<&str>,
        namespace: Option<&str>,
        recent_messages_limit: Option<usize>,
    ) -> ReadOutcome {
        let key = working_memory_key(session_id, user_id, namespace);

        let raw = match self.kv.get(&key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return ReadOutcome::NotFound,
            Err(e) => return ReadOutcome::Failed(e),
        };

        let mut wm: WorkingMemory = match serde_json::from_slice(&raw) {
            Ok(wm) => wm,
            Err(e) => return ReadOutcome::Failed(Error::Json(e)),
        };

        wm.session_id = session_id.to_owned();
        wm.namespace = namespace.map(str::to_owned);

        if let Some(limit) = recent_messages_limit.filter(|n| *n > 0) {
            wm.retain_recent_messages(limit);
        }

        ReadOutcome::Found(wm)
    }

    /// Validate, stamp `updated_at`, and overwrite the session's key while
    /// registering the session in its namespace index.
    ///
    /// The document, its expiry and the index entry (scored by `updated_at`)
    /// land in one atomic store operation, so a failure leaves nothing
    /// behind. Returns the document as stored.
    pub async fn write(&self, mut wm: WorkingMemory) -> Result<WorkingMemory> {
        wm.validate()?;

        let key = working_memory_key(
            &wm.session_id,
            wm.user_id.as_deref(),
            wm.namespace.as_deref(),
        );
        let index_key = session_index_key(wm.namespace.as_deref());

        wm.updated_at = Utc::now();
        let body = serde_json::to_vec(&wm)?;
        let bytes = body.len();

        let index = IndexEntry {
            index_key: &index_key,
            member: &wm.session_id,
            score: wm.updated_at.timestamp() as f64,
        };
        if let Err(e) = self.kv.set_indexed(&key, body, wm.ttl_seconds, index).await {
            tracing::error!(
                session_id = %wm.session_id,
                error = %e,
                "error setting working memory"
            );
            return Err(e);
        }

        match wm.ttl_seconds {
            Some(ttl) => tracing::info!(
                session_id = %wm.session_id,
                ttl_seconds = ttl,
                "set working memory with TTL"
            ),
            None => tracing::info!(session_id = %wm.session_id, "set working memory with no TTL"),
        }

        TraceEvent::WorkingMemoryWritten {
            session_id: wm.session_id.clone(),
            namespace: wm.namespace.clone(),
            ttl_seconds: wm.ttl_seconds,
            messages: wm.messages.len(),
            memories: wm.memories.len(),
            bytes,
        }
        .emit();

        Ok(wm)
    }

    /// Remove the session's key. Missing keys are not an error.
    pub async fn delete(
        &self,
        session_id: &str,
        user_id: Option<&str>,
        namespace: Option<&str>,
    ) -> Result<()> {
        let key = working_memory_key(session_id, user_id, namespace);

        if let Err(e) = self.kv.delete(&key).await {
            tracing::error!(session_id, error = %e, "error deleting working memory");
            return Err(e);
        }

        tracing::info!(session_id, "deleted working memory");
        TraceEvent::WorkingMemoryDeleted {
            session_id: session_id.to_owned(),
            namespace: namespace.map(str::to_owned),
        }
        .emit();
        Ok(())
    }

    /// Total size of the namespace's session index and the page
    /// `[offset, offset + limit)`.
    pub async fn list_sessions(
        &self,
        limit: usize,
        offset: usize,
        namespace: Option<&str>,
    ) -> Result<(u64, Vec<String>)> {
        let index_key = session_index_key(namespace);

        // A zero-width page would need stop = offset - 1, which the store
        // reads as "to the end" when offset is 0. Fetch a single member and
        // throw it away instead.
        let (stop, keep) = match limit {
            0 => (offset, 0),
            n => (offset.saturating_add(n - 1), n),
        };

        let mut page = self.kv.index_page(&index_key, offset, stop).await?;
        page.members.truncate(keep);
        Ok((page.total, page.members))
    }
}
