//! Public entry points for working memory.
//!
//! Composes the [`StoreGateway`] with the optional [`Reconstructor`]. Writes
//! and deletes fail loudly. Reads never fail: "never existed", "expired"
//! and "store error" all come back as `None`, and only the logs tell them
//! apart.

use std::sync::Arc;

use wm_domain::config::WorkingMemoryConfig;
use wm_domain::error::Result;
use wm_domain::trace::TraceEvent;
use wm_longterm::LongTermSearchProvider;

use crate::gateway::{ReadOutcome, StoreGateway};
use crate::model::WorkingMemory;
use crate::reconstruct::Reconstructor;
use crate::store::KvStore;

#[derive(Clone)]
pub struct WorkingMemoryManager {
    gateway: StoreGateway,
    /// `Some` only when reconstruction is enabled and a search backend exists.
    reconstructor: Option<Reconstructor>,
}

impl WorkingMemoryManager {
    /// Reconstruction is enabled by `cfg.reconstruct_from_long_term`; it
    /// also needs a search backend, and is left off with a warning if none
    /// is given.
    pub fn new(
        kv: Arc<dyn KvStore>,
        search: Option<Arc<dyn LongTermSearchProvider>>,
        cfg: &WorkingMemoryConfig,
    ) -> Self {
        let reconstructor = match (cfg.reconstruct_from_long_term, search) {
            (true, Some(search)) => Some(Reconstructor::new(
                search,
                cfg.reconstruction_default_limit,
            )),
            (true, None) => {
                tracing::warn!(
                    "reconstruction from long-term memory is enabled but no search backend \
                     was provided; expired sessions will read as absent"
                );
                None
            }
            (false, _) => None,
        };

        Self {
            gateway: StoreGateway::new(kv),
            reconstructor,
        }
    }

    pub fn reconstruction_enabled(&self) -> bool {
        self.reconstructor.is_some()
    }

    /// Page through the session ids of a namespace.
    ///
    /// Returns the index's total size and the ids ranked
    /// `[offset, offset + limit)`, both read in one atomic batch.
    ///
    /// `limit = 0` yields the total and no ids (a count-only call), not the
    /// whole index.
    ///
    /// `user_id` is accepted but not applied: the index is keyed per
    /// namespace only, so filtering by user needs a secondary per-user index
    /// that does not exist yet.
    pub async fn list_sessions(
        &self,
        limit: usize,
        offset: usize,
        namespace: Option<&str>,
        user_id: Option<&str>,
    ) -> Result<(u64, Vec<String>)> {
        if user_id.is_some() {
            tracing::debug!(?user_id, "user_id filter is not supported by the session index; ignoring");
        }

        let (total, ids) = self.gateway.list_sessions(limit, offset, namespace).await?;

        TraceEvent::SessionsListed {
            namespace: namespace.map(str::to_owned),
            total,
            returned: ids.len(),
        }
        .emit();

        Ok((total, ids))
    }

    /// Fetch a session's working memory, falling back to reconstruction
    /// from long-term memory on a miss when enabled.
    ///
    /// With `recent_messages_limit = Some(n)` and `n > 0`, at most the `n`
    /// latest messages are returned, oldest first.
    pub async fn get_working_memory(
        &self,
        session_id: &str,
        user_id: Option<&str>,
        namespace: Option<&str>,
        recent_messages_limit: Option<usize>,
    ) -> Option<WorkingMemory> {
        let outcome = self
            .gateway
            .read(session_id, user_id, namespace, recent_messages_limit)
            .await;

        let (label, result) = match outcome {
            ReadOutcome::Found(wm) => ("hit", Some(wm)),
            ReadOutcome::Failed(e) => {
                tracing::error!(session_id, error = %e, "error getting working memory");
                ("failed", None)
            }
            ReadOutcome::NotFound => {
                tracing::debug!(
                    session_id,
                    ?user_id,
                    ?namespace,
                    "no working memory found"
                );
                match &self.reconstructor {
                    Some(r) => {
                        let rebuilt = r
                            .reconstruct(session_id, user_id, namespace, recent_messages_limit)
                            .await;
                        match rebuilt {
                            Some(wm) => ("reconstructed", Some(wm)),
                            None => ("miss", None),
                        }
                    }
                    None => ("miss", None),
                }
            }
        };

        TraceEvent::WorkingMemoryRead {
            session_id: session_id.to_owned(),
            namespace: namespace.map(str::to_owned),
            outcome: label,
            messages: result.as_ref().map_or(0, |wm| wm.messages.len()),
        }
        .emit();

        result
    }

    /// Validate and fully overwrite a session's working memory, recording
    /// the session in its namespace index in the same store operation.
    ///
    /// Concurrent writers race; the last write to reach the store wins.
    /// Returns the document as stored (with `updated_at` refreshed). On
    /// error nothing was written.
    pub async fn set_working_memory(&self, wm: WorkingMemory) -> Result<WorkingMemory> {
        self.gateway.write(wm).await
    }

    /// Delete a session's working memory. Idempotent; the session index and
    /// long-term memory are left untouched.
    pub async fn delete_working_memory(
        &self,
        session_id: &str,
        user_id: Option<&str>,
        namespace: Option<&str>,
    ) -> Result<()> {
        self.gateway.delete(session_id, user_id, namespace).await
    }
}
