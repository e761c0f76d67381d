//! Rebuild working memory from long-term message records.
//!
//! When every message is also indexed in long-term memory as a record of
//! type `message` with text `"<role>: <content>"`, an expired or missing
//! session can be approximated from those records. The result is never
//! written back; every miss pays for a search until the next write.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use wm_domain::error::{Error, Result};
use wm_domain::trace::TraceEvent;
use wm_longterm::{LongTermSearchProvider, LongTermSearchRequest};

use crate::model::{MemoryMessage, MemoryStrategyConfig, WorkingMemory};

#[derive(Clone)]
pub struct Reconstructor {
    search: Arc<dyn LongTermSearchProvider>,
    default_limit: usize,
}

impl Reconstructor {
    /// `default_limit` caps the search when the caller gives no
    /// recent-messages limit. It is raised to 1 if given as 0.
    pub fn new(search: Arc<dyn LongTermSearchProvider>, default_limit: usize) -> Self {
        Self {
            search,
            default_limit: default_limit.max(1),
        }
    }

    /// Rebuild the session, or `None` when there is nothing usable or the
    /// search fails. Failures are logged, never returned.
    pub async fn reconstruct(
        &self,
        session_id: &str,
        user_id: Option<&str>,
        namespace: Option<&str>,
        recent_messages_limit: Option<usize>,
    ) -> Option<WorkingMemory> {
        match self
            .try_reconstruct(session_id, user_id, namespace, recent_messages_limit)
            .await
        {
            Ok(wm) => wm,
            Err(e) => {
                tracing::error!(
                    session_id,
                    error = %e,
                    "error reconstructing working memory"
                );
                None
            }
        }
    }

    async fn try_reconstruct(
        &self,
        session_id: &str,
        user_id: Option<&str>,
        namespace: Option<&str>,
        recent_messages_limit: Option<usize>,
    ) -> Result<Option<WorkingMemory>> {
        let limit = recent_messages_limit.filter(|n| *n > 0);
        let request = LongTermSearchRequest::session_messages(
            session_id,
            user_id,
            namespace,
            limit.unwrap_or(self.default_limit),
        );

        let results = self
            .search
            .search(request)
            .await
            .map_err(|e| Error::Reconstruction(format!("long-term search failed: {e}")))?;

        if results.memories.is_empty() {
            tracing::debug!(session_id, "no message memories found in long-term storage");
            return Ok(None);
        }

        let records = results.memories.len();
        let mut messages = Vec::with_capacity(records);
        for record in results.memories {
            match split_role(&record.text) {
                Some((role, content)) => messages.push(MemoryMessage {
                    id: record.id,
                    role,
                    content: content.to_owned(),
                    created_at: record.created_at,
                    persisted_at: record.persisted_at,
                }),
                None => {
                    tracing::warn!(
                        memory_id = %record.id,
                        text = %record.text,
                        "skipping malformed message memory"
                    );
                }
            }
        }

        if messages.is_empty() {
            tracing::debug!(session_id, "no valid messages found in long-term storage");
            return Ok(None);
        }
        let skipped = records - messages.len();

        // Newest first so truncation keeps the latest, then back to oldest first.
        messages.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        if let Some(limit) = limit {
            messages.truncate(limit);
        }
        messages.reverse();

        let now = Utc::now();
        let created_at = messages[0].persisted_at.unwrap_or(now);

        let wm = WorkingMemory {
            session_id: session_id.to_owned(),
            user_id: user_id.map(str::to_owned),
            namespace: namespace.map(str::to_owned),
            messages,
            memories: Vec::new(),
            context: String::new(),
            data: HashMap::new(),
            tokens: 0,
            ttl_seconds: None,
            long_term_memory_strategy: MemoryStrategyConfig::default(),
            created_at,
            updated_at: now,
            last_accessed: now,
        };

        tracing::info!(
            session_id,
            messages = wm.messages.len(),
            skipped,
            "reconstructed working memory from long-term storage"
        );
        TraceEvent::WorkingMemoryReconstructed {
            session_id: session_id.to_owned(),
            records,
            skipped,
            messages: wm.messages.len(),
        }
        .emit();

        Ok(Some(wm))
    }
}

/// Split `"<role>: <content>"` at the first `": "`, lower-casing the role.
fn split_role(text: &str) -> Option<(String, &str)> {
    let (role, content) = text.split_once(": ")?;
    Some((role.to_lowercase(), content))
}
