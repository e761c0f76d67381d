//! The working-memory document and its parts.
//!
//! The stored form is one JSON object per session with timestamps as epoch
//! seconds. There is no version field, so decoding is schema-tolerant:
//! missing fields take the defaults below, explicit `null`s are treated as
//! missing, and unknown fields are ignored.
//!
//! | Field                       | Default when absent        |
//! |-----------------------------|----------------------------|
//! | `messages`, `memories`      | empty                      |
//! | `context`                   | `""`                       |
//! | `data`                      | `{}`                       |
//! | `tokens`                    | `0`                        |
//! | `ttl_seconds`               | none (no expiry)           |
//! | `long_term_memory_strategy` | discrete, empty config     |
//! | `created_at` & co.          | decode time                |

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use wm_domain::error::{Error, Result};
use wm_domain::time::{epoch_seconds, epoch_seconds_option};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Messages
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// One conversational turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryMessage {
    #[serde(default)]
    pub id: String,
    pub role: String,
    pub content: String,
    #[serde(with = "epoch_seconds", default = "now")]
    pub created_at: DateTime<Utc>,
    /// When the message was copied into long-term memory, if it has been.
    #[serde(default, with = "epoch_seconds_option")]
    pub persisted_at: Option<DateTime<Utc>>,
}

impl MemoryMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role: role.into(),
            content: content.into(),
            created_at: Utc::now(),
            persisted_at: None,
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Memory records
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoryType {
    Message,
    #[default]
    Semantic,
    Episodic,
}

/// A structured memory candidate waiting to be promoted to long-term storage.
///
/// `id` decodes to an empty string when missing so that the write-time check
/// (not the decoder) is what rejects id-less records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub topics: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub entities: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub memory_type: MemoryType,
    #[serde(default)]
    pub memory_hash: Option<String>,
    #[serde(with = "epoch_seconds", default = "now")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "epoch_seconds", default = "now")]
    pub updated_at: DateTime<Utc>,
    #[serde(with = "epoch_seconds", default = "now")]
    pub last_accessed: DateTime<Utc>,
    #[serde(default, with = "epoch_seconds_option")]
    pub persisted_at: Option<DateTime<Utc>>,
    #[serde(default, with = "epoch_seconds_option")]
    pub event_date: Option<DateTime<Utc>>,
}

impl MemoryRecord {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            text: text.into(),
            session_id: None,
            user_id: None,
            namespace: None,
            topics: Vec::new(),
            entities: Vec::new(),
            memory_type: MemoryType::default(),
            memory_hash: None,
            created_at: now,
            updated_at: now,
            last_accessed: now,
            persisted_at: None,
            event_date: None,
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Long-term promotion strategy
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoryStrategy {
    #[default]
    Discrete,
    Summary,
    Preferences,
    Custom,
}

/// How this session's memories should later be promoted to long-term storage.
/// Working memory only stores it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MemoryStrategyConfig {
    #[serde(default, deserialize_with = "null_as_default")]
    pub strategy: MemoryStrategy,
    #[serde(default, deserialize_with = "null_as_default")]
    pub config: HashMap<String, serde_json::Value>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Working memory document
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Everything stored for one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkingMemory {
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub namespace: Option<String>,
    /// Oldest first once returned by a read; stored order is not trusted.
    #[serde(default, deserialize_with = "null_as_default")]
    pub messages: Vec<MemoryMessage>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub memories: Vec<MemoryRecord>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub context: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: HashMap<String, serde_json::Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tokens: u64,
    /// `None` means the key never expires.
    #[serde(default)]
    pub ttl_seconds: Option<u64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub long_term_memory_strategy: MemoryStrategyConfig,
    #[serde(with = "epoch_seconds", default = "now")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "epoch_seconds", default = "now")]
    pub updated_at: DateTime<Utc>,
    #[serde(with = "epoch_seconds", default = "now")]
    pub last_accessed: DateTime<Utc>,
}

impl WorkingMemory {
    /// An empty document for `session_id`, stamped now.
    pub fn new(session_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            session_id: session_id.into(),
            user_id: None,
            namespace: None,
            messages: Vec::new(),
            memories: Vec::new(),
            context: String::new(),
            data: HashMap::new(),
            tokens: 0,
            ttl_seconds: None,
            long_term_memory_strategy: MemoryStrategyConfig::default(),
            created_at: now,
            updated_at: now,
            last_accessed: now,
        }
    }

    /// Check the invariants that must hold before a document is written.
    pub fn validate(&self) -> Result<()> {
        if let Some(pos) = self.memories.iter().position(|m| m.id.is_empty()) {
            return Err(Error::Validation(format!(
                "all memory records in working memory must have an id (record {pos} has none)"
            )));
        }
        if self.ttl_seconds == Some(0) {
            return Err(Error::Validation("ttl_seconds must be greater than 0".into()));
        }
        Ok(())
    }

    /// Order messages oldest first and keep only the `limit` most recent.
    ///
    /// The sort is stable, so messages sharing a timestamp keep their stored
    /// relative order.
    pub fn retain_recent_messages(&mut self, limit: usize) {
        self.messages.sort_by_key(|m| m.created_at);
        if self.messages.len() > limit {
            let excess = self.messages.len() - limit;
            self.messages.drain(..excess);
        }
    }
}

// ── serde helpers ───────────────────────────────────────────────────

fn now() -> DateTime<Utc> {
    Utc::now()
}

fn null_as_default<'de, D, T>(d: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wm_domain::time::from_epoch_seconds;

    fn msg(id: &str, at: i64) -> MemoryMessage {
        MemoryMessage {
            id: id.into(),
            role: "user".into(),
            content: id.into(),
            created_at: from_epoch_seconds(at).unwrap(),
            persisted_at: None,
        }
    }

    #[test]
    fn minimal_document_takes_defaults() {
        let wm: WorkingMemory = serde_json::from_str(r#"{"session_id": "s1"}"#).unwrap();
        assert_eq!(wm.session_id, "s1");
        assert!(wm.messages.is_empty());
        assert!(wm.memories.is_empty());
        assert_eq!(wm.context, "");
        assert!(wm.data.is_empty());
        assert_eq!(wm.tokens, 0);
        assert_eq!(wm.ttl_seconds, None);
        assert_eq!(wm.long_term_memory_strategy.strategy, MemoryStrategy::Discrete);
    }

    #[test]
    fn nulls_are_treated_as_missing() {
        let raw = r#"{
            "session_id": "s1", "context": null, "data": null, "tokens": null,
            "long_term_memory_strategy": null, "ttl_seconds": null,
            "memories": [{"id": "m1", "text": "t", "topics": null, "memory_type": null}]
        }"#;
        let wm: WorkingMemory = serde_json::from_str(raw).unwrap();
        assert_eq!(wm.context, "");
        assert!(wm.data.is_empty());
        assert_eq!(wm.memories[0].memory_type, MemoryType::Semantic);
        assert!(wm.memories[0].topics.is_empty());
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let raw = r#"{"session_id": "s1", "schema_rev": 7, "messages": [
            {"id": "a", "role": "user", "content": "x", "created_at": 5, "discrete_memory_extracted": "t"}
        ]}"#;
        let wm: WorkingMemory = serde_json::from_str(raw).unwrap();
        assert_eq!(wm.messages.len(), 1);
        assert_eq!(wm.messages[0].created_at.timestamp(), 5);
    }

    #[test]
    fn timestamps_serialize_as_epoch_seconds() {
        let mut wm = WorkingMemory::new("s1");
        wm.created_at = from_epoch_seconds(100).unwrap();
        wm.messages.push(msg("a", 90));
        let v = serde_json::to_value(&wm).unwrap();
        assert_eq!(v["created_at"], 100);
        assert_eq!(v["messages"][0]["created_at"], 90);
        assert_eq!(v["long_term_memory_strategy"]["strategy"], "discrete");
    }

    #[test]
    fn validate_rejects_memory_without_id() {
        let mut wm = WorkingMemory::new("s1");
        wm.memories.push(MemoryRecord::new("m1", "likes tea"));
        assert!(wm.validate().is_ok());

        wm.memories.push(MemoryRecord::new("", "orphan"));
        assert!(matches!(wm.validate(), Err(Error::Validation(_))));
    }

    #[test]
    fn validate_rejects_zero_ttl() {
        let mut wm = WorkingMemory::new("s1");
        wm.ttl_seconds = Some(0);
        assert!(matches!(wm.validate(), Err(Error::Validation(_))));
    }

    #[test]
    fn retain_recent_sorts_and_keeps_tail() {
        let mut wm = WorkingMemory::new("s1");
        wm.messages = vec![msg("c", 30), msg("a", 10), msg("d", 40), msg("b", 20)];
        wm.retain_recent_messages(2);
        let ids: Vec<_> = wm.messages.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["c", "d"]);
    }

    #[test]
    fn retain_recent_is_stable_and_tolerates_short_lists() {
        let mut wm = WorkingMemory::new("s1");
        wm.messages = vec![msg("x", 10), msg("y", 10), msg("w", 5)];
        wm.retain_recent_messages(10);
        let ids: Vec<_> = wm.messages.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["w", "x", "y"]);
    }
}
