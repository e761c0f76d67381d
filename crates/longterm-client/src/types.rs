//! Data Transfer Objects for the long-term memory search API.
//!
//! Filters are exact-match only and serialize as `{"eq": "<value>"}`, which
//! is the shape the memory server's search endpoint expects. Timestamps are
//! decoded leniently: the server sends RFC 3339 strings, test doubles and
//! older servers send epoch seconds.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use wm_domain::time::{epoch_seconds, epoch_seconds_option};

/// `memory_type` value that marks a long-term record as a verbatim message.
pub const MESSAGE_MEMORY_TYPE: &str = "message";

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Search request
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Exact-match filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EqFilter {
    pub eq: String,
}

impl EqFilter {
    pub fn new(value: impl Into<String>) -> Self {
        Self { eq: value.into() }
    }
}

/// POST /v1/long-term-memory/search request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LongTermSearchRequest {
    /// Empty text means "filter on metadata only".
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<EqFilter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<EqFilter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<EqFilter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_type: Option<EqFilter>,
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

impl LongTermSearchRequest {
    /// Metadata-only query for the message records of one session.
    pub fn session_messages(
        session_id: &str,
        user_id: Option<&str>,
        namespace: Option<&str>,
        limit: usize,
    ) -> Self {
        Self {
            text: String::new(),
            session_id: Some(EqFilter::new(session_id)),
            user_id: user_id.map(EqFilter::new),
            namespace: namespace.map(EqFilter::new),
            memory_type: Some(EqFilter::new(MESSAGE_MEMORY_TYPE)),
            limit,
            offset: 0,
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Search response
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A single long-term memory record as returned by search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LongTermMemory {
    pub id: String,
    pub text: String,
    #[serde(with = "epoch_seconds")]
    pub created_at: DateTime<Utc>,
    #[serde(default, with = "epoch_seconds_option")]
    pub persisted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub memory_type: Option<String>,
    /// Vector distance; absent for metadata-only queries.
    #[serde(default)]
    pub dist: Option<f64>,
}

/// POST /v1/long-term-memory/search response body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LongTermSearchResponse {
    #[serde(default)]
    pub memories: Vec<LongTermMemory>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub next_offset: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_messages_request_shape() {
        let req = LongTermSearchRequest::session_messages("s1", None, Some("ns"), 20);
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v["text"], "");
        assert_eq!(v["session_id"]["eq"], "s1");
        assert_eq!(v["namespace"]["eq"], "ns");
        assert_eq!(v["memory_type"]["eq"], "message");
        assert!(v.get("user_id").is_none());
        assert_eq!(v["limit"], 20);
        assert_eq!(v["offset"], 0);
    }

    #[test]
    fn response_accepts_iso_and_epoch_timestamps() {
        let raw = r#"{
            "memories": [
                {"id": "a", "text": "user: hi", "created_at": "2024-05-01T10:00:00Z",
                 "persisted_at": "2024-05-01T10:00:05.123Z"},
                {"id": "b", "text": "assistant: hello", "created_at": 101}
            ],
            "total": 2
        }"#;
        let resp: LongTermSearchResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(resp.memories.len(), 2);
        assert!(resp.memories[0].persisted_at.is_some());
        assert_eq!(resp.memories[1].created_at.timestamp(), 101);
        assert!(resp.memories[1].persisted_at.is_none());
        assert_eq!(resp.total, 2);
    }
}
