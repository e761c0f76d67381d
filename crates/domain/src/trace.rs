use serde::Serialize;

/// Structured trace events emitted across all working-memory crates.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event")]
pub enum TraceEvent {
    WorkingMemoryRead {
        session_id: String,
        namespace: Option<String>,
        /// `hit`, `miss`, `reconstructed`, or `failed`.
        outcome: &'static str,
        messages: usize,
    },
    WorkingMemoryWritten {
        session_id: String,
        namespace: Option<String>,
        ttl_seconds: Option<u64>,
        messages: usize,
        memories: usize,
        bytes: usize,
    },
    WorkingMemoryDeleted {
        session_id: String,
        namespace: Option<String>,
    },
    WorkingMemoryReconstructed {
        session_id: String,
        records: usize,
        skipped: usize,
        messages: usize,
    },
    SessionsListed {
        namespace: Option<String>,
        total: u64,
        returned: usize,
    },
    LongTermSearchCall {
        endpoint: String,
        status: u16,
        duration_ms: u64,
    },
}

impl TraceEvent {
    pub fn emit(&self) {
        let json = serde_json::to_string(self).unwrap_or_default();
        tracing::info!(trace_event = %json, "wm_event");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_tagged() {
        let ev = TraceEvent::WorkingMemoryDeleted {
            session_id: "s1".into(),
            namespace: None,
        };
        let v = serde_json::to_value(&ev).unwrap();
        assert_eq!(v["event"], "WorkingMemoryDeleted");
        assert_eq!(v["session_id"], "s1");
    }
}
