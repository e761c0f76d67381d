//! Storage key derivation.
//!
//! Key templates:
//! - `working_memory:session:<sessionId>`
//! - `working_memory:user:<userId>:session:<sessionId>`
//! - `working_memory:ns:<namespace>:session:<sessionId>`
//! - `working_memory:ns:<namespace>:user:<userId>:session:<sessionId>`
//! - `sessions` / `sessions:ns:<namespace>` (session index)
//!
//! Every component is escaped (`%` → `%25`, `:` → `%3A`) so a component can
//! never contain the separator, which keeps distinct triples on distinct keys.

const WORKING_MEMORY_PREFIX: &str = "working_memory";
const SESSION_INDEX_PREFIX: &str = "sessions";

/// Compute the storage key for one session's working memory.
pub fn working_memory_key(
    session_id: &str,
    user_id: Option<&str>,
    namespace: Option<&str>,
) -> String {
    let mut key = String::from(WORKING_MEMORY_PREFIX);
    if let Some(ns) = namespace {
        push_segment(&mut key, "ns", ns);
    }
    if let Some(user) = user_id {
        push_segment(&mut key, "user", user);
    }
    push_segment(&mut key, "session", session_id);
    key
}

/// Compute the sorted-set key listing the sessions of a namespace.
pub fn session_index_key(namespace: Option<&str>) -> String {
    let mut key = String::from(SESSION_INDEX_PREFIX);
    if let Some(ns) = namespace {
        push_segment(&mut key, "ns", ns);
    }
    key
}

fn push_segment(key: &mut String, tag: &str, value: &str) {
    key.push(':');
    key.push_str(tag);
    key.push(':');
    for c in value.chars() {
        match c {
            '%' => key.push_str("%25"),
            ':' => key.push_str("%3A"),
            _ => key.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_only() {
        assert_eq!(working_memory_key("s1", None, None), "working_memory:session:s1");
    }

    #[test]
    fn full_triple() {
        assert_eq!(
            working_memory_key("s1", Some("alice"), Some("acme")),
            "working_memory:ns:acme:user:alice:session:s1"
        );
    }

    #[test]
    fn deterministic() {
        let a = working_memory_key("s1", Some("u"), Some("n"));
        let b = working_memory_key("s1", Some("u"), Some("n"));
        assert_eq!(a, b);
    }

    #[test]
    fn each_field_changes_the_key() {
        let base = working_memory_key("s1", Some("u"), Some("n"));
        assert_ne!(base, working_memory_key("s2", Some("u"), Some("n")));
        assert_ne!(base, working_memory_key("s1", Some("v"), Some("n")));
        assert_ne!(base, working_memory_key("s1", Some("u"), Some("m")));
        assert_ne!(base, working_memory_key("s1", None, Some("n")));
        assert_ne!(base, working_memory_key("s1", Some("u"), None));
    }

    #[test]
    fn user_and_namespace_with_same_value_differ() {
        assert_ne!(
            working_memory_key("s1", Some("x"), None),
            working_memory_key("s1", None, Some("x"))
        );
    }

    #[test]
    fn empty_component_is_not_absent() {
        assert_ne!(
            working_memory_key("s1", Some(""), None),
            working_memory_key("s1", None, None)
        );
    }

    #[test]
    fn separator_injection_does_not_collide() {
        // Without escaping both would render as `...:ns:a:user:b:session:s`.
        let forged = working_memory_key("s", None, Some("a:user:b"));
        let genuine = working_memory_key("s", Some("b"), Some("a"));
        assert_ne!(forged, genuine);
        assert_eq!(forged, "working_memory:ns:a%3Auser%3Ab:session:s");
    }

    #[test]
    fn escape_is_reversible_for_percent() {
        assert_ne!(
            working_memory_key("a%3Ab", None, None),
            working_memory_key("a:b", None, None)
        );
    }

    #[test]
    fn index_keys() {
        assert_eq!(session_index_key(None), "sessions");
        assert_eq!(session_index_key(Some("acme")), "sessions:ns:acme");
        assert_ne!(session_index_key(Some("")), session_index_key(None));
    }
}
