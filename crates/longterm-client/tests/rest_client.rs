use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use wm_domain::config::LongTermConfig;
use wm_domain::error::Error;
use wm_longterm::{LongTermSearchProvider, LongTermSearchRequest, RestLongTermClient};

fn client_for(server: &MockServer, api_key: Option<&str>) -> RestLongTermClient {
    let cfg = LongTermConfig {
        base_url: server.uri(),
        api_key: api_key.map(str::to_owned),
        timeout_ms: 2000,
        max_retries: 2,
    };
    RestLongTermClient::new(&cfg).unwrap()
}

#[tokio::test]
async fn search_posts_filters_and_parses_records() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/long-term-memory/search"))
        .and(header("authorization", "Bearer k1"))
        .and(body_partial_json(json!({
            "text": "",
            "session_id": {"eq": "s1"},
            "user_id": {"eq": "u1"},
            "memory_type": {"eq": "message"},
            "limit": 5,
            "offset": 0
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "memories": [
                {"id": "m1", "text": "user: hi", "created_at": "2024-01-01T00:00:00Z"},
                {"id": "m2", "text": "assistant: hello", "created_at": 1704067201,
                 "persisted_at": 1704067300}
            ],
            "total": 2
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, Some("k1"));
    let resp = client
        .search(LongTermSearchRequest::session_messages("s1", Some("u1"), None, 5))
        .await
        .unwrap();

    assert_eq!(resp.total, 2);
    assert_eq!(resp.memories[0].id, "m1");
    assert_eq!(resp.memories[0].created_at.timestamp(), 1_704_067_200);
    assert_eq!(resp.memories[1].persisted_at.unwrap().timestamp(), 1_704_067_300);
}

#[tokio::test]
async fn server_errors_are_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/long-term-memory/search"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/long-term-memory/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"memories": [], "total": 0})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, None);
    let resp = client
        .search(LongTermSearchRequest::session_messages("s1", None, None, 10))
        .await
        .unwrap();
    assert!(resp.memories.is_empty());
}

#[tokio::test]
async fn client_errors_are_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/long-term-memory/search"))
        .respond_with(ResponseTemplate::new(422).set_body_string("bad filter"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, None);
    let err = client
        .search(LongTermSearchRequest::session_messages("s1", None, None, 10))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::LongTerm(ref msg) if msg.contains("422")));
}

#[tokio::test]
async fn unauthorized_maps_to_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, Some("wrong"));
    let err = client
        .search(LongTermSearchRequest::session_messages("s1", None, None, 10))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Auth(_)));
}

#[tokio::test]
async fn exhausted_retries_return_last_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(3)
        .mount(&server)
        .await;

    let client = client_for(&server, None);
    let err = client
        .search(LongTermSearchRequest::session_messages("s1", None, None, 10))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::LongTerm(ref msg) if msg.contains("500")));
}

#[tokio::test]
async fn malformed_body_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = client_for(&server, None);
    let err = client
        .search(LongTermSearchRequest::session_messages("s1", None, None, 10))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::LongTerm(ref msg) if msg.contains("parse")));
}
