//! Dispatch Tests
//!
//! Request routing and response templating.

use txlink::dispatch::{Dispatcher, ResponseKind, ResponseSource, ResponseTemplates};
use txlink::protocol::{Message, RequestHeader, Status, TransactionType};

fn request_header(transaction_type: TransactionType, code: &str) -> RequestHeader {
    RequestHeader::new("CLI001", "SERVER", transaction_type, code, "1")
}

fn dispatch(transaction_type: TransactionType, code: &str, payload: &[u8]) -> (Status, String) {
    let dispatcher = Dispatcher::default();
    let header = request_header(transaction_type, code);
    match dispatcher.dispatch(&header, payload) {
        Message::Response { header, payload } => {
            (header.status, String::from_utf8(payload).unwrap())
        }
        other => panic!("dispatcher produced a non-response: {:?}", other),
    }
}

// =============================================================================
// Branch Selection
// =============================================================================

#[test]
fn test_signin_dispatch() {
    let (status, text) = dispatch(TransactionType::Signin, "SIGNIN", b"user=a");
    assert_eq!(status, Status::Success);
    assert!(text.starts_with("Sign in successful at "), "got: {}", text);
}

#[test]
fn test_query_dispatch_echoes_payload() {
    let (status, text) = dispatch(TransactionType::Business, "QUERY", b"id=5");
    assert_eq!(status, Status::Success);
    assert!(text.contains("Query result: id=5"), "got: {}", text);
}

#[test]
fn test_update_and_delete_dispatch() {
    let (status, text) = dispatch(TransactionType::Business, "UPDATE", b"name=bob");
    assert_eq!(status, Status::Success);
    assert!(text.contains("Update result: name=bob"), "got: {}", text);

    let (status, text) = dispatch(TransactionType::Business, "DELETE", b"id=9");
    assert_eq!(status, Status::Success);
    assert!(text.contains("Delete result: id=9"), "got: {}", text);
}

#[test]
fn test_unknown_code_fails_in_band() {
    let (status, text) = dispatch(TransactionType::Business, "FOO", b"whatever");
    assert_eq!(status, Status::Failed);
    assert_eq!(text, "Unknown transaction code: FOO");
}

#[test]
fn test_unknown_type_fails_in_band() {
    let (status, text) = dispatch(TransactionType::Other(9), "QUERY", b"");
    assert_eq!(status, Status::Failed);
    assert_eq!(text, "Unknown transaction type: 9");
}

#[test]
fn test_code_is_trimmed_before_matching() {
    let (status, text) = dispatch(TransactionType::Business, "QUERY  ", b"id=1");
    assert_eq!(status, Status::Success);
    assert!(text.contains("Query result"), "got: {}", text);
}

#[test]
fn test_code_match_is_case_sensitive() {
    let (status, text) = dispatch(TransactionType::Business, "query", b"id=1");
    assert_eq!(status, Status::Failed);
    assert!(text.contains("query"), "got: {}", text);
}

// =============================================================================
// Response Sources
// =============================================================================

struct FixedSource;

impl ResponseSource for FixedSource {
    fn generate(&self, kind: ResponseKind, detail: &str) -> (String, Status) {
        (format!("{:?}:{}", kind, detail), Status::Success)
    }
}

#[test]
fn test_custom_response_source() {
    let dispatcher = Dispatcher::new(Box::new(FixedSource));
    let header = request_header(TransactionType::Business, "QUERY");
    match dispatcher.dispatch(&header, b"id=1") {
        Message::Response { payload, .. } => {
            assert_eq!(payload, b"QuerySuccess:id=1");
        }
        other => panic!("expected response, got {:?}", other),
    }
}

#[test]
fn test_templates_load_overrides() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("response-config.json");
    std::fs::write(
        &path,
        r#"{
            "business": {
                "query": { "success": { "status": 0, "template": "Q[{data}]" } },
                "unknown": { "status": 1, "template": "no such code: {code}" }
            }
        }"#,
    )
    .unwrap();

    let templates = ResponseTemplates::load(&path).unwrap();

    let (text, status) = templates.generate(ResponseKind::QuerySuccess, "id=5");
    assert_eq!(status, Status::Success);
    assert_eq!(text, "Q[id=5]");

    let (text, status) = templates.generate(ResponseKind::UnknownCode, "FOO");
    assert_eq!(status, Status::Failed);
    assert_eq!(text, "no such code: FOO");

    // Untouched sections keep their defaults.
    let (text, _) = templates.generate(ResponseKind::SigninSuccess, "");
    assert!(text.starts_with("Sign in successful at "), "got: {}", text);
}

#[test]
fn test_templates_reject_garbage_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.json");
    std::fs::write(&path, "not json").unwrap();
    assert!(ResponseTemplates::load(&path).is_err());
}
