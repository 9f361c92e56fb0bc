//! Integration Tests
//!
//! Real server and real clients over loopback sockets, both protocol
//! variants.

use std::net::SocketAddr;
use std::sync::Arc;
use std::thread;

use txlink::client::{ClientConfig, TransferClient, TxClient};
use txlink::error::LinkError;
use txlink::metrics::ServerMetrics;
use txlink::network::Server;
use txlink::{Config, ProtocolVariant};

fn start_server(config: Config) -> (SocketAddr, Arc<ServerMetrics>) {
    let server = Server::bind(config).unwrap();
    let addr = server.local_addr().unwrap();
    let metrics = server.metrics();
    thread::spawn(move || {
        let _ = server.run();
    });
    (addr, metrics)
}

fn transaction_server() -> (SocketAddr, Arc<ServerMetrics>) {
    start_server(Config::builder().listen_addr("127.0.0.1:0").build())
}

// =============================================================================
// Transaction Variant
// =============================================================================

#[test]
fn test_signin_over_loopback() {
    let (addr, _) = transaction_server();
    let client = TxClient::connect(ClientConfig::new(addr.to_string())).unwrap();

    let reply = client.sign_in("user=a").unwrap();
    assert!(reply.is_success());
    assert!(
        reply.data.starts_with("Sign in successful at "),
        "got: {}",
        reply.data
    );
}

#[test]
fn test_business_exchanges_over_loopback() {
    let (addr, metrics) = transaction_server();
    let client = TxClient::connect(ClientConfig::new(addr.to_string())).unwrap();

    let reply = client.query("id=5").unwrap();
    assert!(reply.is_success());
    assert!(reply.data.contains("Query result: id=5"), "got: {}", reply.data);

    let reply = client.update("name=bob").unwrap();
    assert!(reply.is_success());
    assert!(reply.data.contains("Update result: name=bob"));

    let reply = client.delete("id=9").unwrap();
    assert!(reply.is_success());
    assert!(reply.data.contains("Delete result: id=9"));

    assert_eq!(metrics.snapshot().total_requests, 3);
}

#[test]
fn test_unknown_code_leaves_connection_usable() {
    let (addr, _) = transaction_server();
    let client = TxClient::connect(ClientConfig::new(addr.to_string())).unwrap();

    let reply = client.send_business("FOO", "whatever").unwrap();
    assert!(!reply.is_success());
    assert!(
        reply.data.contains("Unknown transaction code: FOO"),
        "got: {}",
        reply.data
    );

    // Business-level failure is per-request; the same session keeps working.
    let reply = client.query("id=1").unwrap();
    assert!(reply.is_success());
}

#[test]
fn test_two_clients_share_one_server() {
    let (addr, _) = transaction_server();
    let first = TxClient::connect(ClientConfig::new(addr.to_string())).unwrap();
    let second = TxClient::connect(ClientConfig::new(addr.to_string())).unwrap();

    assert!(first.query("a").unwrap().is_success());
    assert!(second.query("b").unwrap().is_success());
    assert!(first.query("c").unwrap().is_success());
}

#[test]
fn test_response_config_override() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("response-config.json");
    std::fs::write(
        &path,
        r#"{ "business": { "query": { "success": { "template": "Q[{data}]" } } } }"#,
    )
    .unwrap();

    let (addr, _) = start_server(
        Config::builder()
            .listen_addr("127.0.0.1:0")
            .response_config(&path)
            .build(),
    );

    let client = TxClient::connect(ClientConfig::new(addr.to_string())).unwrap();
    let reply = client.query("id=5").unwrap();
    assert_eq!(reply.data, "Q[id=5]");
}

// =============================================================================
// File-Transfer Variant
// =============================================================================

#[test]
fn test_file_transfer_over_loopback() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("a.txt"), b"hello world").unwrap();
    std::fs::write(dir.path().join("b.bin"), vec![0xAAu8; 256]).unwrap();

    let (addr, metrics) = start_server(
        Config::builder()
            .listen_addr("127.0.0.1:0")
            .protocol(ProtocolVariant::FileTransfer)
            .files_dir(dir.path())
            .build(),
    );

    let client = TransferClient::connect(ClientConfig::new(addr.to_string())).unwrap();

    let mut entries = client.list_files().unwrap();
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].name, "a.txt");
    assert_eq!(entries[0].size, 11);
    assert_eq!(entries[1].name, "b.bin");

    let data = client.download("a.txt").unwrap();
    assert_eq!(data, b"hello world");
    assert_eq!(metrics.snapshot().files_served, 1);

    // A missing file is a remote error, not a dead connection.
    match client.download("missing.txt") {
        Err(LinkError::Remote(msg)) => assert!(msg.contains("File not found: missing.txt")),
        other => panic!("expected Remote error, got {:?}", other),
    }
    assert_eq!(client.list_files().unwrap().len(), 2);
}

#[test]
fn test_transfer_server_rejects_unknown_kind_in_band() {
    use std::time::Duration;
    use txlink::transfer::{TransferKind, TransferMessage};

    let dir = tempfile::tempdir().unwrap();
    let (addr, _) = start_server(
        Config::builder()
            .listen_addr("127.0.0.1:0")
            .protocol(ProtocolVariant::FileTransfer)
            .files_dir(dir.path())
            .build(),
    );

    let client = TransferClient::connect(ClientConfig::new(addr.to_string())).unwrap();
    let reply = client
        .send_request(
            TransferMessage::new(TransferKind::Other(42), Vec::new()),
            Duration::from_secs(5),
        )
        .unwrap()
        .wait()
        .unwrap();

    assert_eq!(reply.kind, TransferKind::Error);
    assert_eq!(reply.data, b"Unknown message type");

    // And the connection is still usable afterwards.
    assert!(client.list_files().unwrap().is_empty());
}
