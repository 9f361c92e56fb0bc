//! Client Module
//!
//! Connecting side of both protocol variants. Each client owns a persistent
//! TCP connection, a reader thread feeding the streaming decoder, and a
//! [`Session`] enforcing the single-outstanding-request discipline.

mod session;
mod transfer;
mod tx;

pub use session::{
    Delivery, PendingResponse, Session, LONG_EXCHANGE_TIMEOUT, SHORT_EXCHANGE_TIMEOUT,
};
pub use transfer::TransferClient;
pub use tx::{Reply, TxClient};

use std::io::Read;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use bytes::BytesMut;

use crate::error::{LinkError, Result};

/// Client connection settings.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server address, `host:port`
    pub server_addr: String,

    /// Node id written into request headers as the sender
    pub sender_node_id: String,

    /// Node id written into request headers as the receiver
    pub receiver_node_id: String,

    /// TCP connect timeout
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_addr: "127.0.0.1:8888".to_string(),
            sender_node_id: "CLIENT".to_string(),
            receiver_node_id: "SERVER".to_string(),
            connect_timeout: Duration::from_millis(5000),
        }
    }
}

impl ClientConfig {
    pub fn new(server_addr: impl Into<String>) -> Self {
        Self {
            server_addr: server_addr.into(),
            ..Self::default()
        }
    }
}

pub(crate) fn resolve_addr(addr: &str) -> Result<SocketAddr> {
    addr.to_socket_addrs()?
        .next()
        .ok_or_else(|| LinkError::Config(format!("cannot resolve address: {}", addr)))
}

/// Read once from the stream into the decode buffer.
///
/// Returns the number of bytes read; 0 means the peer closed the stream.
pub(crate) fn read_chunk(stream: &mut TcpStream, buf: &mut BytesMut) -> std::io::Result<usize> {
    let mut chunk = [0u8; 4096];
    let n = stream.read(&mut chunk)?;
    buf.extend_from_slice(&chunk[..n]);
    Ok(n)
}
