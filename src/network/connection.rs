//! Connection Handler
//!
//! Per-connection read loop for the transaction variant: bytes in, frames
//! out of the streaming decoder, one dispatched response per request.

use std::io::{Read, Write};
use std::net::TcpStream;
use std::sync::Arc;
use std::time::Duration;

use bytes::BytesMut;

use crate::dispatch::Dispatcher;
use crate::error::{LinkError, Result};
use crate::metrics::ServerMetrics;
use crate::protocol::{FrameDecoder, Message};

/// Handles a single transaction-protocol connection.
pub struct Connection {
    stream: TcpStream,
    peer_addr: String,
    dispatcher: Arc<Dispatcher>,
    metrics: Arc<ServerMetrics>,
    decoder: FrameDecoder,
    buf: BytesMut,
}

impl Connection {
    pub fn new(
        stream: TcpStream,
        dispatcher: Arc<Dispatcher>,
        metrics: Arc<ServerMetrics>,
    ) -> Result<Self> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Disable Nagle's algorithm for low latency
        stream.set_nodelay(true)?;

        Ok(Self {
            stream,
            peer_addr,
            dispatcher,
            metrics,
            decoder: FrameDecoder::default(),
            buf: BytesMut::with_capacity(8 * 1024),
        })
    }

    /// Configure connection timeouts
    pub fn set_timeouts(&mut self, read_ms: u64, write_ms: u64) -> Result<()> {
        if read_ms > 0 {
            self.stream
                .set_read_timeout(Some(Duration::from_millis(read_ms)))?;
        }
        if write_ms > 0 {
            self.stream
                .set_write_timeout(Some(Duration::from_millis(write_ms)))?;
        }
        Ok(())
    }

    /// Handle the connection (blocking until closed)
    ///
    /// Reads frames in a loop and sends responses. Returns when the client
    /// disconnects or a fatal frame error occurs.
    pub fn handle(&mut self) -> Result<()> {
        tracing::debug!("Connection established from {}", self.peer_addr);

        let mut chunk = [0u8; 4096];
        loop {
            let n = match self.stream.read(&mut chunk) {
                Ok(0) => {
                    tracing::debug!("Client {} disconnected", self.peer_addr);
                    return Ok(());
                }
                Ok(n) => n,
                Err(ref e) if e.kind() == std::io::ErrorKind::ConnectionReset => {
                    tracing::debug!("Connection reset by client {}", self.peer_addr);
                    return Ok(());
                }
                Err(ref e) if e.kind() == std::io::ErrorKind::ConnectionAborted => {
                    tracing::debug!("Connection aborted by client {}", self.peer_addr);
                    return Ok(());
                }
                Err(ref e)
                    if e.kind() == std::io::ErrorKind::WouldBlock
                        || e.kind() == std::io::ErrorKind::TimedOut =>
                {
                    // Read timeout
                    tracing::debug!("Read timeout for client {}", self.peer_addr);
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!("Error reading from {}: {}", self.peer_addr, e);
                    return Err(e.into());
                }
            };

            self.buf.extend_from_slice(&chunk[..n]);

            // Drain every complete frame before reading again.
            loop {
                match self.decoder.decode(&mut self.buf) {
                    Ok(Some(message)) => self.process(message)?,
                    Ok(None) => break,
                    Err(e) => {
                        // No resynchronization point after a bad frame.
                        tracing::error!("Error decoding message from {}: {}", self.peer_addr, e);
                        return Err(e);
                    }
                }
            }
        }
    }

    fn process(&mut self, message: Message) -> Result<()> {
        match message {
            Message::Request { header, payload } => {
                self.metrics.record_request();
                tracing::debug!(
                    "Received request from {}: sender={}, type={:?}, code={}, serial={}",
                    self.peer_addr,
                    header.sender_node_id,
                    header.transaction_type,
                    header.transaction_code,
                    header.transaction_serial
                );

                let response = self.dispatcher.dispatch(&header, &payload);
                self.send(&response)
            }
            Message::Response { header, .. } => {
                // A server only logs responses it receives.
                self.metrics.record_response();
                tracing::debug!(
                    "Received response from {}: status={:?}",
                    self.peer_addr,
                    header.status
                );
                Ok(())
            }
        }
    }

    fn send(&mut self, message: &Message) -> Result<()> {
        if let Err(e) = self.stream.write_all(&message.to_bytes()) {
            match e.kind() {
                std::io::ErrorKind::ConnectionAborted
                | std::io::ErrorKind::ConnectionReset
                | std::io::ErrorKind::BrokenPipe => {
                    tracing::debug!(
                        "Client {} disconnected before response could be sent: {}",
                        self.peer_addr,
                        e
                    );
                    return Err(LinkError::ConnectionClosed);
                }
                _ => {}
            }
            tracing::warn!("Error writing to {}: {}", self.peer_addr, e);
            return Err(e.into());
        }
        Ok(())
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }
}
