//! Transfer Connection Handler
//!
//! Per-connection read loop for the file-transfer variant: list and
//! download requests answered from the configured [`FileStore`].

use std::io::{Read, Write};
use std::net::TcpStream;
use std::sync::Arc;
use std::time::Duration;

use bytes::BytesMut;

use crate::error::Result;
use crate::metrics::ServerMetrics;
use crate::transfer::{
    encode, FileEntry, FileStore, TransferDecoder, TransferKind, TransferMessage,
};

/// Handles a single file-transfer connection.
pub struct TransferConnection {
    stream: TcpStream,
    peer_addr: String,
    store: Arc<dyn FileStore>,
    metrics: Arc<ServerMetrics>,
    decoder: TransferDecoder,
    buf: BytesMut,
}

impl TransferConnection {
    pub fn new(
        stream: TcpStream,
        store: Arc<dyn FileStore>,
        metrics: Arc<ServerMetrics>,
    ) -> Result<Self> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        stream.set_nodelay(true)?;

        Ok(Self {
            stream,
            peer_addr,
            store,
            metrics,
            decoder: TransferDecoder::default(),
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
                Err(ref e)
                    if matches!(
                        e.kind(),
                        std::io::ErrorKind::ConnectionReset
                            | std::io::ErrorKind::ConnectionAborted
                            | std::io::ErrorKind::WouldBlock
                            | std::io::ErrorKind::TimedOut
                    ) =>
                {
                    tracing::debug!("Client {} gone: {}", self.peer_addr, e);
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!("Error reading from {}: {}", self.peer_addr, e);
                    return Err(e.into());
                }
            };

            self.buf.extend_from_slice(&chunk[..n]);

            loop {
                match self.decoder.decode(&mut self.buf) {
                    Ok(Some(message)) => self.process(message)?,
                    Ok(None) => break,
                    Err(e) => {
                        tracing::error!("Error decoding message from {}: {}", self.peer_addr, e);
                        return Err(e);
                    }
                }
            }
        }
    }

    fn process(&mut self, message: TransferMessage) -> Result<()> {
        self.metrics.record_request();
        tracing::debug!(
            "Received message kind {:?} from {}",
            message.kind,
            self.peer_addr
        );

        match message.kind {
            TransferKind::ListFiles => self.handle_list_files(),
            TransferKind::DownloadFile => self.handle_download(&message),
            other => {
                tracing::warn!("Unknown message type: {:?}", other);
                self.send_error("Unknown message type")
            }
        }
    }

    fn handle_list_files(&mut self) -> Result<()> {
        match self.store.list() {
            Ok(entries) => {
                let listing = FileEntry::render_listing(&entries);
                tracing::info!("Sent file list with {} files", entries.len());
                self.send(&TransferMessage::text(TransferKind::FileList, &listing))
            }
            Err(e) => self.send_error(&format!("Error getting file list: {}", e)),
        }
    }

    fn handle_download(&mut self, message: &TransferMessage) -> Result<()> {
        let name = String::from_utf8_lossy(&message.data).to_string();
        tracing::info!("Download request for file: {}", name);

        if !self.store.exists(&name) {
            return self.send_error(&format!("File not found: {}", name));
        }

        match self.store.read(&name) {
            Ok(data) => {
                let served = self.metrics.record_file_served();
                tracing::info!(
                    "Sent file: {}, size: {} bytes, Total files served: {}",
                    name,
                    data.len(),
                    served
                );
                self.send(&TransferMessage::new(TransferKind::FileData, data))
            }
            Err(e) => self.send_error(&format!("Error reading file: {}", e)),
        }
    }

    fn send_error(&mut self, text: &str) -> Result<()> {
        tracing::warn!("Sent error response: {}", text);
        self.send(&TransferMessage::text(TransferKind::Error, text))
    }

    fn send(&mut self, message: &TransferMessage) -> Result<()> {
        self.stream.write_all(&encode(message))?;
        Ok(())
    }
}
