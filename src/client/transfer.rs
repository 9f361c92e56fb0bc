//! File-transfer client
//!
//! Lists and downloads files from a server speaking the transfer variant.
//! Correlation works exactly as for the transaction client: one exchange
//! outstanding, resolved by the next inbound frame.

use std::io::Write;
use std::net::{Shutdown, TcpStream};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use bytes::BytesMut;

use crate::error::{LinkError, Result};
use crate::transfer::{encode, FileEntry, TransferDecoder, TransferKind, TransferMessage};

use super::session::{
    Delivery, PendingResponse, Session, LONG_EXCHANGE_TIMEOUT, SHORT_EXCHANGE_TIMEOUT,
};
use super::{read_chunk, resolve_addr, ClientConfig};

/// Client for the file-transfer protocol variant.
pub struct TransferClient {
    stream: TcpStream,
    session: Arc<Session<TransferMessage>>,
    reader: Option<JoinHandle<()>>,
}

impl TransferClient {
    /// Connect and start the reader thread.
    pub fn connect(config: ClientConfig) -> Result<Self> {
        let addr = resolve_addr(&config.server_addr)?;
        let stream = TcpStream::connect_timeout(&addr, config.connect_timeout)?;
        stream.set_nodelay(true)?;

        let session = Arc::new(Session::new());
        let reader_stream = stream.try_clone()?;
        let reader_session = Arc::clone(&session);
        let reader = std::thread::Builder::new()
            .name("txlink-transfer-reader".to_string())
            .spawn(move || read_loop(reader_stream, reader_session))?;

        tracing::info!("Connected to server {}", config.server_addr);

        Ok(Self {
            stream,
            session,
            reader: Some(reader),
        })
    }

    pub fn is_connected(&self) -> bool {
        !self.session.is_closed()
    }

    /// Fetch the server's file listing.
    pub fn list_files(&self) -> Result<Vec<FileEntry>> {
        let reply = self
            .send_request(
                TransferMessage::new(TransferKind::ListFiles, Vec::new()),
                SHORT_EXCHANGE_TIMEOUT,
            )?
            .wait()?;

        match reply.kind {
            TransferKind::FileList => {
                let text = String::from_utf8_lossy(&reply.data);
                Ok(FileEntry::parse_listing(&text))
            }
            TransferKind::Error => Err(LinkError::Remote(
                String::from_utf8_lossy(&reply.data).into_owned(),
            )),
            other => Err(LinkError::Protocol(format!(
                "unexpected response kind: {:?}",
                other
            ))),
        }
    }

    /// Download one file by name.
    pub fn download(&self, name: &str) -> Result<Vec<u8>> {
        let reply = self
            .send_request(
                TransferMessage::text(TransferKind::DownloadFile, name),
                LONG_EXCHANGE_TIMEOUT,
            )?
            .wait()?;

        match reply.kind {
            TransferKind::FileData => Ok(reply.data),
            TransferKind::Error => Err(LinkError::Remote(
                String::from_utf8_lossy(&reply.data).into_owned(),
            )),
            other => Err(LinkError::Protocol(format!(
                "unexpected response kind: {:?}",
                other
            ))),
        }
    }

    /// Issue one request and return its pending response.
    pub fn send_request(
        &self,
        message: TransferMessage,
        timeout: Duration,
    ) -> Result<PendingResponse<TransferMessage>> {
        let rx = self.session.begin()?;
        if let Err(e) = (&self.stream).write_all(&encode(&message)) {
            self.session.abort();
            return Err(e.into());
        }
        Ok(PendingResponse::new(rx, timeout))
    }

    /// Close the connection, failing any pending exchange first.
    pub fn disconnect(mut self) -> Result<()> {
        self.teardown();
        tracing::info!("Disconnected from server");
        Ok(())
    }

    fn teardown(&mut self) {
        self.session.close();
        let _ = self.stream.shutdown(Shutdown::Both);
        if let Some(handle) = self.reader.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for TransferClient {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn read_loop(mut stream: TcpStream, session: Arc<Session<TransferMessage>>) {
    let decoder = TransferDecoder::default();
    let mut buf = BytesMut::with_capacity(8 * 1024);

    loop {
        match read_chunk(&mut stream, &mut buf) {
            Ok(0) => {
                tracing::debug!("Server closed the connection");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!("Read error from server: {}", e);
                break;
            }
        }

        loop {
            match decoder.decode(&mut buf) {
                // The transfer variant has no request/response distinction on
                // the wire; any inbound frame answers the outstanding exchange.
                Ok(Some(message)) => match session.complete(message) {
                    Delivery::Completed => {}
                    Delivery::Stale => {
                        tracing::debug!("Discarded reply for a timed-out exchange")
                    }
                    Delivery::Unexpected => {
                        tracing::warn!("Received message with no request outstanding")
                    }
                },
                Ok(None) => break,
                Err(e) => {
                    tracing::error!("Error decoding message: {}", e);
                    let _ = stream.shutdown(Shutdown::Both);
                    session.close();
                    return;
                }
            }
        }
    }

    session.close();
}
