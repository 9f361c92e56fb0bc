//! Transaction client
//!
//! Issues transaction requests over a persistent connection and correlates
//! each with its response through the session slot. A background reader
//! thread feeds the streaming decoder and resolves pending futures.

use std::io::Write;
use std::net::{Shutdown, TcpStream};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use bytes::BytesMut;

use crate::error::{LinkError, Result};
use crate::protocol::{FrameDecoder, Message, RequestHeader, Status, TransactionType};

use super::session::{
    Delivery, PendingResponse, Session, LONG_EXCHANGE_TIMEOUT, SHORT_EXCHANGE_TIMEOUT,
};
use super::{read_chunk, resolve_addr, ClientConfig};

/// A completed exchange, decoded for callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: Status,
    pub data: String,
}

impl Reply {
    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }
}

/// Client for the transaction protocol variant.
pub struct TxClient {
    stream: TcpStream,
    session: Arc<Session<Message>>,
    serial: AtomicU64,
    config: ClientConfig,
    reader: Option<JoinHandle<()>>,
}

impl TxClient {
    /// Connect and start the reader thread.
    pub fn connect(config: ClientConfig) -> Result<Self> {
        let addr = resolve_addr(&config.server_addr)?;
        let stream = TcpStream::connect_timeout(&addr, config.connect_timeout)?;
        stream.set_nodelay(true)?;

        let session = Arc::new(Session::new());
        let reader_stream = stream.try_clone()?;
        let reader_session = Arc::clone(&session);
        let reader = std::thread::Builder::new()
            .name("txlink-client-reader".to_string())
            .spawn(move || read_loop(reader_stream, reader_session))?;

        tracing::info!("Connected to server {}", config.server_addr);

        Ok(Self {
            stream,
            session,
            serial: AtomicU64::new(1),
            config,
            reader: Some(reader),
        })
    }

    pub fn is_connected(&self) -> bool {
        !self.session.is_closed()
    }

    // -------------------------------------------------------------------------
    // High-level exchanges
    // -------------------------------------------------------------------------

    pub fn sign_in(&self, data: &str) -> Result<Reply> {
        self.exchange(TransactionType::Signin, "SIGNIN", data, SHORT_EXCHANGE_TIMEOUT)
    }

    pub fn query(&self, data: &str) -> Result<Reply> {
        self.exchange(TransactionType::Business, "QUERY", data, SHORT_EXCHANGE_TIMEOUT)
    }

    pub fn update(&self, data: &str) -> Result<Reply> {
        self.exchange(TransactionType::Business, "UPDATE", data, LONG_EXCHANGE_TIMEOUT)
    }

    pub fn delete(&self, data: &str) -> Result<Reply> {
        self.exchange(TransactionType::Business, "DELETE", data, SHORT_EXCHANGE_TIMEOUT)
    }

    /// Send a business request with an arbitrary transaction code.
    pub fn send_business(&self, code: &str, data: &str) -> Result<Reply> {
        self.exchange(TransactionType::Business, code, data, SHORT_EXCHANGE_TIMEOUT)
    }

    fn exchange(
        &self,
        transaction_type: TransactionType,
        code: &str,
        data: &str,
        timeout: Duration,
    ) -> Result<Reply> {
        let pending = self.send_request(transaction_type, code, data.as_bytes(), timeout)?;
        match pending.wait()? {
            Message::Response { header, payload } => Ok(Reply {
                status: header.status,
                data: String::from_utf8_lossy(&payload).into_owned(),
            }),
            Message::Request { .. } => Err(LinkError::Protocol(
                "request frame resolved a pending exchange".to_string(),
            )),
        }
    }

    // -------------------------------------------------------------------------
    // Raw future API
    // -------------------------------------------------------------------------

    /// Issue one request and return its pending response.
    ///
    /// Fails immediately with [`LinkError::RequestInProgress`] while another
    /// exchange is outstanding. The serial is assigned here, monotonically,
    /// as a 20-digit zero-padded decimal.
    pub fn send_request(
        &self,
        transaction_type: TransactionType,
        code: &str,
        payload: &[u8],
        timeout: Duration,
    ) -> Result<PendingResponse<Message>> {
        let serial = format!("{:020}", self.serial.fetch_add(1, Ordering::SeqCst));
        let header = RequestHeader::new(
            &self.config.sender_node_id,
            &self.config.receiver_node_id,
            transaction_type,
            code,
            serial,
        );
        let message = Message::request(header, payload.to_vec());

        let rx = self.session.begin()?;
        if let Err(e) = (&self.stream).write_all(&message.to_bytes()) {
            // The request never reached the wire; free the slot.
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

impl Drop for TxClient {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn read_loop(mut stream: TcpStream, session: Arc<Session<Message>>) {
    let decoder = FrameDecoder::default();
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
                Ok(Some(message @ Message::Response { .. })) => {
                    match session.complete(message) {
                        Delivery::Completed => {}
                        Delivery::Stale => {
                            tracing::debug!("Discarded response for a timed-out exchange")
                        }
                        Delivery::Unexpected => {
                            tracing::warn!("Received response with no request outstanding")
                        }
                    }
                }
                Ok(Some(Message::Request { .. })) => {
                    tracing::warn!("Unexpected request frame from server, ignoring");
                }
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
