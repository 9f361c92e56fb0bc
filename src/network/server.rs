//! TCP Server
//!
//! Accepts connections and hands each to its own handler thread.

use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::{Config, ProtocolVariant};
use crate::dispatch::{Dispatcher, ResponseTemplates};
use crate::error::Result;
use crate::metrics::ServerMetrics;
use crate::transfer::{DirStore, FileStore};

use super::connection::Connection;
use super::transfer::TransferConnection;

/// The service a listening socket provides.
#[derive(Clone)]
pub enum Service {
    /// Transaction dispatch (signin/business requests)
    Transaction(Arc<Dispatcher>),

    /// File listing and download
    FileTransfer(Arc<dyn FileStore>),
}

/// TCP server for either protocol variant.
pub struct Server {
    config: Config,
    service: Service,
    listener: TcpListener,
    metrics: Arc<ServerMetrics>,
    shutdown: Arc<AtomicBool>,
}

impl Server {
    /// Bind a listener and build the service the config selects.
    pub fn bind(config: Config) -> Result<Self> {
        let service = match config.protocol {
            ProtocolVariant::Transaction => {
                let templates = match &config.response_config {
                    Some(path) => ResponseTemplates::load(path)?,
                    None => ResponseTemplates::default(),
                };
                Service::Transaction(Arc::new(Dispatcher::with_templates(templates)))
            }
            ProtocolVariant::FileTransfer => {
                Service::FileTransfer(Arc::new(DirStore::new(&config.files_dir)))
            }
        };
        Self::bind_with(config, service)
    }

    /// Bind a listener for an explicitly provided service.
    pub fn bind_with(config: Config, service: Service) -> Result<Self> {
        let listener = TcpListener::bind(&config.listen_addr)?;
        Ok(Self {
            config,
            service,
            listener,
            metrics: Arc::new(ServerMetrics::new()),
            shutdown: Arc::new(AtomicBool::new(false)),
        })
    }

    /// The bound address (useful when listening on port 0).
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Shared counters for the administrative surface.
    pub fn metrics(&self) -> Arc<ServerMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Signal the accept loop to stop.
    ///
    /// Takes effect when the blocking accept wakes for the next connection.
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    /// Run the accept loop (blocking).
    pub fn run(&self) -> Result<()> {
        tracing::info!("TCP Server started on {}", self.local_addr()?);

        for stream in self.listener.incoming() {
            if self.shutdown.load(Ordering::SeqCst) {
                break;
            }

            let stream = match stream {
                Ok(stream) => stream,
                Err(e) => {
                    tracing::warn!("Failed to accept connection: {}", e);
                    continue;
                }
            };

            if self.metrics.connected_clients() >= self.config.max_connections {
                tracing::warn!(
                    "Max connections reached, rejecting {}",
                    stream
                        .peer_addr()
                        .map(|a| a.to_string())
                        .unwrap_or_else(|_| "unknown".to_string())
                );
                drop(stream);
                continue;
            }

            self.spawn_handler(stream);
        }

        tracing::info!("TCP Server shutdown complete");
        Ok(())
    }

    fn spawn_handler(&self, stream: TcpStream) {
        let service = self.service.clone();
        let metrics = Arc::clone(&self.metrics);
        let read_ms = self.config.read_timeout_ms;
        let write_ms = self.config.write_timeout_ms;

        std::thread::spawn(move || {
            let peer = stream
                .peer_addr()
                .map(|a| a.to_string())
                .unwrap_or_else(|_| "unknown".to_string());

            let total = metrics.client_connected();
            tracing::info!("Client connected: {}, Total clients: {}", peer, total);

            let result = handle_connection(stream, &service, &metrics, read_ms, write_ms);
            if let Err(e) = result {
                tracing::warn!("Connection {} closed with error: {}", peer, e);
            }

            let total = metrics.client_disconnected();
            tracing::info!("Client disconnected: {}, Total clients: {}", peer, total);
        });
    }
}

fn handle_connection(
    stream: TcpStream,
    service: &Service,
    metrics: &Arc<ServerMetrics>,
    read_ms: u64,
    write_ms: u64,
) -> Result<()> {
    match service {
        Service::Transaction(dispatcher) => {
            let mut conn = Connection::new(stream, Arc::clone(dispatcher), Arc::clone(metrics))?;
            conn.set_timeouts(read_ms, write_ms)?;
            conn.handle()
        }
        Service::FileTransfer(store) => {
            let mut conn =
                TransferConnection::new(stream, Arc::clone(store), Arc::clone(metrics))?;
            conn.set_timeouts(read_ms, write_ms)?;
            conn.handle()
        }
    }
}
