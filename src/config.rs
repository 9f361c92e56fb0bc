//! Configuration for txlink
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

/// Which protocol variant a server speaks on its listening socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolVariant {
    /// Transaction request/response frames (42/2-byte headers, 1 MiB cap)
    Transaction,

    /// File transfer frames (1-byte kind + data, 10 MiB cap)
    FileTransfer,
}

/// Main configuration for a txlink server instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP listen address
    pub listen_addr: String,

    /// Max concurrent client connections
    pub max_connections: usize,

    /// Connection read timeout (milliseconds, 0 = none)
    pub read_timeout_ms: u64,

    /// Connection write timeout (milliseconds, 0 = none)
    pub write_timeout_ms: u64,

    // -------------------------------------------------------------------------
    // Protocol Configuration
    // -------------------------------------------------------------------------
    /// Protocol variant served on the listening socket
    pub protocol: ProtocolVariant,

    // -------------------------------------------------------------------------
    // Service Configuration
    // -------------------------------------------------------------------------
    /// Directory served by the file-transfer variant
    pub files_dir: PathBuf,

    /// Optional response-template config file (JSON)
    pub response_config: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8888".to_string(),
            max_connections: 1024,
            read_timeout_ms: 0,
            write_timeout_ms: 5000,
            protocol: ProtocolVariant::Transaction,
            files_dir: PathBuf::from("files"),
            response_config: None,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the maximum number of concurrent connections
    pub fn max_connections(mut self, count: usize) -> Self {
        self.config.max_connections = count;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    /// Set the protocol variant served on the socket
    pub fn protocol(mut self, variant: ProtocolVariant) -> Self {
        self.config.protocol = variant;
        self
    }

    /// Set the directory served by the file-transfer variant
    pub fn files_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.files_dir = path.into();
        self
    }

    /// Set the response-template config file
    pub fn response_config(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.response_config = Some(path.into());
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
