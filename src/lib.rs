//! # txlink
//!
//! A framed TCP request/response protocol:
//! - Fixed-width binary headers with a length-prefixed envelope
//! - Streaming decoder that reassembles frames from a byte stream
//! - Single-outstanding-request correlation over persistent connections
//! - A second framing variant for file listing and download
//!
//! ## Architecture Overview
//!
//! ```text
//!           bytes in                              bytes out
//!              │                                      ▲
//!              ▼                                      │
//!       ┌─────────────┐     Message      ┌────────────────────┐
//!       │FrameDecoder │ ───────────────▶ │   Frame Encoder    │
//!       └─────────────┘                  └────────────────────┘
//!              │                                      ▲
//!              ▼                                      │
//!   server: ┌──────────────┐            client: ┌───────────┐
//!           │  Dispatcher  │                    │  Session  │
//!           │ (tx routing) │                    │ (1 slot)  │
//!           └──────────────┘                    └───────────┘
//! ```
//!
//! The wire format carries no request/response discriminant byte; frames
//! are classified by a byte-pattern heuristic (see [`protocol::Message::classify`]).
//! Within one connection at most one request is outstanding, so arrival
//! order alone correlates responses to requests.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod client;
pub mod dispatch;
pub mod metrics;
pub mod network;
pub mod protocol;
pub mod transfer;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use client::{ClientConfig, Reply, TransferClient, TxClient};
pub use config::{Config, ProtocolVariant};
pub use error::{LinkError, Result};
pub use metrics::{MetricsSnapshot, ServerMetrics};
pub use network::Server;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of txlink
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
