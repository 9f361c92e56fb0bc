//! Network Module
//!
//! TCP server and per-connection handlers.
//!
//! ## Architecture
//! - Single acceptor loop
//! - One handler thread per connection
//! - Frames routed through the Dispatcher or FileStore

mod connection;
mod server;
mod transfer;

pub use connection::Connection;
pub use server::{Server, Service};
pub use transfer::TransferConnection;
