//! Protocol Module
//!
//! Wire format for the transaction request/response protocol.
//!
//! ## Frame layout (big-endian throughout)
//!
//! ```text
//! Request:  [ header (42) ][ total length (4) ][ payload ]
//! Response: [ header (2)  ][ total length (4) ][ payload ]
//! ```
//!
//! ### Request header (42 bytes)
//! - sender node id (6, NUL-padded ASCII)
//! - receiver node id (6, NUL-padded ASCII)
//! - transaction type (1: 0 = business, 1 = signin)
//! - transaction code (7, NUL-padded ASCII)
//! - transaction serial (20, NUL-padded decimal string)
//! - reserved (2)
//!
//! ### Response header (2 bytes)
//! - status (1: 0x00 = success, 0x01 = failed)
//! - reserved (1, always 0)
//!
//! There is no discriminant byte; frames are classified by the byte-pattern
//! heuristic documented on [`Message::classify`].

mod codec;
mod header;
mod message;

pub use codec::{encode, FrameDecoder, MAX_FRAME_LENGTH, MIN_FRAME_LENGTH};
pub use header::{
    RequestHeader, ResponseHeader, Status, TransactionType, LENGTH_FIELD_LENGTH,
    REQUEST_HEADER_LENGTH, RESPONSE_HEADER_LENGTH,
};
pub use message::Message;
