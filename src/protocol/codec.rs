//! Protocol codec
//!
//! Streaming frame decoder for the transaction protocol.
//!
//! ## Wire Format
//!
//! ### Request Frame
//! ```text
//! ┌───────────────┬─────────────┬─────────────────────┐
//! │ Header (42)   │ Length (4)  │       Payload       │
//! └───────────────┴─────────────┴─────────────────────┘
//! ```
//!
//! ### Response Frame
//! ```text
//! ┌───────────────┬─────────────┬─────────────────────┐
//! │ Header (2)    │ Length (4)  │       Payload       │
//! └───────────────┴─────────────┴─────────────────────┘
//! ```
//!
//! The length field counts the whole frame (header + 4 + payload),
//! big-endian. Frames are classified as request or response from their
//! first two bytes; see [`Message::classify`].

use bytes::BytesMut;

use crate::error::{LinkError, Result};

use super::header::{LENGTH_FIELD_LENGTH, REQUEST_HEADER_LENGTH, RESPONSE_HEADER_LENGTH};
use super::message::Message;

/// Smallest length-field value a frame may declare (the field itself)
pub const MIN_FRAME_LENGTH: usize = LENGTH_FIELD_LENGTH;

/// Largest frame the transaction variant accepts (1 MiB)
pub const MAX_FRAME_LENGTH: usize = 1024 * 1024;

/// Incremental frame decoder.
///
/// Purely a function of buffered bytes: each [`decode`](Self::decode) call
/// either consumes exactly one whole frame from the front of the buffer or
/// leaves the buffer untouched so the same bytes are retried once more data
/// has arrived. No state is kept across calls.
#[derive(Debug, Clone)]
pub struct FrameDecoder {
    max_frame: usize,
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new(MAX_FRAME_LENGTH)
    }
}

impl FrameDecoder {
    pub fn new(max_frame: usize) -> Self {
        Self { max_frame }
    }

    /// Try to extract one complete message from the front of `buf`.
    ///
    /// Returns `Ok(None)` when the buffer does not yet hold a whole frame.
    /// Returns `Err(InvalidFrame)` on a length outside bounds or a frame
    /// whose stated length disagrees with its content; the caller must close
    /// the connection, there is no resynchronization point.
    pub fn decode(&self, buf: &mut BytesMut) -> Result<Option<Message>> {
        // Not enough bytes to even classify the frame.
        if buf.len() < RESPONSE_HEADER_LENGTH {
            return Ok(None);
        }

        let header_len = if Message::classify(&buf[..2]) {
            RESPONSE_HEADER_LENGTH
        } else {
            REQUEST_HEADER_LENGTH
        };

        // Header plus length field must be fully buffered before the frame
        // size is known.
        if buf.len() < header_len + LENGTH_FIELD_LENGTH {
            return Ok(None);
        }

        let total = u32::from_be_bytes([
            buf[header_len],
            buf[header_len + 1],
            buf[header_len + 2],
            buf[header_len + 3],
        ]) as usize;

        if total < MIN_FRAME_LENGTH || total > self.max_frame {
            return Err(LinkError::InvalidFrame(format!(
                "invalid message length: {}",
                total
            )));
        }

        // A frame shorter than its own header cannot be consistent.
        if total < header_len + LENGTH_FIELD_LENGTH {
            return Err(LinkError::InvalidFrame(format!(
                "stated length {} shorter than {}-byte header",
                total, header_len
            )));
        }

        if buf.len() < total {
            // Partial frame; leave every byte in place and wait.
            return Ok(None);
        }

        // Whole frame available: consume it as one contiguous block and
        // re-derive the classification from the same bytes.
        let frame = buf.split_to(total);
        Message::from_bytes(&frame).map(Some)
    }
}

/// Encode a message into its exact wire bytes.
///
/// One call always produces one complete frame; nothing is retained
/// between calls.
pub fn encode(message: &Message) -> Vec<u8> {
    message.to_bytes()
}
