//! File-transfer codec
//!
//! ## Wire Format
//!
//! ```text
//! ┌──────────┬─────────────┬─────────────────────┐
//! │ Kind (1) │ Length (4)  │        Data         │
//! └──────────┴─────────────┴─────────────────────┘
//! ```
//!
//! Unlike the transaction variant, the length field counts the data only.
//! The two length conventions are a deployed-wire constraint and must not
//! be harmonized.

use bytes::BytesMut;

use crate::error::{LinkError, Result};

use super::message::{TransferKind, TransferMessage};

/// Kind byte + 4-byte data length
pub const TRANSFER_HEADER_LENGTH: usize = 5;

/// Largest data block the transfer variant accepts (10 MiB)
pub const MAX_TRANSFER_DATA: usize = 10 * 1024 * 1024;

/// Incremental decoder for transfer frames.
///
/// Same contract as [`FrameDecoder`](crate::protocol::FrameDecoder): consume
/// one whole frame or leave the buffer untouched.
#[derive(Debug, Clone)]
pub struct TransferDecoder {
    max_data: usize,
}

impl Default for TransferDecoder {
    fn default() -> Self {
        Self::new(MAX_TRANSFER_DATA)
    }
}

impl TransferDecoder {
    pub fn new(max_data: usize) -> Self {
        Self { max_data }
    }

    pub fn decode(&self, buf: &mut BytesMut) -> Result<Option<TransferMessage>> {
        if buf.len() < TRANSFER_HEADER_LENGTH {
            return Ok(None);
        }

        let kind = TransferKind::from_byte(buf[0]);
        let data_len = u32::from_be_bytes([buf[1], buf[2], buf[3], buf[4]]) as usize;

        if data_len > self.max_data {
            return Err(LinkError::InvalidFrame(format!(
                "invalid message length: {}",
                data_len
            )));
        }

        if buf.len() < TRANSFER_HEADER_LENGTH + data_len {
            return Ok(None);
        }

        let frame = buf.split_to(TRANSFER_HEADER_LENGTH + data_len);
        Ok(Some(TransferMessage {
            kind,
            data: frame[TRANSFER_HEADER_LENGTH..].to_vec(),
        }))
    }
}

/// Encode a transfer message into its exact wire bytes.
pub fn encode(message: &TransferMessage) -> Vec<u8> {
    let mut buf = Vec::with_capacity(TRANSFER_HEADER_LENGTH + message.data.len());
    buf.push(message.kind.as_byte());
    buf.extend_from_slice(&(message.data.len() as u32).to_be_bytes());
    buf.extend_from_slice(&message.data);
    buf
}
