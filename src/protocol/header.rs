//! Frame headers
//!
//! Fixed-width request and response headers. All multi-byte integers on the
//! wire are big-endian; all text fields are right-padded with NUL bytes to
//! their fixed width.

use crate::error::{LinkError, Result};

/// Request header length: 6 + 6 + 1 + 7 + 20 + 2
pub const REQUEST_HEADER_LENGTH: usize = 42;

/// Response header length: status + reserved
pub const RESPONSE_HEADER_LENGTH: usize = 2;

/// Length field width (big-endian u32)
pub const LENGTH_FIELD_LENGTH: usize = 4;

/// Transaction class carried in a request header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionType {
    /// Business transaction (QUERY/UPDATE/DELETE codes)
    Business,

    /// Sign-in transaction
    Signin,

    /// Any byte value outside the defined set; answered with a failed
    /// response rather than rejected at the frame level
    Other(u8),
}

impl TransactionType {
    pub fn from_byte(b: u8) -> Self {
        match b {
            0 => TransactionType::Business,
            1 => TransactionType::Signin,
            other => TransactionType::Other(other),
        }
    }

    pub fn as_byte(&self) -> u8 {
        match self {
            TransactionType::Business => 0,
            TransactionType::Signin => 1,
            TransactionType::Other(b) => *b,
        }
    }
}

/// Response status byte.
///
/// Deliberately closed over {0, 1}: the request/response classification
/// heuristic only recognizes these two values in the first frame byte, so a
/// wider status space could not be represented on this wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Status {
    Success = 0x00,
    Failed = 0x01,
}

impl Status {
    pub fn from_byte(b: u8) -> Result<Self> {
        match b {
            0x00 => Ok(Status::Success),
            0x01 => Ok(Status::Failed),
            other => Err(LinkError::Protocol(format!(
                "unknown response status: 0x{:02x}",
                other
            ))),
        }
    }
}

/// The 42-byte request header.
///
/// Text fields decode with trailing whitespace and NUL bytes trimmed, and
/// encode NUL-padded to their fixed width. Over-length values are truncated
/// on encode; this is lossy and intentional.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestHeader {
    /// Sending system node id (6 bytes)
    pub sender_node_id: String,

    /// Receiving system node id (6 bytes)
    pub receiver_node_id: String,

    /// Transaction class (1 byte)
    pub transaction_type: TransactionType,

    /// Transaction code (7 bytes), e.g. QUERY / UPDATE / DELETE
    pub transaction_code: String,

    /// Caller-assigned monotonically increasing decimal serial (20 bytes)
    pub transaction_serial: String,

    /// Reserved (2 bytes), round-tripped verbatim
    pub reserved: [u8; 2],
}

impl RequestHeader {
    pub fn new(
        sender_node_id: impl Into<String>,
        receiver_node_id: impl Into<String>,
        transaction_type: TransactionType,
        transaction_code: impl Into<String>,
        transaction_serial: impl Into<String>,
    ) -> Self {
        Self {
            sender_node_id: sender_node_id.into(),
            receiver_node_id: receiver_node_id.into(),
            transaction_type,
            transaction_code: transaction_code.into(),
            transaction_serial: transaction_serial.into(),
            reserved: [0u8; 2],
        }
    }

    /// Serialize to the fixed 42-byte wire layout
    pub fn to_bytes(&self) -> [u8; REQUEST_HEADER_LENGTH] {
        let mut buf = [0u8; REQUEST_HEADER_LENGTH];
        write_padded(&mut buf[0..6], self.sender_node_id.as_bytes());
        write_padded(&mut buf[6..12], self.receiver_node_id.as_bytes());
        buf[12] = self.transaction_type.as_byte();
        write_padded(&mut buf[13..20], self.transaction_code.as_bytes());
        write_padded(&mut buf[20..40], self.transaction_serial.as_bytes());
        buf[40..42].copy_from_slice(&self.reserved);
        buf
    }

    /// Parse from exactly 42 bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != REQUEST_HEADER_LENGTH {
            return Err(LinkError::Protocol(format!(
                "invalid request header length: {}",
                bytes.len()
            )));
        }

        let mut reserved = [0u8; 2];
        reserved.copy_from_slice(&bytes[40..42]);

        Ok(Self {
            sender_node_id: read_padded(&bytes[0..6]),
            receiver_node_id: read_padded(&bytes[6..12]),
            transaction_type: TransactionType::from_byte(bytes[12]),
            transaction_code: read_padded(&bytes[13..20]),
            transaction_serial: read_padded(&bytes[20..40]),
            reserved,
        })
    }
}

/// The 2-byte response header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseHeader {
    pub status: Status,
}

impl ResponseHeader {
    pub fn new(status: Status) -> Self {
        Self { status }
    }

    /// Serialize to the fixed 2-byte wire layout (second byte reserved)
    pub fn to_bytes(&self) -> [u8; RESPONSE_HEADER_LENGTH] {
        [self.status as u8, 0x00]
    }

    /// Parse from exactly 2 bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != RESPONSE_HEADER_LENGTH {
            return Err(LinkError::Protocol(format!(
                "invalid response header length: {}",
                bytes.len()
            )));
        }
        Ok(Self {
            status: Status::from_byte(bytes[0])?,
        })
    }
}

/// Copy `value` into `field`, truncating or NUL-padding to the field width.
fn write_padded(field: &mut [u8], value: &[u8]) {
    let n = value.len().min(field.len());
    field[..n].copy_from_slice(&value[..n]);
}

/// Decode a padded field, trimming trailing whitespace and NUL bytes.
fn read_padded(field: &[u8]) -> String {
    let text = String::from_utf8_lossy(field);
    text.trim_end_matches(|c: char| c == '\0' || c.is_whitespace())
        .to_string()
}
