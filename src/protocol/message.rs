//! Message envelope
//!
//! A complete frame: request or response header, the 4-byte total-length
//! field, and the payload. Messages are transient; each encode/decode call
//! builds a fresh value owned by the caller.

use crate::error::{LinkError, Result};

use super::header::{
    RequestHeader, ResponseHeader, LENGTH_FIELD_LENGTH, REQUEST_HEADER_LENGTH,
    RESPONSE_HEADER_LENGTH,
};

/// A complete protocol message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Request {
        header: RequestHeader,
        payload: Vec<u8>,
    },
    Response {
        header: ResponseHeader,
        payload: Vec<u8>,
    },
}

impl Message {
    pub fn request(header: RequestHeader, payload: impl Into<Vec<u8>>) -> Self {
        Message::Request {
            header,
            payload: payload.into(),
        }
    }

    pub fn response(header: ResponseHeader, payload: impl Into<Vec<u8>>) -> Self {
        Message::Response {
            header,
            payload: payload.into(),
        }
    }

    pub fn is_request(&self) -> bool {
        matches!(self, Message::Request { .. })
    }

    pub fn payload(&self) -> &[u8] {
        match self {
            Message::Request { payload, .. } => payload,
            Message::Response { payload, .. } => payload,
        }
    }

    fn header_length(&self) -> usize {
        match self {
            Message::Request { .. } => REQUEST_HEADER_LENGTH,
            Message::Response { .. } => RESPONSE_HEADER_LENGTH,
        }
    }

    /// Total encoded frame length: header + length field + payload
    pub fn total_length(&self) -> usize {
        self.header_length() + LENGTH_FIELD_LENGTH + self.payload().len()
    }

    /// Classify the leading bytes of a frame as request or response.
    ///
    /// The wire format carries no discriminant byte; the peer is recognized
    /// by shape alone. A frame is a response iff byte 0 is 0x00 or 0x01 and
    /// byte 1 is 0x00. This works because node ids never begin with those
    /// byte values. Compatibility constraint: must match the deployed
    /// protocol bit for bit, do not "improve" it.
    pub fn classify(prefix: &[u8]) -> bool {
        debug_assert!(prefix.len() >= 2);
        (prefix[0] == 0x00 || prefix[0] == 0x01) && prefix[1] == 0x00
    }

    /// Serialize the full frame: `[header][total_length:4 BE][payload]`
    pub fn to_bytes(&self) -> Vec<u8> {
        let total = self.total_length();
        let mut buf = Vec::with_capacity(total);
        match self {
            Message::Request { header, payload } => {
                buf.extend_from_slice(&header.to_bytes());
                buf.extend_from_slice(&(total as u32).to_be_bytes());
                buf.extend_from_slice(payload);
            }
            Message::Response { header, payload } => {
                buf.extend_from_slice(&header.to_bytes());
                buf.extend_from_slice(&(total as u32).to_be_bytes());
                buf.extend_from_slice(payload);
            }
        }
        buf
    }

    /// Parse one complete frame from exactly `bytes`.
    ///
    /// The stated total length must equal `bytes.len()`; any divergence is
    /// an [`LinkError::InvalidFrame`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < RESPONSE_HEADER_LENGTH + LENGTH_FIELD_LENGTH {
            return Err(LinkError::InvalidFrame(format!(
                "frame too short: {} bytes",
                bytes.len()
            )));
        }

        let header_len = if Self::classify(&bytes[..2]) {
            RESPONSE_HEADER_LENGTH
        } else {
            REQUEST_HEADER_LENGTH
        };

        if bytes.len() < header_len + LENGTH_FIELD_LENGTH {
            return Err(LinkError::InvalidFrame(format!(
                "frame too short for header: {} bytes",
                bytes.len()
            )));
        }

        let length_field = &bytes[header_len..header_len + LENGTH_FIELD_LENGTH];
        let stated = u32::from_be_bytes([
            length_field[0],
            length_field[1],
            length_field[2],
            length_field[3],
        ]) as usize;

        if stated != bytes.len() {
            return Err(LinkError::InvalidFrame(format!(
                "stated length {} does not match frame length {}",
                stated,
                bytes.len()
            )));
        }

        let payload = bytes[header_len + LENGTH_FIELD_LENGTH..].to_vec();

        if header_len == RESPONSE_HEADER_LENGTH {
            let header = ResponseHeader::from_bytes(&bytes[..RESPONSE_HEADER_LENGTH])?;
            Ok(Message::Response { header, payload })
        } else {
            let header = RequestHeader::from_bytes(&bytes[..REQUEST_HEADER_LENGTH])?;
            Ok(Message::Request { header, payload })
        }
    }
}
