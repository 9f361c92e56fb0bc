//! Dispatch Module
//!
//! Server-side request routing: transaction type selects signin vs
//! business handling, transaction code selects the business branch.
//! Unknown types and codes are answered with a failed-status response on
//! the same connection; they are never connection-fatal.

mod templates;

pub use templates::{ResponseKind, ResponseTemplates};

use crate::protocol::{Message, RequestHeader, ResponseHeader, Status, TransactionType};

/// Provider of response content for each dispatch branch.
///
/// Kept behind a trait so the content layer (templating, config files) can
/// evolve without touching the protocol path.
pub trait ResponseSource: Send + Sync {
    /// Produce the response text and status for one dispatch branch.
    ///
    /// `detail` is branch-dependent: the request payload for success
    /// branches, the offending code or type for the unknown branches.
    fn generate(&self, kind: ResponseKind, detail: &str) -> (String, Status);
}

/// Routes decoded requests to response content.
pub struct Dispatcher {
    source: Box<dyn ResponseSource>,
}

impl Dispatcher {
    pub fn new(source: Box<dyn ResponseSource>) -> Self {
        Self { source }
    }

    pub fn with_templates(templates: ResponseTemplates) -> Self {
        Self::new(Box::new(templates))
    }

    /// Select a response for one decoded request.
    ///
    /// Always yields a response message; business-level problems are
    /// reported in-band with a failed status.
    pub fn dispatch(&self, header: &RequestHeader, payload: &[u8]) -> Message {
        let data = String::from_utf8_lossy(payload);

        let (kind, detail) = match header.transaction_type {
            TransactionType::Signin => (ResponseKind::SigninSuccess, data.to_string()),
            TransactionType::Business => match header.transaction_code.trim() {
                "QUERY" => (ResponseKind::QuerySuccess, data.to_string()),
                "UPDATE" => (ResponseKind::UpdateSuccess, data.to_string()),
                "DELETE" => (ResponseKind::DeleteSuccess, data.to_string()),
                other => (ResponseKind::UnknownCode, other.to_string()),
            },
            TransactionType::Other(byte) => (ResponseKind::UnknownType, byte.to_string()),
        };

        let (text, status) = self.source.generate(kind, &detail);

        tracing::debug!(
            "Dispatched: sender={}, code={}, serial={}, status={:?}",
            header.sender_node_id,
            header.transaction_code,
            header.transaction_serial,
            status
        );

        Message::response(ResponseHeader::new(status), text.into_bytes())
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::with_templates(ResponseTemplates::default())
    }
}
