//! Response templates
//!
//! The content side of request dispatch: per-branch response text and
//! status, with defaults that can be overridden from a JSON config file.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{LinkError, Result};
use crate::protocol::Status;

use super::ResponseSource;

/// Which response a dispatched request resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    SigninSuccess,
    QuerySuccess,
    UpdateSuccess,
    DeleteSuccess,
    UnknownCode,
    UnknownType,
}

#[derive(Debug, Clone)]
struct Template {
    text: String,
    status: Status,
}

impl Template {
    fn new(text: &str, status: Status) -> Self {
        Self {
            text: text.to_string(),
            status,
        }
    }
}

/// Template-driven [`ResponseSource`].
///
/// Placeholders: `{data}` (request payload), `{code}` (transaction code),
/// `{type}` (transaction type byte), `{timestamp}` (render time, local,
/// ISO-8601 seconds).
#[derive(Debug, Clone)]
pub struct ResponseTemplates {
    signin_success: Template,
    query_success: Template,
    update_success: Template,
    delete_success: Template,
    unknown_code: Template,
    unknown_type: Template,
}

impl Default for ResponseTemplates {
    fn default() -> Self {
        Self {
            signin_success: Template::new("Sign in successful at {timestamp}", Status::Success),
            query_success: Template::new(
                "Query result: {data} - processed at {timestamp}",
                Status::Success,
            ),
            update_success: Template::new(
                "Update result: {data} - updated at {timestamp}",
                Status::Success,
            ),
            delete_success: Template::new(
                "Delete result: {data} - deleted at {timestamp}",
                Status::Success,
            ),
            unknown_code: Template::new("Unknown transaction code: {code}", Status::Failed),
            unknown_type: Template::new("Unknown transaction type: {type}", Status::Failed),
        }
    }
}

impl ResponseTemplates {
    /// Load template overrides from a JSON config file.
    ///
    /// Missing sections keep their defaults, so a config file only needs to
    /// name the branches it changes.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let file: FileConfig = serde_json::from_str(&content)
            .map_err(|e| LinkError::Config(format!("{}: {}", path.display(), e)))?;

        let mut templates = Self::default();
        if let Some(section) = file.signin {
            apply(&mut templates.signin_success, section.success);
        }
        if let Some(business) = file.business {
            if let Some(section) = business.query {
                apply(&mut templates.query_success, section.success);
            }
            if let Some(section) = business.update {
                apply(&mut templates.update_success, section.success);
            }
            if let Some(section) = business.delete {
                apply(&mut templates.delete_success, section.success);
            }
            apply(&mut templates.unknown_code, business.unknown);
        }
        if let Some(error) = file.error {
            apply(&mut templates.unknown_type, error.unknown_transaction_type);
        }

        tracing::info!("Response config loaded from file: {}", path.display());
        Ok(templates)
    }

    fn template(&self, kind: ResponseKind) -> &Template {
        match kind {
            ResponseKind::SigninSuccess => &self.signin_success,
            ResponseKind::QuerySuccess => &self.query_success,
            ResponseKind::UpdateSuccess => &self.update_success,
            ResponseKind::DeleteSuccess => &self.delete_success,
            ResponseKind::UnknownCode => &self.unknown_code,
            ResponseKind::UnknownType => &self.unknown_type,
        }
    }
}

impl ResponseSource for ResponseTemplates {
    fn generate(&self, kind: ResponseKind, detail: &str) -> (String, Status) {
        let template = self.template(kind);
        let timestamp = chrono::Local::now()
            .format("%Y-%m-%dT%H:%M:%S")
            .to_string();
        let text = template
            .text
            .replace("{data}", detail)
            .replace("{code}", detail)
            .replace("{type}", detail)
            .replace("{timestamp}", &timestamp);
        (text, template.status)
    }
}

fn apply(slot: &mut Template, entry: Option<Entry>) {
    if let Some(entry) = entry {
        if let Some(text) = entry.template {
            slot.text = text;
        }
        if let Some(status) = entry.status {
            // Only the two representable status bytes are accepted; anything
            // else would break response classification on the wire.
            if let Ok(status) = Status::from_byte(status) {
                slot.status = status;
            } else {
                tracing::warn!("Ignoring out-of-range status byte {} in config", status);
            }
        }
    }
}

// Mirrors the nesting of response-config.json.

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    signin: Option<Section>,
    business: Option<BusinessSection>,
    error: Option<ErrorSection>,
}

#[derive(Debug, Default, Deserialize)]
struct Section {
    success: Option<Entry>,
}

#[derive(Debug, Default, Deserialize)]
struct BusinessSection {
    query: Option<Section>,
    update: Option<Section>,
    delete: Option<Section>,
    unknown: Option<Entry>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorSection {
    unknown_transaction_type: Option<Entry>,
}

#[derive(Debug, Deserialize)]
struct Entry {
    status: Option<u8>,
    template: Option<String>,
}
