//! Gateway error taxonomy and the normalized error envelope.
//!
//! # Responsibilities
//! - Classify transport-level failures (timeout / unreachable / generic)
//! - Carry non-2xx upstream responses with their original status and body
//! - Produce the uniform `ErrorEnvelope` shape returned to the browser
//!
//! # Design Decisions
//! - Every failure kind is caught at the handler boundary; nothing panics
//!   or leaks a stack trace to the caller
//! - The human-readable text is extracted from the upstream body trying
//!   `message`, then `error`, then raw text, in that fixed order

use std::time::Duration;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Failure kinds produced while proxying a single request.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// Upstream answered with a non-2xx status. Body and content type are
    /// preserved so the relayer can extract a message from them.
    #[error("upstream responded with status {status}")]
    UpstreamHttp {
        status: u16,
        body: Bytes,
        content_type: Option<String>,
    },

    /// No response arrived within the per-endpoint budget.
    #[error("upstream request timed out after {budget:?}")]
    Timeout { budget: Duration },

    /// Name resolution or connection establishment failed.
    #[error("upstream unreachable: {message}")]
    Unreachable { message: String },

    /// Any other transport-level failure.
    #[error("upstream network error: {message}")]
    Network { message: String },

    /// Inbound body failed required-field validation. Detected before any
    /// upstream call is made.
    #[error("malformed request")]
    MalformedRequest { details: Vec<String> },
}

impl ProxyError {
    /// Classify a client error from the outbound HTTP call.
    ///
    /// Connect-phase failures (DNS, refused connections) are distinguished
    /// from other transport errors so the relayer can word them differently.
    pub fn from_client_error(err: &hyper_util::client::legacy::Error) -> Self {
        if err.is_connect() {
            ProxyError::Unreachable {
                message: err.to_string(),
            }
        } else {
            ProxyError::Network {
                message: err.to_string(),
            }
        }
    }

    /// Short label for logs and metrics.
    pub fn outcome_label(&self) -> &'static str {
        match self {
            ProxyError::UpstreamHttp { .. } => "upstream_error",
            ProxyError::Timeout { .. } => "timeout",
            ProxyError::Unreachable { .. } => "unreachable",
            ProxyError::Network { .. } => "network",
            ProxyError::MalformedRequest { .. } => "bad_request",
        }
    }
}

/// Normalized error shape sent to the browser.
///
/// Produced whenever the upstream responds non-2xx or the transport fails.
/// `message` carries optional per-route context ("Failed to update paper"),
/// `error` the text extracted from the upstream body, `status` the HTTP
/// status the gateway responds with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub error: String,
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl ErrorEnvelope {
    pub fn new(error: impl Into<String>, status: u16) -> Self {
        Self {
            message: None,
            error: error.into(),
            status,
            details: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_details(mut self, details: Vec<String>) -> Self {
        self.details = Some(details);
        self
    }
}

/// Extract a human-readable error string from an upstream body.
///
/// Tries, in order: a JSON `message` field, a JSON `error` field, the raw
/// body text. Falls back to the status reason phrase when the body is empty.
pub fn extract_error_text(body: &[u8], status: u16) -> String {
    if let Ok(value) = serde_json::from_slice::<Value>(body) {
        if let Some(message) = value.get("message").and_then(Value::as_str) {
            return message.to_string();
        }
        if let Some(error) = value.get("error").and_then(Value::as_str) {
            return error.to_string();
        }
    }

    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if text.is_empty() {
        format!("upstream returned status {}", status)
    } else {
        text.to_string()
    }
}
