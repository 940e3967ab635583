//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, body limit > 0)
//! - Check the upstream URL parses when present
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - An empty upstream base URL is deliberately legal: its absence is
//!   tolerated at startup and reported at first request time

use url::Url;

use crate::config::schema::GatewayConfig;

/// A single semantic validation failure.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a configuration, collecting every failure.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.timeouts.read_secs == 0 {
        errors.push(err("timeouts.read_secs", "must be greater than zero"));
    }
    if config.timeouts.write_secs == 0 {
        errors.push(err("timeouts.write_secs", "must be greater than zero"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(err("timeouts.request_secs", "must be greater than zero"));
    }
    if config.limits.max_body_bytes == 0 {
        errors.push(err("limits.max_body_bytes", "must be greater than zero"));
    }

    let base_url = config.upstream.base_url.trim();
    if !base_url.is_empty() && Url::parse(base_url).is_err() {
        errors.push(err("upstream.base_url", "is not a valid URL"));
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

fn err(field: &str, message: &str) -> ValidationError {
    ValidationError {
        field: field.to_string(),
        message: message.to_string(),
    }
}
