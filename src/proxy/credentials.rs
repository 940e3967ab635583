//! Credential extraction and forwarding.
//!
//! # Responsibilities
//! - Locate the caller's identity on the inbound request
//! - Produce a single credential to attach to the outbound request
//!
//! # Design Decisions
//! - Pure extraction, no validation: authorization is the upstream's call
//! - Precedence: explicit `Authorization` header, then the session
//!   framework's `access_token` cookie, then an `Authorization` cookie,
//!   then a raw `JSESSIONID` vendor cookie forwarded as-is
//! - No credential found is not an error; the request proceeds
//!   unauthenticated

use axum::http::HeaderMap;

/// Credential extracted from an inbound request.
#[derive(Debug, Clone, PartialEq)]
pub enum Credential {
    /// Forward as `Authorization: Bearer <token>` (or verbatim if the
    /// value already carries a scheme).
    Bearer(String),
    /// Forward as a raw `Cookie` header.
    Cookie(String),
    /// Nothing found; the upstream sees an unauthenticated request.
    None,
}

impl Credential {
    /// Header value for the outbound `Authorization` header, if any.
    pub fn authorization_value(&self) -> Option<String> {
        match self {
            Credential::Bearer(token) => {
                if token.starts_with("Bearer ") {
                    Some(token.clone())
                } else {
                    Some(format!("Bearer {}", token))
                }
            }
            _ => None,
        }
    }

    /// Header value for the outbound `Cookie` header, if any.
    pub fn cookie_value(&self) -> Option<&str> {
        match self {
            Credential::Cookie(value) => Some(value),
            _ => None,
        }
    }
}

/// Extract the caller credential from inbound headers.
pub fn extract(headers: &HeaderMap) -> Credential {
    if let Some(auth) = headers.get("authorization").and_then(|v| v.to_str().ok()) {
        if !auth.is_empty() {
            return Credential::Bearer(auth.to_string());
        }
    }

    let cookies = headers.get("cookie").and_then(|v| v.to_str().ok()).unwrap_or("");

    if let Some(token) = cookie_value(cookies, "access_token") {
        return Credential::Bearer(token.to_string());
    }
    if let Some(token) = cookie_value(cookies, "Authorization") {
        return Credential::Bearer(token.to_string());
    }
    if let Some(session) = cookie_value(cookies, "JSESSIONID") {
        return Credential::Cookie(format!("JSESSIONID={}", session));
    }

    Credential::None
}

/// Find a named cookie in a `Cookie` header value.
fn cookie_value<'a>(cookies: &'a str, name: &str) -> Option<&'a str> {
    cookies.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        if key == name && !value.is_empty() {
            Some(value)
        } else {
            None
        }
    })
}
