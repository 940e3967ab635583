//! Inbound-to-outbound request translation.
//!
//! # Responsibilities
//! - Build the upstream URL from the configured base, the route's path
//!   template, and the verbatim inbound query string
//! - Decide the body plan (none / multipart passthrough / raw passthrough)
//! - Apply the outbound header allowlist
//!
//! # Design Decisions
//! - Bodies are forwarded byte-for-byte, never re-serialized: re-encoding
//!   JSON would risk corrupting numeric precision or key order, and
//!   re-encoding multipart would alter the boundary and checksums
//! - Only `Authorization`, `Cookie`, and `Content-Type` cross to the
//!   upstream; every other inbound header is dropped so client-specific
//!   and hop-by-hop headers never leak
//! - Malformed bodies are not rejected here; they surface as upstream 4xx

use axum::http::{HeaderMap, HeaderValue, Method, Uri, header};
use bytes::Bytes;

use crate::proxy::credentials::Credential;
use crate::proxy::error::ProxyError;

/// How the inbound body travels upstream.
#[derive(Debug, Clone, PartialEq)]
pub enum BodyPlan {
    /// GET/HEAD: no body at all.
    Empty,
    /// `multipart/form-data`: original bytes with the original boundary.
    Multipart(Bytes),
    /// Anything else: raw bytes, byte-identical to what the caller sent.
    Raw(Bytes),
}

impl BodyPlan {
    pub fn len(&self) -> usize {
        match self {
            BodyPlan::Empty => 0,
            BodyPlan::Multipart(b) | BodyPlan::Raw(b) => b.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A ready-to-send upstream request descriptor.
#[derive(Debug)]
pub struct OutboundRequest {
    pub uri: Uri,
    pub method: Method,
    pub headers: HeaderMap,
    pub body: BodyPlan,
}

/// Substitute `{param}` placeholders in an upstream path template.
///
/// Placeholders without a matching inbound path parameter are left
/// untouched; the upstream will answer 404 and that answer is relayed.
pub fn substitute_template(template: &str, params: &[(&str, &str)]) -> String {
    let mut path = template.to_string();
    for (name, value) in params {
        path = path.replace(&format!("{{{}}}", name), value);
    }
    path
}

/// Join the upstream base URL, a resolved path, and the inbound query.
///
/// A trailing slash on the base is stripped so concatenation never
/// produces a double slash.
pub fn build_target_url(base_url: &str, path: &str, query: Option<&str>) -> String {
    let base = base_url.trim_end_matches('/');
    match query {
        Some(q) if !q.is_empty() => format!("{}{}?{}", base, path, q),
        _ => format!("{}{}", base, path),
    }
}

/// Build the outbound request descriptor.
///
/// `body` holds the buffered inbound body for methods that carry one.
pub fn translate(
    base_url: &str,
    template: &str,
    params: &[(&str, &str)],
    method: &Method,
    inbound_headers: &HeaderMap,
    credential: &Credential,
    body: Option<Bytes>,
    query: Option<&str>,
) -> Result<OutboundRequest, ProxyError> {
    if base_url.trim().is_empty() {
        // Tolerated at startup, surfaced on first use.
        return Err(ProxyError::Unreachable {
            message: "upstream base URL is not configured".to_string(),
        });
    }

    let path = substitute_template(template, params);
    let url = build_target_url(base_url, &path, query);
    let uri: Uri = url.parse().map_err(|_| ProxyError::Network {
        message: format!("invalid upstream URL: {}", url),
    })?;

    let content_type = inbound_headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());

    let body_plan = match (method, body) {
        (&Method::GET, _) | (&Method::HEAD, _) => BodyPlan::Empty,
        (_, None) => BodyPlan::Empty,
        (_, Some(bytes)) => {
            if content_type
                .map(|ct| ct.starts_with("multipart/form-data"))
                .unwrap_or(false)
            {
                BodyPlan::Multipart(bytes)
            } else {
                BodyPlan::Raw(bytes)
            }
        }
    };

    let mut headers = HeaderMap::new();
    if let Some(auth) = credential.authorization_value() {
        if let Ok(value) = HeaderValue::from_str(&auth) {
            headers.insert(header::AUTHORIZATION, value);
        }
    }
    if let Some(cookie) = credential.cookie_value() {
        if let Ok(value) = HeaderValue::from_str(cookie) {
            headers.insert(header::COOKIE, value);
        }
    }
    // Content-Type travels with the body; for multipart it must be the
    // original value so the boundary still matches the payload.
    if !matches!(body_plan, BodyPlan::Empty) {
        if let Some(ct) = inbound_headers.get(header::CONTENT_TYPE) {
            headers.insert(header::CONTENT_TYPE, ct.clone());
        }
    }

    Ok(OutboundRequest {
        uri,
        method: method.clone(),
        headers,
        body: body_plan,
    })
}
