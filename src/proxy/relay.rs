//! Upstream-outcome to browser-response conversion.
//!
//! # Responsibilities
//! - Relay 2xx bodies (JSON re-emitted, text wrapped, binary passed through)
//! - Normalize non-2xx upstream responses into the `ErrorEnvelope`
//! - Degrade transport failures on read endpoints to empty 200 results
//! - Attach the fixed CORS headers to every response, preflights included
//!
//! # Design Decisions
//! - Read endpoints prefer silent degradation over 5xx so dashboards keep
//!   rendering during backend incidents; write endpoints always surface
//!   the failure so the user never assumes a lost write succeeded
//! - Hop-by-hop upstream headers never cross: responses are rebuilt from
//!   scratch, carrying only `Content-Type` forward

use axum::body::Body;
use axum::http::{HeaderValue, Method, Response, StatusCode, header};
use serde_json::{Value, json};

use crate::proxy::error::{ErrorEnvelope, ProxyError, extract_error_text};
use crate::proxy::invoke::UpstreamResponse;
use crate::proxy::rewrite;

pub const ALLOW_ORIGIN: &str = "*";
pub const ALLOW_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
pub const ALLOW_HEADERS: &str = "Content-Type, Authorization";

/// How a route behaves when the upstream cannot be reached.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Degradation {
    /// Read endpoint backing a list page: transport failure becomes an
    /// empty 200 result. `root` optionally nests the empty page under a
    /// wrapper key (the papers list uses `"papers"`).
    PagedList { root: Option<&'static str> },
    /// Write endpoint: failures propagate as explicit errors.
    Propagate,
    /// Binary passthrough (media files): no empty-equivalent exists, so
    /// failures propagate and successful bodies are never inspected.
    Opaque,
}

/// Per-route relaying behavior.
#[derive(Debug, Clone)]
pub struct RelayPolicy {
    pub degradation: Degradation,
    /// Context line for error envelopes, e.g. "Failed to update paper".
    pub failure_context: Option<&'static str>,
    /// Apply the field-rename table to JSON success bodies.
    pub rewrite_fields: bool,
}

/// Convert the invoker's outcome into the response sent to the browser.
pub fn relay(
    outcome: Result<UpstreamResponse, ProxyError>,
    method: &Method,
    policy: &RelayPolicy,
) -> Response<Body> {
    match outcome {
        Ok(upstream) if upstream.status.is_success() => success(upstream, policy),
        Ok(upstream) => {
            let err = ProxyError::UpstreamHttp {
                status: upstream.status.as_u16(),
                content_type: upstream.content_type().map(str::to_string),
                body: upstream.body,
            };
            failure(err, method, policy)
        }
        Err(err) => failure(err, method, policy),
    }
}

/// Relay a 2xx upstream response.
fn success(upstream: UpstreamResponse, policy: &RelayPolicy) -> Response<Body> {
    if upstream.status == StatusCode::NO_CONTENT {
        return with_cors(response(StatusCode::NO_CONTENT, None, Body::empty()));
    }

    if policy.degradation == Degradation::Opaque {
        let content_type = upstream.headers.get(header::CONTENT_TYPE).cloned();
        return with_cors(response(upstream.status, content_type, Body::from(upstream.body)));
    }

    if upstream.is_json() {
        match serde_json::from_slice::<Value>(&upstream.body) {
            Ok(mut value) => {
                if policy.rewrite_fields {
                    rewrite::apply(&mut value);
                }
                return with_cors(json_response(upstream.status, &value));
            }
            Err(e) => {
                tracing::warn!(error = %e, "Upstream declared JSON but body did not parse");
            }
        }
    }

    if upstream
        .content_type()
        .map(|ct| ct.starts_with("text/plain"))
        .unwrap_or(false)
    {
        let text = String::from_utf8_lossy(&upstream.body).into_owned();
        return with_cors(json_response(upstream.status, &json!({ "message": text })));
    }

    let content_type = upstream.headers.get(header::CONTENT_TYPE).cloned();
    with_cors(response(upstream.status, content_type, Body::from(upstream.body)))
}

/// Relay a classified failure.
fn failure(err: ProxyError, method: &Method, policy: &RelayPolicy) -> Response<Body> {
    let is_read = matches!(*method, Method::GET | Method::HEAD);

    match err {
        ProxyError::UpstreamHttp { status, body, .. } => {
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
            let mut envelope =
                ErrorEnvelope::new(extract_error_text(&body, status.as_u16()), status.as_u16());
            // Context lines describe failed actions; reads relay the
            // upstream error verbatim.
            if !is_read {
                if let Some(context) = policy.failure_context {
                    envelope = envelope.with_message(context);
                }
            }
            with_cors(envelope_response(status, &envelope))
        }

        ProxyError::MalformedRequest { details } => {
            let envelope = ErrorEnvelope::new("Missing required fields", 400)
                .with_details(details);
            with_cors(envelope_response(StatusCode::BAD_REQUEST, &envelope))
        }

        // Transport failures: degrade reads, surface writes.
        transport => {
            if is_read {
                if let Degradation::PagedList { root } = policy.degradation {
                    let body = degraded_body(root, degraded_message(&transport));
                    return with_cors(json_response(StatusCode::OK, &body));
                }
            }

            let (status, text) = match &transport {
                ProxyError::Timeout { .. } => (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Request to upstream timed out, please try again".to_string(),
                ),
                ProxyError::Unreachable { .. } => (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Service temporarily unavailable".to_string(),
                ),
                other => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Network error: {}", other),
                ),
            };
            let mut envelope = ErrorEnvelope::new(text, status.as_u16());
            if !is_read {
                if let Some(context) = policy.failure_context {
                    envelope = envelope.with_message(context);
                }
            }
            with_cors(envelope_response(status, &envelope))
        }
    }
}

/// Fixed preflight answer, independent of upstream state.
pub fn preflight() -> Response<Body> {
    with_cors(response(StatusCode::OK, None, Body::empty()))
}

/// 405 for methods a route does not accept. Still carries CORS headers.
pub fn method_not_allowed() -> Response<Body> {
    let envelope = ErrorEnvelope::new("Method not allowed", 405);
    with_cors(envelope_response(StatusCode::METHOD_NOT_ALLOWED, &envelope))
}

/// The empty-page shape served while the upstream is down.
fn degraded_body(root: Option<&'static str>, message: String) -> Value {
    match root {
        Some(key) => {
            let mut map = serde_json::Map::new();
            map.insert(key.to_string(), json!({ "content": [], "totalElements": 0 }));
            map.insert("message".to_string(), Value::String(message));
            Value::Object(map)
        }
        None => json!({ "content": [], "totalElements": 0, "message": message }),
    }
}

fn degraded_message(err: &ProxyError) -> String {
    match err {
        ProxyError::Timeout { .. } => "Network error: upstream timed out".to_string(),
        ProxyError::Unreachable { .. } => "Network error: upstream unreachable".to_string(),
        other => format!("Network error: {}", other),
    }
}

fn with_cors(mut response: Response<Body>) -> Response<Body> {
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static(ALLOW_ORIGIN),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOW_METHODS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOW_HEADERS),
    );
    response
}

fn json_response(status: StatusCode, value: &Value) -> Response<Body> {
    let bytes = serde_json::to_vec(value).unwrap_or_default();
    response(
        status,
        Some(HeaderValue::from_static("application/json")),
        Body::from(bytes),
    )
}

fn envelope_response(status: StatusCode, envelope: &ErrorEnvelope) -> Response<Body> {
    let bytes = serde_json::to_vec(envelope).unwrap_or_default();
    response(
        status,
        Some(HeaderValue::from_static("application/json")),
        Body::from(bytes),
    )
}

fn response(
    status: StatusCode,
    content_type: Option<HeaderValue>,
    body: Body,
) -> Response<Body> {
    let mut response = Response::new(body);
    *response.status_mut() = status;
    if let Some(ct) = content_type {
        response.headers_mut().insert(header::CONTENT_TYPE, ct);
    }
    response
}
