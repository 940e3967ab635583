//! Upstream call execution with a bounded latency budget.
//!
//! # Responsibilities
//! - Issue exactly one outbound call per inbound request (no retries)
//! - Abort the in-flight call when the budget expires
//! - Classify transport failures (timeout / unreachable / network)
//!
//! # Design Decisions
//! - The whole exchange, including reading the response body, runs under
//!   one `tokio::time::timeout`; dropping the future cancels the call and
//!   releases the timer on both success and failure paths
//! - The response body is buffered here so the relayer works on bytes;
//!   bodies are capped by the configured limit

use std::time::Duration;

use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode, header};
use bytes::Bytes;
use hyper_util::client::legacy::{Client, connect::HttpConnector};

use crate::proxy::error::ProxyError;
use crate::proxy::translate::{BodyPlan, OutboundRequest};

/// Shared outbound HTTP client type.
pub type HttpClient = Client<HttpConnector, Body>;

/// A fully-read upstream response.
#[derive(Debug)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl UpstreamResponse {
    /// The upstream `Content-Type`, if present and readable.
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }

    /// Whether the body should be treated as JSON.
    pub fn is_json(&self) -> bool {
        self.content_type()
            .map(|ct| ct.starts_with("application/json"))
            .unwrap_or(false)
    }
}

/// Execute the translated request against the upstream.
pub async fn invoke(
    client: &HttpClient,
    outbound: OutboundRequest,
    budget: Duration,
    max_body_bytes: usize,
) -> Result<UpstreamResponse, ProxyError> {
    let body = match outbound.body {
        BodyPlan::Empty => Body::empty(),
        BodyPlan::Multipart(bytes) | BodyPlan::Raw(bytes) => Body::from(bytes),
    };

    let mut builder = Request::builder()
        .method(outbound.method)
        .uri(outbound.uri);
    if let Some(headers) = builder.headers_mut() {
        *headers = outbound.headers;
    }
    let request = builder.body(body).map_err(|e| ProxyError::Network {
        message: format!("failed to build upstream request: {}", e),
    })?;

    let exchange = async {
        let response = client
            .request(request)
            .await
            .map_err(|e| ProxyError::from_client_error(&e))?;

        let (parts, body) = response.into_parts();
        let bytes = axum::body::to_bytes(Body::new(body), max_body_bytes)
            .await
            .map_err(|e| ProxyError::Network {
                message: format!("failed to read upstream body: {}", e),
            })?;

        Ok(UpstreamResponse {
            status: parts.status,
            headers: parts.headers,
            body: bytes,
        })
    };

    match tokio::time::timeout(budget, exchange).await {
        Ok(result) => result,
        Err(_) => Err(ProxyError::Timeout { budget }),
    }
}
