//! HTTP server setup and the generic proxy handler.
//!
//! # Responsibilities
//! - Create the Axum router from the static route table
//! - Wire up middleware (tracing, outer timeout, request ID)
//! - Dispatch each request through the proxying pipeline:
//!   credentials → translate → invoke → relay
//! - Record per-request metrics on every exit path

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    Router,
    body::Body,
    extract::{RawPathParams, Request, State},
    http::{Method, Response},
    routing::any,
};
use bytes::Bytes;
use hyper_util::{
    client::legacy::{Client, connect::HttpConnector},
    rt::TokioExecutor,
};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::GatewayConfig;
use crate::http::request::{RequestIdLayer, X_REQUEST_ID};
use crate::observability::metrics;
use crate::proxy::error::ProxyError;
use crate::proxy::invoke::{self, HttpClient, UpstreamResponse};
use crate::proxy::{credentials, relay, translate};
use crate::routes::{ROUTES, RouteSpec};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub client: HttpClient,
    pub config: Arc<GatewayConfig>,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    config: Arc<GatewayConfig>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: GatewayConfig) -> Self {
        let config = Arc::new(config);
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        let state = AppState {
            client,
            config: config.clone(),
        };

        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with one generic handler per table entry.
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        let mut router = Router::new();
        for spec in ROUTES {
            router = router.route(
                spec.path,
                any(
                    move |State(state): State<AppState>,
                          params: RawPathParams,
                          request: Request| async move {
                        proxy_endpoint(spec, state, params, request).await
                    },
                ),
            );
        }

        router
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )))
            .layer(RequestIdLayer)
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server, accepting connections on the given listener.
    ///
    /// Stops on Ctrl+C or when the shutdown channel fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.base_url,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {
                        tracing::info!("Shutdown signal received");
                    }
                    _ = shutdown.recv() => {
                        tracing::info!("Shutdown triggered");
                    }
                }
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

/// Generic proxy handler, parameterized by a route table entry.
async fn proxy_endpoint(
    spec: &'static RouteSpec,
    state: AppState,
    params: RawPathParams,
    request: Request,
) -> Response<Body> {
    let start = Instant::now();
    let method = request.method().clone();
    let method_str = method.to_string();
    let policy = spec.policy();

    // Preflights are answered locally, independent of upstream state.
    if method == Method::OPTIONS {
        metrics::record_request(&method_str, 200, spec.name, "preflight", start);
        return relay::preflight();
    }
    if !spec.allows(&method) {
        metrics::record_request(&method_str, 405, spec.name, "rejected", start);
        return relay::method_not_allowed();
    }

    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    tracing::debug!(
        request_id = %request_id,
        route = spec.name,
        method = %method,
        path = %request.uri().path(),
        "Proxying request"
    );

    let (parts, body) = request.into_parts();
    let query = parts.uri.query().map(str::to_string);
    let is_read = matches!(method, Method::GET | Method::HEAD);

    // Buffer the inbound body for methods that carry one. Bytes are kept
    // exactly as received; they are never re-serialized.
    let body_bytes = if is_read {
        None
    } else {
        match axum::body::to_bytes(body, state.config.limits.max_body_bytes).await {
            Ok(bytes) if bytes.is_empty() => None,
            Ok(bytes) => Some(bytes),
            Err(e) => {
                tracing::warn!(request_id = %request_id, route = spec.name, error = %e, "Failed to read inbound body");
                let err = ProxyError::MalformedRequest {
                    details: vec!["body".to_string()],
                };
                metrics::record_request(&method_str, 400, spec.name, err.outcome_label(), start);
                return relay::relay(Err(err), &method, &policy);
            }
        }
    };

    // Required-field validation runs before any upstream round-trip.
    if let Some(validator) = spec.validator {
        if !is_read {
            if let Err(err) = validate_body(validator, body_bytes.as_ref()) {
                tracing::debug!(request_id = %request_id, route = spec.name, "Rejected malformed payload");
                metrics::record_request(&method_str, 400, spec.name, err.outcome_label(), start);
                return relay::relay(Err(err), &method, &policy);
            }
        }
    }

    let credential = credentials::extract(&parts.headers);
    let path_params: Vec<(&str, &str)> = params.iter().collect();

    let outcome = match translate::translate(
        &state.config.upstream.base_url,
        spec.upstream_template,
        &path_params,
        &method,
        &parts.headers,
        &credential,
        body_bytes,
        query.as_deref(),
    ) {
        Ok(outbound) => {
            let budget = if is_read {
                Duration::from_secs(state.config.timeouts.read_secs)
            } else {
                Duration::from_secs(state.config.timeouts.write_secs)
            };
            invoke::invoke(&state.client, outbound, budget, state.config.limits.max_body_bytes)
                .await
        }
        Err(e) => Err(e),
    };

    let outcome_label = match &outcome {
        Ok(upstream) if upstream.status.is_success() => "ok",
        Ok(_) => "upstream_error",
        Err(e) => e.outcome_label(),
    };
    log_outcome(&request_id, spec, &outcome);

    let response = relay::relay(outcome, &method, &policy);
    metrics::record_request(
        &method_str,
        response.status().as_u16(),
        spec.name,
        outcome_label,
        start,
    );
    response
}

fn log_outcome(request_id: &str, spec: &RouteSpec, outcome: &Result<UpstreamResponse, ProxyError>) {
    match outcome {
        Ok(upstream) => {
            tracing::debug!(
                request_id = %request_id,
                route = spec.name,
                status = %upstream.status,
                "Upstream responded"
            );
        }
        Err(e) => {
            tracing::warn!(
                request_id = %request_id,
                route = spec.name,
                class = e.outcome_label(),
                error = %e,
                "Upstream call failed"
            );
        }
    }
}

/// Parse the buffered body as JSON and apply the route's validator.
fn validate_body(
    validator: fn(&Value) -> Vec<String>,
    body: Option<&Bytes>,
) -> Result<(), ProxyError> {
    let value = match body {
        Some(bytes) => serde_json::from_slice::<Value>(bytes).map_err(|_| {
            ProxyError::MalformedRequest {
                details: vec!["body".to_string()],
            }
        })?,
        None => Value::Null,
    };

    let missing = validator(&value);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ProxyError::MalformedRequest { details: missing })
    }
}
