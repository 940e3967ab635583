//! DocuHub Gateway Library
//!
//! An HTTP gateway that forwards authenticated browser requests to the
//! DocuHub REST backend, relaying responses, normalizing error shapes,
//! and attaching CORS headers.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod proxy;
pub mod routes;

pub use config::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
