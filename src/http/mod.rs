//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, route table wiring)
//!     → request.rs (add request ID)
//!     → [proxy pipeline forwards to the upstream]
//!     → Send to client (CORS headers attached by the relayer)
//! ```

pub mod request;
pub mod server;

pub use request::{RequestIdLayer, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
