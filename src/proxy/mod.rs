//! Proxying subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → credentials.rs (extract Authorization / cookies)
//!     → translate.rs (upstream URL, header allowlist, body plan)
//!     → invoke.rs (single bounded upstream call, failure classification)
//!     → relay.rs (success passthrough / error envelope / degradation)
//!     → rewrite.rs (field-rename pass on flagged JSON bodies)
//! Response to browser (CORS headers always attached)
//! ```
//!
//! # Design Decisions
//! - Stateless per request: no cache, no retry, no shared mutable state
//! - One suspension point per request (the awaited upstream call)
//! - Every failure kind converts to one normalized envelope shape

pub mod credentials;
pub mod error;
pub mod invoke;
pub mod relay;
pub mod rewrite;
pub mod translate;

pub use error::{ErrorEnvelope, ProxyError};
pub use invoke::{HttpClient, UpstreamResponse};
pub use relay::{Degradation, RelayPolicy};
pub use translate::OutboundRequest;
