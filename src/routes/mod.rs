//! Route definitions.
//!
//! The gateway exposes one narrow module per concern: the static table
//! binding inbound paths to upstream templates, and the auth-payload
//! validators. Handlers themselves are generic and live in `http::server`.

pub mod table;
pub mod validate;

pub use table::{ROUTES, RouteSpec};
