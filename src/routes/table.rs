//! Static route table.
//!
//! Each entry binds an inbound path to its upstream template and the
//! relaying behavior of the endpoint group. The generic proxy handler is
//! parameterized by these entries; adding an endpoint means adding a row.

use axum::http::Method;
use serde_json::Value;

use crate::proxy::relay::{Degradation, RelayPolicy};
use crate::routes::validate;

/// One proxied endpoint group.
#[derive(Debug)]
pub struct RouteSpec {
    /// Identifier for logs and metrics.
    pub name: &'static str,
    /// Inbound axum path, `{param}` placeholders included.
    pub path: &'static str,
    /// Fixed upstream path template under `/api/v1`.
    pub upstream_template: &'static str,
    /// Methods the route accepts (`OPTIONS` is always answered locally).
    pub methods: &'static [Method],
    /// Transport-failure behavior for GET requests.
    pub degradation: Degradation,
    /// Context line attached to write-failure envelopes.
    pub failure_context: Option<&'static str>,
    /// Apply the field-rename table to JSON success bodies.
    pub rewrite_fields: bool,
    /// Pre-flight body validation for write methods; returns the names of
    /// missing required fields.
    pub validator: Option<fn(&Value) -> Vec<String>>,
}

impl RouteSpec {
    pub fn policy(&self) -> RelayPolicy {
        RelayPolicy {
            degradation: self.degradation,
            failure_context: self.failure_context,
            rewrite_fields: self.rewrite_fields,
        }
    }

    pub fn allows(&self, method: &Method) -> bool {
        self.methods.contains(method)
    }
}

pub static ROUTES: &[RouteSpec] = &[
    RouteSpec {
        name: "papers",
        path: "/api/papers",
        upstream_template: "/api/v1/papers",
        methods: &[Method::GET, Method::POST],
        degradation: Degradation::PagedList { root: Some("papers") },
        failure_context: Some("Failed to create paper"),
        rewrite_fields: true,
        validator: None,
    },
    RouteSpec {
        name: "paper-detail",
        path: "/api/papers/{id}",
        upstream_template: "/api/v1/papers/{id}",
        methods: &[Method::GET, Method::PUT, Method::DELETE],
        degradation: Degradation::PagedList { root: None },
        failure_context: Some("Failed to update paper"),
        rewrite_fields: true,
        validator: None,
    },
    RouteSpec {
        name: "author-papers",
        path: "/api/papers/author/{uuid}",
        upstream_template: "/api/v1/papers/author/{uuid}",
        methods: &[Method::GET, Method::PUT],
        degradation: Degradation::PagedList { root: Some("papers") },
        failure_context: Some("Failed to update paper"),
        rewrite_fields: true,
        validator: None,
    },
    RouteSpec {
        name: "categories",
        path: "/api/categories",
        upstream_template: "/api/v1/categories",
        methods: &[Method::GET, Method::POST],
        degradation: Degradation::PagedList { root: None },
        failure_context: Some("Failed to create category"),
        rewrite_fields: false,
        validator: None,
    },
    RouteSpec {
        name: "category-detail",
        path: "/api/categories/{uuid}",
        upstream_template: "/api/v1/categories/{uuid}",
        methods: &[Method::GET, Method::PUT, Method::DELETE],
        degradation: Degradation::PagedList { root: None },
        failure_context: Some("Failed to update category"),
        rewrite_fields: false,
        validator: None,
    },
    RouteSpec {
        name: "paper-comments",
        path: "/api/comments/paper/{paperUuid}",
        upstream_template: "/api/v1/comments/paper/{paperUuid}",
        methods: &[Method::GET, Method::POST],
        degradation: Degradation::PagedList { root: None },
        failure_context: Some("Failed to post comment"),
        rewrite_fields: false,
        validator: None,
    },
    RouteSpec {
        name: "paper-feedback",
        path: "/api/feedback/{paperUuid}",
        upstream_template: "/api/v1/feedbacks/{paperUuid}",
        methods: &[Method::GET, Method::POST],
        degradation: Degradation::PagedList { root: None },
        failure_context: Some("Failed to submit feedback"),
        rewrite_fields: false,
        validator: None,
    },
    RouteSpec {
        name: "media",
        path: "/api/media/{file}",
        upstream_template: "/api/v1/media/{file}",
        methods: &[Method::GET],
        degradation: Degradation::Opaque,
        failure_context: None,
        rewrite_fields: false,
        validator: None,
    },
    RouteSpec {
        name: "auth-login",
        path: "/api/auth/login",
        upstream_template: "/api/v1/auth/login",
        methods: &[Method::POST],
        degradation: Degradation::Propagate,
        failure_context: Some("Login failed"),
        rewrite_fields: false,
        validator: Some(validate::login),
    },
    RouteSpec {
        name: "auth-register",
        path: "/api/auth/register",
        upstream_template: "/api/v1/auth/register",
        methods: &[Method::POST],
        degradation: Degradation::Propagate,
        failure_context: Some("Registration failed"),
        rewrite_fields: false,
        validator: Some(validate::registration),
    },
];
