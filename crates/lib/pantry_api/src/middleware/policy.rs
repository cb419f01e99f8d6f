//! Authorization policy: a static table mapping routes to the capability
//! they require, enforced before any handler runs.
//!
//! Rules are checked in order and the first match wins. A pattern segment
//! `*` matches one path segment; a trailing `**` matches the rest.

use axum::{extract::Request, middleware::Next, response::IntoResponse, response::Response};
use pantry_core::auth::Identity;

use super::auth::AuthenticatedUser;
use crate::error::AppError;

/// What a caller needs to reach a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Public,
    Authenticated,
    Admin,
}

struct Rule {
    /// `None` matches any method.
    method: Option<&'static str>,
    pattern: &'static str,
    capability: Capability,
}

const RULES: &[Rule] = &[
    Rule {
        method: Some("POST"),
        pattern: "/api/users/register",
        capability: Capability::Public,
    },
    Rule {
        method: Some("POST"),
        pattern: "/api/users/login",
        capability: Capability::Public,
    },
    Rule {
        method: Some("POST"),
        pattern: "/api/admin/login",
        capability: Capability::Public,
    },
    Rule {
        method: None,
        pattern: "/api/admin/**",
        capability: Capability::Admin,
    },
    Rule {
        method: None,
        pattern: "/**",
        capability: Capability::Authenticated,
    },
];

fn matches_pattern(pattern: &str, path: &str) -> bool {
    let mut pattern_segments = pattern.split('/').filter(|s| !s.is_empty());
    let mut path_segments = path.split('/').filter(|s| !s.is_empty());
    loop {
        match (pattern_segments.next(), path_segments.next()) {
            (Some("**"), _) => return true,
            (Some("*"), Some(_)) => {}
            (Some(p), Some(s)) if p == s => {}
            (None, None) => return true,
            _ => return false,
        }
    }
}

/// Capability required for `method` on `path`.
pub fn required_capability(method: &str, path: &str) -> Capability {
    RULES
        .iter()
        .find(|rule| {
            rule.method.is_none_or(|m| m.eq_ignore_ascii_case(method))
                && matches_pattern(rule.pattern, path)
        })
        .map_or(Capability::Authenticated, |rule| rule.capability)
}

/// Check `identity` against `capability`.
pub fn authorize(capability: Capability, identity: Option<&Identity>) -> Result<(), AppError> {
    match (capability, identity) {
        (Capability::Public, _) => Ok(()),
        (_, None) => Err(AppError::Unauthorized("Authentication required".into())),
        (Capability::Authenticated, Some(_)) => Ok(()),
        (Capability::Admin, Some(identity)) if identity.is_admin() => Ok(()),
        (Capability::Admin, Some(_)) => Err(AppError::Forbidden("Admin access required".into())),
    }
}

/// Axum middleware: rejects the request unless the caller holds the
/// capability its route requires.
pub async fn enforce(request: Request, next: Next) -> Response {
    let capability = required_capability(request.method().as_str(), request.uri().path());
    let identity = request
        .extensions()
        .get::<AuthenticatedUser>()
        .map(|user| &user.0);

    match authorize(capability, identity) {
        Ok(()) => next.run(request).await,
        Err(e) => e.into_response(),
    }
}
