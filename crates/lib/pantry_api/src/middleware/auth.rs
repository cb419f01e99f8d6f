//! Access gate: Bearer token extraction and identity resolution.
//!
//! Runs on every request. A valid token attaches an [`AuthenticatedUser`]
//! to the request extensions; a missing or failing token leaves the
//! request anonymous. Rejection is left to [`super::policy`].

use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use pantry_core::auth::{AuthError, Identity};
use tracing::{debug, warn};

use crate::AppState;

/// Identity resolved for the current request.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Identity);

/// Token from an `Authorization: Bearer <token>` header, if any.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Axum middleware: verifies the Bearer token, if present, and injects
/// `AuthenticatedUser` into request extensions.
pub async fn identify(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    request.extensions_mut().remove::<AuthenticatedUser>();
    let token = bearer_token(request.headers()).map(str::to_string);

    if let Some(token) = token {
        match state.tokens.verify(&token, state.accounts.as_ref()).await {
            Ok(identity) => {
                request.extensions_mut().insert(AuthenticatedUser(identity));
            }
            Err(AuthError::Db(e)) => warn!("identity lookup failed: {e}"),
            Err(e) => debug!(path = %request.uri().path(), "bearer token rejected: {e}"),
        }
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn extracts_bearer_token() {
        assert_eq!(bearer_token(&headers("Bearer abc.def")), Some("abc.def"));
    }

    #[test]
    fn ignores_other_schemes_and_blanks() {
        assert_eq!(bearer_token(&headers("Basic dXNlcjpwdw==")), None);
        assert_eq!(bearer_token(&headers("Bearer   ")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }
}
