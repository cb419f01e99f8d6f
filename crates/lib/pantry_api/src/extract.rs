//! Request extractors that reject with [`AppError`].
//!
//! Drop-in replacements for `Json`, `Path` and `Query` whose failures use the
//! standard `{"error": ...}` body and a 400 status instead of axum's
//! plain-text rejections.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{FromRequest, FromRequestParts};
use axum_extra::extract::QueryRejection;
use tracing::debug;

use crate::error::AppError;

/// JSON request body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// Path parameters.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);

/// Query string, with repeated keys collected into sequences.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum_extra::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        debug!(%rejection, "rejected request body");
        match rejection {
            JsonRejection::MissingJsonContentType(_) => {
                AppError::Validation("Expected a JSON request body".into())
            }
            _ => AppError::Validation("Malformed request body".into()),
        }
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        debug!(%rejection, "rejected path parameters");
        AppError::Validation("Invalid path parameter".into())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        debug!(%rejection, "rejected query string");
        AppError::Validation("Invalid query parameters".into())
    }
}

/// Fallback for unmatched paths.
pub async fn not_found() -> AppError {
    AppError::NotFound("No such endpoint".into())
}

/// Fallback for a known path called with an unsupported method.
pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
