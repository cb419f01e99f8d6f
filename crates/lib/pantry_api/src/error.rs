//! Application error types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use pantry_core::auth::AuthError;
use pantry_core::cookbooks::CookbookError;
use pantry_core::recipes::RecipeError;
use thiserror::Error;
use tracing::error;

use crate::models::ErrorResponse;

/// Convenience alias for handler return types.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level errors with HTTP status mapping.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Internal server error")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            AppError::Validation(m)
            | AppError::NotFound(m)
            | AppError::Conflict(m)
            | AppError::Unauthorized(m)
            | AppError::Forbidden(m) => m,
            AppError::MethodNotAllowed => "Method not allowed".to_string(),
            AppError::Internal(detail) => {
                error!("internal error: {detail}");
                "Internal server error".to_string()
            }
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Internal(e.to_string())
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidToken | AuthError::Expired | AuthError::UnknownSubject(_) => {
                AppError::Unauthorized("Authentication required".into())
            }
            AuthError::InvalidCredentials => {
                AppError::Unauthorized("Invalid username or password".into())
            }
            AuthError::Conflict(name) => {
                AppError::Conflict(format!("Username '{name}' is already taken"))
            }
            AuthError::Validation(msg) => AppError::Validation(msg),
            AuthError::Db(e) => AppError::from(e),
            AuthError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl From<RecipeError> for AppError {
    fn from(e: RecipeError) -> Self {
        match e {
            RecipeError::NotFound(msg) => AppError::NotFound(msg),
            RecipeError::Forbidden(msg) => AppError::Forbidden(msg),
            RecipeError::Validation(msg) => AppError::Validation(msg),
            RecipeError::Db(e) => AppError::from(e),
        }
    }
}

impl From<CookbookError> for AppError {
    fn from(e: CookbookError) -> Self {
        match e {
            CookbookError::NotFound(msg) => AppError::NotFound(msg),
            CookbookError::Forbidden(msg) => AppError::Forbidden(msg),
            CookbookError::Validation(msg) => AppError::Validation(msg),
            CookbookError::Db(e) => AppError::from(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_of(err: AppError) -> (StatusCode, serde_json::Value) {
        let resp = err.into_response();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn internal_detail_is_not_leaked() {
        let (status, body) = body_of(AppError::Internal("pool timed out".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, serde_json::json!({ "error": "Internal server error" }));
    }

    #[tokio::test]
    async fn domain_errors_map_to_statuses() {
        let (status, body) = body_of(RecipeError::Forbidden("not yours".into()).into()).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "not yours");

        let (status, _) = body_of(AuthError::Conflict("alice".into()).into()).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = body_of(CookbookError::NotFound("gone".into()).into()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn token_failures_are_indistinguishable() {
        let expired = AppError::from(AuthError::Expired);
        let invalid = AppError::from(AuthError::InvalidToken);
        assert_eq!(expired.to_string(), invalid.to_string());
        assert_eq!(expired.status(), StatusCode::UNAUTHORIZED);
    }
}
