//! Login, registration and token validation handlers.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use crate::AppState;
use crate::error::AppResult;
use crate::extract::AppJson;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{CredentialsRequest, UserProfileResponse, UserTokenResponse};
use crate::services::auth;

/// `POST /api/users/register`: create a new user account.
pub async fn register_handler(
    State(state): State<AppState>,
    AppJson(body): AppJson<CredentialsRequest>,
) -> AppResult<(StatusCode, Json<UserTokenResponse>)> {
    let resp = auth::register(state.accounts.as_ref(), &body.username, &body.password).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

/// `POST /api/users/login`: authenticate with username + password.
pub async fn login_handler(
    State(state): State<AppState>,
    AppJson(body): AppJson<CredentialsRequest>,
) -> AppResult<Json<UserTokenResponse>> {
    let resp = auth::login(
        state.accounts.as_ref(),
        &state.tokens,
        &body.username,
        &body.password,
    )
    .await?;
    Ok(Json(resp))
}

/// `POST /api/admin/login`: authenticate an administrator.
pub async fn admin_login_handler(
    State(state): State<AppState>,
    AppJson(body): AppJson<CredentialsRequest>,
) -> AppResult<Json<UserTokenResponse>> {
    let resp = auth::login_admin(
        state.accounts.as_ref(),
        &state.tokens,
        &body.username,
        &body.password,
    )
    .await?;
    Ok(Json(resp))
}

/// `GET /api/users/validate` and `GET /api/admin/validate`.
///
/// Reaching the handler means the policy admitted the caller.
pub async fn validate_handler(
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
) -> Json<UserProfileResponse> {
    Json(UserProfileResponse::from(&user.0))
}
