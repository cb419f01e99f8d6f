//! User profile handlers.

use axum::Json;
use axum::extract::State;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{ProfileUpdateRequest, RecipeResponse, UserProfileResponse};
use crate::services::auth;

/// `GET /api/users`: public profiles of all users.
pub async fn list_users_handler(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<UserProfileResponse>>> {
    let accounts = state.accounts.list().await?;
    Ok(Json(
        accounts.iter().map(UserProfileResponse::public).collect(),
    ))
}

/// `GET /api/users/me`: the caller's own profile.
pub async fn me_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
) -> AppResult<Json<UserProfileResponse>> {
    let account = state
        .accounts
        .find_by_id(user.0.id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user.0.id)))?;
    Ok(Json(UserProfileResponse::from(&account)))
}

/// `PUT /api/users/profile`: change the caller's username and bio.
pub async fn update_profile_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    AppJson(body): AppJson<ProfileUpdateRequest>,
) -> AppResult<Json<UserProfileResponse>> {
    let profile =
        auth::update_profile(state.accounts.as_ref(), &user.0, &body.username, &body.bio).await?;
    Ok(Json(profile))
}

/// `GET /api/users/{id}`: public profile of one user.
pub async fn profile_handler(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<UserProfileResponse>> {
    let account = state
        .accounts
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {id} not found")))?;
    Ok(Json(UserProfileResponse::public(&account)))
}

/// `GET /api/users/favourites`: the caller's favourite recipes.
pub async fn favourites_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
) -> AppResult<Json<Vec<RecipeResponse>>> {
    let views = pantry_core::recipes::favourites::list_favourites(&state.pool, &user.0).await?;
    Ok(Json(views.into_iter().map(Into::into).collect()))
}
