//! Administration handlers. The policy admits only admins here.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use pantry_core::recipes::queries;
use tracing::info;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::extract::AppPath;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{RecipeResponse, UserProfileResponse};

/// `GET /api/admin/users`: every account with its role.
pub async fn list_users_handler(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<UserProfileResponse>>> {
    let accounts = state.accounts.list().await?;
    Ok(Json(accounts.iter().map(UserProfileResponse::from).collect()))
}

/// `DELETE /api/admin/users/{id}`: removes the account and everything it owns.
pub async fn delete_user_handler(
    State(state): State<AppState>,
    axum::Extension(admin): axum::Extension<AuthenticatedUser>,
    AppPath(id): AppPath<i64>,
) -> AppResult<StatusCode> {
    if !state.accounts.delete(id).await? {
        return Err(AppError::NotFound(format!("User {id} not found")));
    }
    info!(user_id = id, admin = %admin.0.username, "user deleted by admin");
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/admin/recipes`.
pub async fn list_recipes_handler(
    State(state): State<AppState>,
    axum::Extension(admin): axum::Extension<AuthenticatedUser>,
) -> AppResult<Json<Vec<RecipeResponse>>> {
    let views = queries::list_recipes(&state.pool, &admin.0).await?;
    Ok(Json(views.into_iter().map(Into::into).collect()))
}

/// `DELETE /api/admin/recipes/{id}`: any recipe.
pub async fn delete_recipe_handler(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> AppResult<StatusCode> {
    queries::delete_recipe_as_admin(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
