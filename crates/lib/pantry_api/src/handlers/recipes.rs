//! Recipe request handlers.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use pantry_core::models::recipe::RecipeDraft;
use pantry_core::recipes::{favourites, queries};

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{CreatedResponse, RecipeRequest, RecipeResponse, RecipeSearchQuery};

fn to_responses(views: Vec<pantry_core::models::recipe::RecipeView>) -> Vec<RecipeResponse> {
    views.into_iter().map(Into::into).collect()
}

/// `GET /api/recipes`: all recipes.
pub async fn list_recipes_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
) -> AppResult<Json<Vec<RecipeResponse>>> {
    let views = queries::list_recipes(&state.pool, &user.0).await?;
    Ok(Json(to_responses(views)))
}

/// `POST /api/recipes`: create a recipe owned by the caller.
pub async fn create_recipe_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    AppJson(body): AppJson<RecipeRequest>,
) -> AppResult<(StatusCode, Json<CreatedResponse>)> {
    let draft = RecipeDraft::from(body);
    let id = queries::create_recipe(&state.pool, &user.0, &draft, state.config.unknown_tags).await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// `PUT /api/recipes`: overwrite a recipe the caller created.
pub async fn update_recipe_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    AppJson(body): AppJson<RecipeRequest>,
) -> AppResult<StatusCode> {
    let id = body
        .id
        .ok_or_else(|| AppError::Validation("Recipe id is required".into()))?;
    let draft = RecipeDraft::from(body);
    queries::update_recipe(&state.pool, &user.0, id, &draft, state.config.unknown_tags).await?;
    Ok(StatusCode::OK)
}

/// `GET /api/recipes/user`: recipes the caller created.
pub async fn my_recipes_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
) -> AppResult<Json<Vec<RecipeResponse>>> {
    let views = queries::list_recipes_by_creator(&state.pool, user.0.id, &user.0).await?;
    Ok(Json(to_responses(views)))
}

/// `GET /api/recipes/user/{id}`: recipes created by a given user.
pub async fn user_recipes_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    AppPath(user_id): AppPath<i64>,
) -> AppResult<Json<Vec<RecipeResponse>>> {
    let views = queries::list_recipes_by_creator(&state.pool, user_id, &user.0).await?;
    Ok(Json(to_responses(views)))
}

/// `GET /api/recipes/search?username=&title=&tags=`: 204 when nothing matches.
pub async fn search_recipes_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    AppQuery(params): AppQuery<RecipeSearchQuery>,
) -> AppResult<Response> {
    let views = queries::search_recipes(&state.pool, &params.into(), &user.0).await?;
    if views.is_empty() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }
    Ok(Json(to_responses(views)).into_response())
}

/// `GET /api/recipes/recipe/{id}`.
pub async fn get_recipe_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<RecipeResponse>> {
    let view = queries::get_recipe(&state.pool, id, &user.0).await?;
    Ok(Json(view.into()))
}

/// `DELETE /api/recipes/recipe/{id}`: creator only.
pub async fn delete_recipe_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    AppPath(id): AppPath<i64>,
) -> AppResult<StatusCode> {
    queries::delete_recipe(&state.pool, &user.0, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/recipes/{id}/favourite`.
pub async fn add_favourite_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    AppPath(id): AppPath<i64>,
) -> AppResult<StatusCode> {
    favourites::add_favourite(&state.pool, &user.0, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /api/recipes/{id}/favourite`.
pub async fn remove_favourite_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    AppPath(id): AppPath<i64>,
) -> AppResult<StatusCode> {
    favourites::remove_favourite(&state.pool, &user.0, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
