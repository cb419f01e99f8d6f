//! Cookbook request handlers.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use pantry_core::cookbooks::queries;
use pantry_core::models::cookbook::{CookbookDraft, CookbookView};

use crate::AppState;
use crate::error::AppResult;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{
    CollaboratorQuery, CookbookRequest, CookbookResponse, CookbookSearchQuery, CreatedResponse,
};

fn to_responses(views: Vec<CookbookView>) -> Vec<CookbookResponse> {
    views.into_iter().map(Into::into).collect()
}

/// `GET /api/cookbooks`: all cookbooks, shuffled.
pub async fn list_cookbooks_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
) -> AppResult<Json<Vec<CookbookResponse>>> {
    let views = queries::list_cookbooks(&state.pool, &user.0).await?;
    Ok(Json(to_responses(views)))
}

/// `POST /api/cookbooks`: create a cookbook owned by the caller.
pub async fn create_cookbook_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    AppJson(body): AppJson<CookbookRequest>,
) -> AppResult<(StatusCode, Json<CreatedResponse>)> {
    let id = queries::create_cookbook(&state.pool, &user.0, &CookbookDraft::from(body)).await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// `GET /api/cookbooks/search?title=&username=`.
pub async fn search_cookbooks_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    AppQuery(params): AppQuery<CookbookSearchQuery>,
) -> AppResult<Json<Vec<CookbookResponse>>> {
    let views = queries::search_cookbooks(
        &state.pool,
        params.title.as_deref(),
        params.username.as_deref(),
        &user.0,
    )
    .await?;
    Ok(Json(to_responses(views)))
}

/// `GET /api/cookbooks/user`: cookbooks the caller owns or collaborates on.
pub async fn my_cookbooks_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
) -> AppResult<Json<Vec<CookbookResponse>>> {
    let views = queries::list_cookbooks_for_user(&state.pool, user.0.id, &user.0).await?;
    Ok(Json(to_responses(views)))
}

/// `GET /api/cookbooks/user/{id}`.
pub async fn user_cookbooks_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    AppPath(user_id): AppPath<i64>,
) -> AppResult<Json<Vec<CookbookResponse>>> {
    let views = queries::list_cookbooks_for_user(&state.pool, user_id, &user.0).await?;
    Ok(Json(to_responses(views)))
}

/// `GET /api/cookbooks/{id}`.
pub async fn get_cookbook_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<CookbookResponse>> {
    let view = queries::get_cookbook(&state.pool, id, &user.0).await?;
    Ok(Json(view.into()))
}

/// `PUT /api/cookbooks/{id}`: owner or collaborator.
pub async fn update_cookbook_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    AppPath(id): AppPath<i64>,
    AppJson(body): AppJson<CookbookRequest>,
) -> AppResult<StatusCode> {
    queries::update_cookbook(&state.pool, &user.0, id, &CookbookDraft::from(body)).await?;
    Ok(StatusCode::OK)
}

/// `DELETE /api/cookbooks/{id}`: owner only.
pub async fn delete_cookbook_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    AppPath(id): AppPath<i64>,
) -> AppResult<StatusCode> {
    queries::delete_cookbook(&state.pool, &user.0, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/cookbooks/{id}/recipes/{recipe_id}`.
pub async fn add_recipe_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    AppPath((id, recipe_id)): AppPath<(i64, i64)>,
) -> AppResult<StatusCode> {
    queries::add_recipe(&state.pool, &user.0, id, recipe_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /api/cookbooks/{id}/recipes/{recipe_id}`.
pub async fn remove_recipe_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    AppPath((id, recipe_id)): AppPath<(i64, i64)>,
) -> AppResult<StatusCode> {
    queries::remove_recipe(&state.pool, &user.0, id, recipe_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/cookbooks/{id}/collaborators?username=`: owner only.
pub async fn add_collaborator_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    AppPath(id): AppPath<i64>,
    AppQuery(params): AppQuery<CollaboratorQuery>,
) -> AppResult<StatusCode> {
    queries::add_collaborator(&state.pool, &user.0, id, &params.username).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /api/cookbooks/{id}/collaborators?username=`: owner only.
pub async fn remove_collaborator_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    AppPath(id): AppPath<i64>,
    AppQuery(params): AppQuery<CollaboratorQuery>,
) -> AppResult<StatusCode> {
    queries::remove_collaborator(&state.pool, &user.0, id, &params.username).await?;
    Ok(StatusCode::NO_CONTENT)
}
