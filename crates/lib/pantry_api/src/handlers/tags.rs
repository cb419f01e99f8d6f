//! Tag handlers.

use axum::Json;
use axum::extract::State;

use crate::AppState;
use crate::error::AppResult;
use crate::models::TagResponse;

/// `GET /api/tags`: all tags, by name.
pub async fn list_tags_handler(State(state): State<AppState>) -> AppResult<Json<Vec<TagResponse>>> {
    let tags = pantry_core::tags::list_tags(&state.pool).await?;
    Ok(Json(tags.into_iter().map(Into::into).collect()))
}
