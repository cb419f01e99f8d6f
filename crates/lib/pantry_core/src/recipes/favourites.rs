//! Per-user favourite recipes.
//!
//! Adding and removing are idempotent; both require the recipe to exist.

use sqlx::PgPool;
use tracing::debug;

use super::RecipeError;
use super::queries::{load_views, recipe_exists};
use crate::models::auth::Identity;
use crate::models::recipe::{RecipeRow, RecipeView};

async fn ensure_recipe(pool: &PgPool, recipe_id: i64) -> Result<(), RecipeError> {
    if recipe_exists(pool, recipe_id).await? {
        Ok(())
    } else {
        Err(RecipeError::NotFound(format!("Recipe {recipe_id} not found")))
    }
}

pub async fn add_favourite(
    pool: &PgPool,
    user: &Identity,
    recipe_id: i64,
) -> Result<(), RecipeError> {
    ensure_recipe(pool, recipe_id).await?;
    let result = sqlx::query(
        r#"
        INSERT INTO user_favourite_recipes (user_id, recipe_id)
        VALUES ($1, $2)
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(user.id)
    .bind(recipe_id)
    .execute(pool)
    .await?;
    debug!(user = %user.username, recipe_id, added = result.rows_affected(), "favourite added");
    Ok(())
}

pub async fn remove_favourite(
    pool: &PgPool,
    user: &Identity,
    recipe_id: i64,
) -> Result<(), RecipeError> {
    ensure_recipe(pool, recipe_id).await?;
    sqlx::query("DELETE FROM user_favourite_recipes WHERE user_id = $1 AND recipe_id = $2")
        .bind(user.id)
        .bind(recipe_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// The caller's favourites, oldest recipe first.
pub async fn list_favourites(pool: &PgPool, user: &Identity) -> Result<Vec<RecipeView>, RecipeError> {
    let rows = sqlx::query_as::<_, RecipeRow>(
        r#"
        SELECT r.id, r.title, r.description, r.instructions,
               r.created_by, u.username AS created_by_username
        FROM recipes r
        JOIN users u ON u.id = r.created_by
        JOIN user_favourite_recipes f ON f.recipe_id = r.id
        WHERE f.user_id = $1
        ORDER BY r.id
        "#,
    )
    .bind(user.id)
    .fetch_all(pool)
    .await?;
    Ok(load_views(pool, rows, user.id).await?)
}
