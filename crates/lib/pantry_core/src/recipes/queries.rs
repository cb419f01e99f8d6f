//! Recipe queries.
//!
//! Reads assemble [`RecipeView`]s in three batched lookups (ingredients,
//! tags, viewer favourites) keyed by the recipe ids of the base query.
//! Writes run inside a single transaction.

use std::collections::{HashMap, HashSet};

use sqlx::{PgConnection, PgPool};
use tracing::{debug, info};

use super::RecipeError;
use super::reconcile::{IngredientPlan, plan_ingredients};
use crate::models::auth::Identity;
use crate::models::recipe::{
    IngredientRow, IngredientView, RecipeDraft, RecipeRow, RecipeSearch, RecipeView, Tag,
    UnknownTags,
};
use crate::tags::{normalize_tag_names, resolve_tags};

const RECIPE_SELECT: &str = r#"
    SELECT r.id, r.title, r.description, r.instructions,
           r.created_by, u.username AS created_by_username
    FROM recipes r
    JOIN users u ON u.id = r.created_by
"#;

fn not_found(id: i64) -> RecipeError {
    RecipeError::NotFound(format!("Recipe {id} not found"))
}

// ---------------------------------------------------------------------------
// View assembly
// ---------------------------------------------------------------------------

/// Group ingredient, tag and favourite lookups onto their recipes.
///
/// Output order follows `rows`. Ingredients keep the order they arrive in,
/// which the caller sorts by position.
pub fn build_views(
    rows: Vec<RecipeRow>,
    ingredients: Vec<IngredientRow>,
    tags: Vec<(i64, String)>,
    favourites: &HashSet<i64>,
) -> Vec<RecipeView> {
    let mut ingredients_by_recipe: HashMap<i64, Vec<IngredientView>> = HashMap::new();
    for row in ingredients {
        ingredients_by_recipe
            .entry(row.recipe_id)
            .or_default()
            .push(IngredientView {
                id: row.id,
                name: row.name,
                quantity: row.quantity,
            });
    }

    let mut tags_by_recipe: HashMap<i64, Vec<String>> = HashMap::new();
    for (recipe_id, name) in tags {
        tags_by_recipe.entry(recipe_id).or_default().push(name);
    }

    rows.into_iter()
        .map(|row| RecipeView {
            ingredients: ingredients_by_recipe.remove(&row.id).unwrap_or_default(),
            tags: tags_by_recipe.remove(&row.id).unwrap_or_default(),
            favourite: favourites.contains(&row.id),
            id: row.id,
            title: row.title,
            description: row.description,
            instructions: row.instructions,
            created_by_user_id: row.created_by,
            created_by_username: row.created_by_username,
        })
        .collect()
}

/// Load ingredients, tags and favourite flags for `rows`.
pub async fn load_views(
    pool: &PgPool,
    rows: Vec<RecipeRow>,
    viewer_id: i64,
) -> Result<Vec<RecipeView>, sqlx::Error> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();

    let ingredients = sqlx::query_as::<_, IngredientRow>(
        r#"
        SELECT id, recipe_id, name, quantity, position
        FROM recipe_ingredients
        WHERE recipe_id = ANY($1)
        ORDER BY recipe_id, position, id
        "#,
    )
    .bind(&ids)
    .fetch_all(pool)
    .await?;

    let tags = sqlx::query_as::<_, (i64, String)>(
        r#"
        SELECT rt.recipe_id, t.name
        FROM recipe_tags rt
        JOIN tags t ON t.id = rt.tag_id
        WHERE rt.recipe_id = ANY($1)
        ORDER BY t.name
        "#,
    )
    .bind(&ids)
    .fetch_all(pool)
    .await?;

    let favourites: HashSet<i64> = sqlx::query_scalar::<_, i64>(
        "SELECT recipe_id FROM user_favourite_recipes WHERE user_id = $1 AND recipe_id = ANY($2)",
    )
    .bind(viewer_id)
    .bind(&ids)
    .fetch_all(pool)
    .await?
    .into_iter()
    .collect();

    Ok(build_views(rows, ingredients, tags, &favourites))
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

pub(crate) async fn find_row(pool: &PgPool, id: i64) -> Result<Option<RecipeRow>, sqlx::Error> {
    sqlx::query_as::<_, RecipeRow>(&format!("{RECIPE_SELECT} WHERE r.id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn recipe_exists(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM recipes WHERE id = $1)")
        .bind(id)
        .fetch_one(pool)
        .await
}

/// A single recipe as seen by `viewer`.
pub async fn get_recipe(
    pool: &PgPool,
    id: i64,
    viewer: &Identity,
) -> Result<RecipeView, RecipeError> {
    let row = find_row(pool, id).await?.ok_or_else(|| not_found(id))?;
    load_views(pool, vec![row], viewer.id)
        .await?
        .pop()
        .ok_or_else(|| not_found(id))
}

/// Every recipe, oldest first.
pub async fn list_recipes(pool: &PgPool, viewer: &Identity) -> Result<Vec<RecipeView>, RecipeError> {
    let rows = sqlx::query_as::<_, RecipeRow>(&format!("{RECIPE_SELECT} ORDER BY r.id"))
        .fetch_all(pool)
        .await?;
    Ok(load_views(pool, rows, viewer.id).await?)
}

/// Recipes created by `user_id`. Unknown users are `NotFound`.
pub async fn list_recipes_by_creator(
    pool: &PgPool,
    user_id: i64,
    viewer: &Identity,
) -> Result<Vec<RecipeView>, RecipeError> {
    let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
        .bind(user_id)
        .fetch_one(pool)
        .await?;
    if !exists {
        return Err(RecipeError::NotFound(format!("User {user_id} not found")));
    }

    let rows = sqlx::query_as::<_, RecipeRow>(&format!(
        "{RECIPE_SELECT} WHERE r.created_by = $1 ORDER BY r.id"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(load_views(pool, rows, viewer.id).await?)
}

/// Escape `%`, `_` and `\` so user text matches literally under `ILIKE`.
pub fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn filter_text(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(escape_like)
}

/// Search by creator username substring, title substring and required tags.
///
/// Text filters are case-insensitive. A recipe matches the tag filter only
/// when it carries every requested tag.
pub async fn search_recipes(
    pool: &PgPool,
    search: &RecipeSearch,
    viewer: &Identity,
) -> Result<Vec<RecipeView>, RecipeError> {
    let username = filter_text(&search.username);
    let title = filter_text(&search.title);
    let tags = normalize_tag_names(&search.tags);

    let rows = sqlx::query_as::<_, RecipeRow>(&format!(
        r#"{RECIPE_SELECT}
        WHERE ($1::text IS NULL OR u.username ILIKE '%' || $1 || '%')
          AND ($2::text IS NULL OR r.title ILIKE '%' || $2 || '%')
          AND (
            cardinality($3::text[]) = 0
            OR (
              SELECT COUNT(DISTINCT t.name)
              FROM recipe_tags rt
              JOIN tags t ON t.id = rt.tag_id
              WHERE rt.recipe_id = r.id AND t.name = ANY($3)
            ) = cardinality($3::text[])
          )
        ORDER BY r.id"#
    ))
    .bind(username)
    .bind(title)
    .bind(&tags)
    .fetch_all(pool)
    .await?;

    debug!(matches = rows.len(), "recipe search");
    Ok(load_views(pool, rows, viewer.id).await?)
}

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

async fn apply_ingredient_plan(
    conn: &mut PgConnection,
    recipe_id: i64,
    plan: &IngredientPlan,
) -> Result<(), sqlx::Error> {
    if !plan.deletes.is_empty() {
        sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = $1 AND id = ANY($2)")
            .bind(recipe_id)
            .bind(&plan.deletes)
            .execute(&mut *conn)
            .await?;
    }

    for update in &plan.updates {
        sqlx::query(
            r#"
            UPDATE recipe_ingredients
            SET name = $3, quantity = $4, position = $5
            WHERE id = $1 AND recipe_id = $2
            "#,
        )
        .bind(update.id)
        .bind(recipe_id)
        .bind(&update.name)
        .bind(&update.quantity)
        .bind(update.position)
        .execute(&mut *conn)
        .await?;
    }

    for insert in &plan.inserts {
        sqlx::query(
            r#"
            INSERT INTO recipe_ingredients (recipe_id, name, quantity, position)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(recipe_id)
        .bind(&insert.name)
        .bind(&insert.quantity)
        .bind(insert.position)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

async fn replace_tags(
    conn: &mut PgConnection,
    recipe_id: i64,
    tags: &[Tag],
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM recipe_tags WHERE recipe_id = $1")
        .bind(recipe_id)
        .execute(&mut *conn)
        .await?;

    if tags.is_empty() {
        return Ok(());
    }
    let tag_ids: Vec<i64> = tags.iter().map(|t| t.id).collect();
    sqlx::query("INSERT INTO recipe_tags (recipe_id, tag_id) SELECT $1, unnest($2::bigint[])")
        .bind(recipe_id)
        .bind(&tag_ids)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// Create a recipe owned by `creator`. Returns the new recipe id.
pub async fn create_recipe(
    pool: &PgPool,
    creator: &Identity,
    draft: &RecipeDraft,
    unknown_tags: UnknownTags,
) -> Result<i64, RecipeError> {
    super::validate_draft(draft)?;

    let mut tx = pool.begin().await?;

    let recipe_id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO recipes (title, description, instructions, created_by)
        VALUES ($1, $2, $3, $4)
        RETURNING id
        "#,
    )
    .bind(draft.title.trim())
    .bind(&draft.description)
    .bind(&draft.instructions)
    .bind(creator.id)
    .fetch_one(&mut *tx)
    .await?;

    apply_ingredient_plan(&mut tx, recipe_id, &IngredientPlan::all_new(&draft.ingredients))
        .await?;
    let tags = resolve_tags(&mut tx, &draft.tags, unknown_tags).await?;
    replace_tags(&mut tx, recipe_id, &tags).await?;

    tx.commit().await?;

    info!(recipe_id, user = %creator.username, "recipe created");
    Ok(recipe_id)
}

/// Overwrite a recipe's content. Only the creator may update.
///
/// Ingredients are reconciled against the persisted rows so that matched
/// rows keep their ids. The whole update commits or rolls back as one.
pub async fn update_recipe(
    pool: &PgPool,
    caller: &Identity,
    recipe_id: i64,
    draft: &RecipeDraft,
    unknown_tags: UnknownTags,
) -> Result<(), RecipeError> {
    let mut tx = pool.begin().await?;

    let owner = sqlx::query_scalar::<_, i64>("SELECT created_by FROM recipes WHERE id = $1 FOR UPDATE")
        .bind(recipe_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| not_found(recipe_id))?;
    if owner != caller.id {
        return Err(RecipeError::Forbidden(
            "Only the creator can update this recipe".into(),
        ));
    }
    super::validate_draft(draft)?;

    sqlx::query(
        "UPDATE recipes SET title = $2, description = $3, instructions = $4 WHERE id = $1",
    )
    .bind(recipe_id)
    .bind(draft.title.trim())
    .bind(&draft.description)
    .bind(&draft.instructions)
    .execute(&mut *tx)
    .await?;

    let existing = sqlx::query_as::<_, IngredientRow>(
        r#"
        SELECT id, recipe_id, name, quantity, position
        FROM recipe_ingredients
        WHERE recipe_id = $1
        ORDER BY position, id
        "#,
    )
    .bind(recipe_id)
    .fetch_all(&mut *tx)
    .await?;

    let plan = plan_ingredients(&existing, &draft.ingredients);
    if !plan.ignored_duplicates.is_empty() {
        debug!(recipe_id, ids = ?plan.ignored_duplicates, "ignoring repeated ingredient ids");
    }
    apply_ingredient_plan(&mut tx, recipe_id, &plan).await?;

    let tags = resolve_tags(&mut tx, &draft.tags, unknown_tags).await?;
    replace_tags(&mut tx, recipe_id, &tags).await?;

    tx.commit().await?;

    info!(
        recipe_id,
        updated = plan.updates.len(),
        inserted = plan.inserts.len(),
        deleted = plan.deletes.len(),
        "recipe updated"
    );
    Ok(())
}

/// Delete a recipe. Only the creator may delete.
pub async fn delete_recipe(
    pool: &PgPool,
    caller: &Identity,
    recipe_id: i64,
) -> Result<(), RecipeError> {
    let owner = sqlx::query_scalar::<_, i64>("SELECT created_by FROM recipes WHERE id = $1")
        .bind(recipe_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| not_found(recipe_id))?;
    if owner != caller.id {
        return Err(RecipeError::Forbidden(
            "Only the creator can delete this recipe".into(),
        ));
    }

    sqlx::query("DELETE FROM recipes WHERE id = $1")
        .bind(recipe_id)
        .execute(pool)
        .await?;
    info!(recipe_id, user = %caller.username, "recipe deleted");
    Ok(())
}

/// Delete any recipe regardless of ownership.
pub async fn delete_recipe_as_admin(pool: &PgPool, recipe_id: i64) -> Result<(), RecipeError> {
    let result = sqlx::query("DELETE FROM recipes WHERE id = $1")
        .bind(recipe_id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(not_found(recipe_id));
    }
    info!(recipe_id, "recipe deleted by admin");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipe_row(id: i64, title: &str) -> RecipeRow {
        RecipeRow {
            id,
            title: title.into(),
            description: String::new(),
            instructions: String::new(),
            created_by: 1,
            created_by_username: "alice".into(),
        }
    }

    fn ingredient(id: i64, recipe_id: i64, name: &str, position: i32) -> IngredientRow {
        IngredientRow {
            id,
            recipe_id,
            name: name.into(),
            quantity: "1".into(),
            position,
        }
    }

    #[test]
    fn build_views_groups_by_recipe() {
        let rows = vec![recipe_row(1, "Soup"), recipe_row(2, "Bread")];
        let ingredients = vec![
            ingredient(10, 1, "water", 0),
            ingredient(11, 2, "flour", 0),
            ingredient(12, 1, "salt", 1),
        ];
        let tags = vec![(2, "vegan".to_string()), (1, "gluten-free".to_string())];
        let favourites = HashSet::from([2]);

        let views = build_views(rows, ingredients, tags, &favourites);

        assert_eq!(views.len(), 2);
        assert_eq!(views[0].title, "Soup");
        let names: Vec<&str> = views[0].ingredients.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["water", "salt"]);
        assert_eq!(views[0].tags, vec!["gluten-free"]);
        assert!(!views[0].favourite);
        assert_eq!(views[1].ingredients[0].id, 11);
        assert!(views[1].favourite);
    }

    #[test]
    fn build_views_handles_bare_recipes() {
        let views = build_views(vec![recipe_row(3, "Toast")], vec![], vec![], &HashSet::new());
        assert!(views[0].ingredients.is_empty());
        assert!(views[0].tags.is_empty());
        assert_eq!(views[0].created_by_username, "alice");
    }

    #[test]
    fn escape_like_neutralizes_wildcards() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[test]
    fn filter_text_drops_blanks() {
        assert_eq!(filter_text(&Some("  ".into())), None);
        assert_eq!(filter_text(&None), None);
        assert_eq!(filter_text(&Some(" Pie ".into())), Some("Pie".into()));
    }
}
