//! Cookbook queries.

use std::collections::{HashMap, HashSet};

use rand::seq::SliceRandom;
use sqlx::PgPool;
use tracing::{debug, info};

use super::{CookbookAccess, CookbookError, validate_draft};
use crate::models::auth::Identity;
use crate::models::cookbook::{CookbookDraft, CookbookRow, CookbookView, UserRef};
use crate::models::recipe::{RecipeRow, RecipeView};
use crate::recipes::queries::{escape_like, load_views, recipe_exists};

const COOKBOOK_SELECT: &str = r#"
    SELECT c.id, c.title, c.description, c.owner_id, u.username AS owner_username
    FROM cookbooks c
    JOIN users u ON u.id = c.owner_id
"#;

#[derive(Debug, sqlx::FromRow)]
struct CollaboratorRow {
    cookbook_id: i64,
    #[sqlx(flatten)]
    user: UserRef,
}

#[derive(Debug, sqlx::FromRow)]
struct CookbookRecipeRow {
    cookbook_id: i64,
    #[sqlx(flatten)]
    recipe: RecipeRow,
}

fn not_found(id: i64) -> CookbookError {
    CookbookError::NotFound(format!("Cookbook {id} not found"))
}

/// Attach collaborators and recipe views to cookbook rows.
///
/// `memberships` pairs a cookbook id with a recipe id; recipes missing from
/// `recipes` are skipped.
pub fn build_views(
    rows: Vec<CookbookRow>,
    collaborators: Vec<(i64, UserRef)>,
    memberships: Vec<(i64, i64)>,
    recipes: &HashMap<i64, RecipeView>,
) -> Vec<CookbookView> {
    let mut collaborators_by_cookbook: HashMap<i64, Vec<UserRef>> = HashMap::new();
    for (cookbook_id, user) in collaborators {
        collaborators_by_cookbook
            .entry(cookbook_id)
            .or_default()
            .push(user);
    }

    let mut recipes_by_cookbook: HashMap<i64, Vec<RecipeView>> = HashMap::new();
    for (cookbook_id, recipe_id) in memberships {
        if let Some(view) = recipes.get(&recipe_id) {
            recipes_by_cookbook
                .entry(cookbook_id)
                .or_default()
                .push(view.clone());
        }
    }

    rows.into_iter()
        .map(|row| CookbookView {
            collaborators: collaborators_by_cookbook
                .remove(&row.id)
                .unwrap_or_default(),
            recipes: recipes_by_cookbook.remove(&row.id).unwrap_or_default(),
            owner: UserRef {
                id: row.owner_id,
                username: row.owner_username,
            },
            id: row.id,
            title: row.title,
            description: row.description,
        })
        .collect()
}

async fn load_views_for(
    pool: &PgPool,
    rows: Vec<CookbookRow>,
    viewer: &Identity,
) -> Result<Vec<CookbookView>, CookbookError> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();

    let collaborators = sqlx::query_as::<_, CollaboratorRow>(
        r#"
        SELECT cc.cookbook_id, u.id, u.username
        FROM cookbook_collaborators cc
        JOIN users u ON u.id = cc.user_id
        WHERE cc.cookbook_id = ANY($1)
        ORDER BY u.username
        "#,
    )
    .bind(&ids)
    .fetch_all(pool)
    .await?;

    let linked = sqlx::query_as::<_, CookbookRecipeRow>(
        r#"
        SELECT cr.cookbook_id, r.id, r.title, r.description, r.instructions,
               r.created_by, u.username AS created_by_username
        FROM cookbook_recipes cr
        JOIN recipes r ON r.id = cr.recipe_id
        JOIN users u ON u.id = r.created_by
        WHERE cr.cookbook_id = ANY($1)
        ORDER BY r.id
        "#,
    )
    .bind(&ids)
    .fetch_all(pool)
    .await?;

    let memberships: Vec<(i64, i64)> = linked
        .iter()
        .map(|l| (l.cookbook_id, l.recipe.id))
        .collect();
    let mut seen = HashSet::new();
    let recipe_rows: Vec<RecipeRow> = linked
        .into_iter()
        .map(|l| l.recipe)
        .filter(|r| seen.insert(r.id))
        .collect();
    let recipes: HashMap<i64, RecipeView> = load_views(pool, recipe_rows, viewer.id)
        .await?
        .into_iter()
        .map(|v| (v.id, v))
        .collect();

    Ok(build_views(
        rows,
        collaborators
            .into_iter()
            .map(|c| (c.cookbook_id, c.user))
            .collect(),
        memberships,
        &recipes,
    ))
}

/// Resolve `user`'s access to cookbook `id`. Missing cookbooks are `NotFound`.
async fn access(pool: &PgPool, id: i64, user: &Identity) -> Result<CookbookAccess, CookbookError> {
    let (owner_id, is_collaborator) = sqlx::query_as::<_, (i64, bool)>(
        r#"
        SELECT c.owner_id,
               EXISTS(
                 SELECT 1 FROM cookbook_collaborators cc
                 WHERE cc.cookbook_id = c.id AND cc.user_id = $2
               )
        FROM cookbooks c
        WHERE c.id = $1
        "#,
    )
    .bind(id)
    .bind(user.id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| not_found(id))?;
    Ok(CookbookAccess::resolve(owner_id, is_collaborator, user.id))
}

async fn require_edit(pool: &PgPool, id: i64, user: &Identity) -> Result<(), CookbookError> {
    if !access(pool, id, user).await?.can_edit() {
        return Err(CookbookError::Forbidden(
            "Only the owner or a collaborator can edit this cookbook".into(),
        ));
    }
    Ok(())
}

async fn require_owner(pool: &PgPool, id: i64, user: &Identity) -> Result<(), CookbookError> {
    if !access(pool, id, user).await?.is_owner() {
        return Err(CookbookError::Forbidden(
            "Only the owner can manage this cookbook".into(),
        ));
    }
    Ok(())
}

async fn find_user(pool: &PgPool, username: &str) -> Result<UserRef, CookbookError> {
    sqlx::query_as::<_, UserRef>("SELECT id, username FROM users WHERE username = $1")
        .bind(username.trim())
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| CookbookError::NotFound(format!("User '{}' not found", username.trim())))
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

pub async fn get_cookbook(
    pool: &PgPool,
    id: i64,
    viewer: &Identity,
) -> Result<CookbookView, CookbookError> {
    let row = sqlx::query_as::<_, CookbookRow>(&format!("{COOKBOOK_SELECT} WHERE c.id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| not_found(id))?;
    load_views_for(pool, vec![row], viewer)
        .await?
        .pop()
        .ok_or_else(|| not_found(id))
}

/// Every cookbook, in random order.
pub async fn list_cookbooks(pool: &PgPool, viewer: &Identity) -> Result<Vec<CookbookView>, CookbookError> {
    let mut rows = sqlx::query_as::<_, CookbookRow>(COOKBOOK_SELECT)
        .fetch_all(pool)
        .await?;
    rows.shuffle(&mut rand::rng());
    load_views_for(pool, rows, viewer).await
}

/// Cookbooks `user_id` owns or collaborates on, newest first.
pub async fn list_cookbooks_for_user(
    pool: &PgPool,
    user_id: i64,
    viewer: &Identity,
) -> Result<Vec<CookbookView>, CookbookError> {
    let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
        .bind(user_id)
        .fetch_one(pool)
        .await?;
    if !exists {
        return Err(CookbookError::NotFound(format!("User {user_id} not found")));
    }

    let rows = sqlx::query_as::<_, CookbookRow>(&format!(
        r#"{COOKBOOK_SELECT}
        WHERE c.owner_id = $1
           OR EXISTS(
             SELECT 1 FROM cookbook_collaborators cc
             WHERE cc.cookbook_id = c.id AND cc.user_id = $1
           )
        ORDER BY c.id DESC"#
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    load_views_for(pool, rows, viewer).await
}

/// Search by title substring and owner username substring, case-insensitive.
pub async fn search_cookbooks(
    pool: &PgPool,
    title: Option<&str>,
    username: Option<&str>,
    viewer: &Identity,
) -> Result<Vec<CookbookView>, CookbookError> {
    let clean = |v: Option<&str>| {
        v.map(str::trim)
            .filter(|v| !v.is_empty())
            .map(escape_like)
    };

    let rows = sqlx::query_as::<_, CookbookRow>(&format!(
        r#"{COOKBOOK_SELECT}
        WHERE ($1::text IS NULL OR c.title ILIKE '%' || $1 || '%')
          AND ($2::text IS NULL OR u.username ILIKE '%' || $2 || '%')
        ORDER BY c.id DESC"#
    ))
    .bind(clean(title))
    .bind(clean(username))
    .fetch_all(pool)
    .await?;
    debug!(matches = rows.len(), "cookbook search");
    load_views_for(pool, rows, viewer).await
}

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

pub async fn create_cookbook(
    pool: &PgPool,
    owner: &Identity,
    draft: &CookbookDraft,
) -> Result<i64, CookbookError> {
    validate_draft(draft)?;
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO cookbooks (title, description, owner_id) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(draft.title.trim())
    .bind(&draft.description)
    .bind(owner.id)
    .fetch_one(pool)
    .await?;
    info!(cookbook_id = id, user = %owner.username, "cookbook created");
    Ok(id)
}

pub async fn update_cookbook(
    pool: &PgPool,
    caller: &Identity,
    id: i64,
    draft: &CookbookDraft,
) -> Result<(), CookbookError> {
    require_edit(pool, id, caller).await?;
    validate_draft(draft)?;
    sqlx::query("UPDATE cookbooks SET title = $2, description = $3 WHERE id = $1")
        .bind(id)
        .bind(draft.title.trim())
        .bind(&draft.description)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn delete_cookbook(pool: &PgPool, caller: &Identity, id: i64) -> Result<(), CookbookError> {
    require_owner(pool, id, caller).await?;
    sqlx::query("DELETE FROM cookbooks WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    info!(cookbook_id = id, user = %caller.username, "cookbook deleted");
    Ok(())
}

pub async fn add_recipe(
    pool: &PgPool,
    caller: &Identity,
    id: i64,
    recipe_id: i64,
) -> Result<(), CookbookError> {
    require_edit(pool, id, caller).await?;
    if !recipe_exists(pool, recipe_id).await? {
        return Err(CookbookError::NotFound(format!(
            "Recipe {recipe_id} not found"
        )));
    }
    sqlx::query(
        "INSERT INTO cookbook_recipes (cookbook_id, recipe_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
    )
    .bind(id)
    .bind(recipe_id)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn remove_recipe(
    pool: &PgPool,
    caller: &Identity,
    id: i64,
    recipe_id: i64,
) -> Result<(), CookbookError> {
    require_edit(pool, id, caller).await?;
    let result = sqlx::query("DELETE FROM cookbook_recipes WHERE cookbook_id = $1 AND recipe_id = $2")
        .bind(id)
        .bind(recipe_id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(CookbookError::NotFound(format!(
            "Recipe {recipe_id} is not in cookbook {id}"
        )));
    }
    Ok(())
}

pub async fn add_collaborator(
    pool: &PgPool,
    caller: &Identity,
    id: i64,
    username: &str,
) -> Result<(), CookbookError> {
    require_owner(pool, id, caller).await?;
    let user = find_user(pool, username).await?;
    if user.id == caller.id {
        debug!(cookbook_id = id, "owner added as collaborator; ignoring");
        return Ok(());
    }
    sqlx::query(
        "INSERT INTO cookbook_collaborators (cookbook_id, user_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
    )
    .bind(id)
    .bind(user.id)
    .execute(pool)
    .await?;
    info!(cookbook_id = id, collaborator = %user.username, "collaborator added");
    Ok(())
}

pub async fn remove_collaborator(
    pool: &PgPool,
    caller: &Identity,
    id: i64,
    username: &str,
) -> Result<(), CookbookError> {
    require_owner(pool, id, caller).await?;
    let user = find_user(pool, username).await?;
    sqlx::query("DELETE FROM cookbook_collaborators WHERE cookbook_id = $1 AND user_id = $2")
        .bind(id)
        .bind(user.id)
        .execute(pool)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cookbook(id: i64, owner_id: i64) -> CookbookRow {
        CookbookRow {
            id,
            title: format!("Book {id}"),
            description: String::new(),
            owner_id,
            owner_username: "owner".into(),
        }
    }

    fn recipe(id: i64) -> RecipeView {
        RecipeView {
            id,
            title: format!("Recipe {id}"),
            description: String::new(),
            instructions: String::new(),
            ingredients: vec![],
            created_by_user_id: 1,
            created_by_username: "owner".into(),
            tags: vec![],
            favourite: false,
        }
    }

    fn user(id: i64, username: &str) -> UserRef {
        UserRef {
            id,
            username: username.into(),
        }
    }

    #[test]
    fn build_views_attaches_members() {
        let rows = vec![cookbook(1, 10), cookbook(2, 10)];
        let collaborators = vec![(1, user(20, "bob")), (1, user(21, "carol"))];
        let memberships = vec![(1, 100), (2, 100), (2, 101), (2, 999)];
        let recipes = HashMap::from([(100, recipe(100)), (101, recipe(101))]);

        let views = build_views(rows, collaborators, memberships, &recipes);

        assert_eq!(views[0].owner, user(10, "owner"));
        assert_eq!(views[0].collaborators.len(), 2);
        assert_eq!(views[0].recipes.len(), 1);
        assert!(views[1].collaborators.is_empty());
        let ids: Vec<i64> = views[1].recipes.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![100, 101]);
    }
}
