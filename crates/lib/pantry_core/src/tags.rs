//! Tag lookup, resolution and seeding.

use std::collections::HashSet;

use sqlx::{PgConnection, PgPool};
use tracing::{debug, info};

use crate::models::recipe::{Tag, UnknownTags};

/// Tags created at startup when missing.
pub const DEFAULT_TAGS: &[&str] = &[
    "vegan",
    "vegetarian",
    "gluten-free",
    "lactose-free",
    "dairy-free",
];

/// All tags, ordered by name.
pub async fn list_tags(pool: &PgPool) -> Result<Vec<Tag>, sqlx::Error> {
    sqlx::query_as::<_, Tag>("SELECT id, name FROM tags ORDER BY name")
        .fetch_all(pool)
        .await
}

/// Trim, drop blanks and de-duplicate while keeping first-seen order.
pub fn normalize_tag_names(names: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    names
        .iter()
        .map(|n| n.trim())
        .filter(|n| !n.is_empty())
        .filter(|n| seen.insert(n.to_string()))
        .map(str::to_string)
        .collect()
}

/// Resolve submitted tag names to tag rows.
///
/// With [`UnknownTags::Drop`] names without a row are silently left out;
/// with [`UnknownTags::Create`] they are inserted first.
pub async fn resolve_tags(
    conn: &mut PgConnection,
    names: &[String],
    unknown: UnknownTags,
) -> Result<Vec<Tag>, sqlx::Error> {
    let names = normalize_tag_names(names);
    if names.is_empty() {
        return Ok(Vec::new());
    }

    if unknown == UnknownTags::Create {
        sqlx::query(
            "INSERT INTO tags (name) SELECT unnest($1::text[]) ON CONFLICT (name) DO NOTHING",
        )
        .bind(&names)
        .execute(&mut *conn)
        .await?;
    }

    let tags = sqlx::query_as::<_, Tag>(
        "SELECT id, name FROM tags WHERE name = ANY($1) ORDER BY name",
    )
    .bind(&names)
    .fetch_all(&mut *conn)
    .await?;

    if tags.len() < names.len() {
        debug!(
            submitted = names.len(),
            resolved = tags.len(),
            "dropping unknown tag names"
        );
    }
    Ok(tags)
}

/// Insert [`DEFAULT_TAGS`] that are not present yet.
pub async fn seed_default_tags(pool: &PgPool) -> Result<u64, sqlx::Error> {
    let names: Vec<String> = DEFAULT_TAGS.iter().map(|t| t.to_string()).collect();
    let result = sqlx::query(
        "INSERT INTO tags (name) SELECT unnest($1::text[]) ON CONFLICT (name) DO NOTHING",
    )
    .bind(&names)
    .execute(pool)
    .await?;
    info!(inserted = result.rows_affected(), "default tags seeded");
    Ok(result.rows_affected())
}
