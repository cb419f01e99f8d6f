//! Cookbook domain models.

use super::recipe::RecipeView;

/// Database row for `cookbooks`, joined with the owner's username.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CookbookRow {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub owner_id: i64,
    pub owner_username: String,
}

/// Minimal user reference (id + username).
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct UserRef {
    pub id: i64,
    pub username: String,
}

/// Client-submitted cookbook content.
#[derive(Debug, Clone, Default)]
pub struct CookbookDraft {
    pub title: String,
    pub description: String,
}

/// A fully assembled cookbook.
#[derive(Debug, Clone)]
pub struct CookbookView {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub owner: UserRef,
    pub collaborators: Vec<UserRef>,
    pub recipes: Vec<RecipeView>,
}
