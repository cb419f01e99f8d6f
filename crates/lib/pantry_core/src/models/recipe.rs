//! Recipe, ingredient and tag domain models.

use serde::{Deserialize, Serialize};

/// Database row for `recipes`, joined with the creator's username.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RecipeRow {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub instructions: String,
    pub created_by: i64,
    pub created_by_username: String,
}

/// Database row for `recipe_ingredients`.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct IngredientRow {
    pub id: i64,
    pub recipe_id: i64,
    pub name: String,
    pub quantity: String,
    pub position: i32,
}

/// Database row for `tags`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tag {
    pub id: i64,
    pub name: String,
}

/// A submitted ingredient. `id` is `None` for rows that do not exist yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngredientInput {
    pub id: Option<i64>,
    pub name: String,
    pub quantity: String,
}

/// Client-submitted recipe content, used for both create and update.
#[derive(Debug, Clone, Default)]
pub struct RecipeDraft {
    pub title: String,
    pub description: String,
    pub instructions: String,
    pub ingredients: Vec<IngredientInput>,
    pub tags: Vec<String>,
}

/// Ingredient as presented to callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngredientView {
    pub id: i64,
    pub name: String,
    pub quantity: String,
}

/// A fully assembled recipe as seen by a particular viewer.
#[derive(Debug, Clone)]
pub struct RecipeView {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub instructions: String,
    pub ingredients: Vec<IngredientView>,
    pub created_by_user_id: i64,
    pub created_by_username: String,
    pub tags: Vec<String>,
    /// Whether the viewer has favourited this recipe.
    pub favourite: bool,
}

/// Search filters. Blank strings and empty tag lists mean "no filter".
#[derive(Debug, Clone, Default)]
pub struct RecipeSearch {
    pub username: Option<String>,
    pub title: Option<String>,
    pub tags: Vec<String>,
}

/// What to do with submitted tag names that have no `tags` row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnknownTags {
    /// Silently drop unknown names.
    #[default]
    Drop,
    /// Insert missing tags before linking them.
    Create,
}

impl std::str::FromStr for UnknownTags {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "drop" => Ok(UnknownTags::Drop),
            "create" => Ok(UnknownTags::Create),
            other => Err(format!("unknown tag policy '{other}' (expected drop or create)")),
        }
    }
}
