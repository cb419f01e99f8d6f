//! Recipe persistence and business rules.
//!
//! Provides recipe CRUD, search, favourites and the ingredient
//! reconciliation used when a recipe is updated.

pub mod favourites;
pub mod queries;
pub mod reconcile;

use thiserror::Error;

use crate::models::recipe::RecipeDraft;

/// Maximum recipe title length, in characters.
pub const MAX_TITLE_LEN: usize = 100;

/// Recipe errors.
#[derive(Debug, Error)]
pub enum RecipeError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Db(#[from] sqlx::Error),
}

/// Check a draft before it touches the database.
pub fn validate_draft(draft: &RecipeDraft) -> Result<(), RecipeError> {
    let title = draft.title.trim();
    if title.is_empty() {
        return Err(RecipeError::Validation("Title must not be blank".into()));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(RecipeError::Validation(format!(
            "Title must be at most {MAX_TITLE_LEN} characters"
        )));
    }
    if draft.ingredients.iter().any(|i| i.name.trim().is_empty()) {
        return Err(RecipeError::Validation(
            "Ingredient name must not be blank".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::recipe::IngredientInput;

    fn draft(title: &str) -> RecipeDraft {
        RecipeDraft {
            title: title.into(),
            ..RecipeDraft::default()
        }
    }

    #[test]
    fn blank_title_is_rejected() {
        assert!(matches!(
            validate_draft(&draft("   ")),
            Err(RecipeError::Validation(_))
        ));
    }

    #[test]
    fn long_title_is_rejected() {
        let title = "x".repeat(MAX_TITLE_LEN + 1);
        assert!(validate_draft(&draft(&title)).is_err());
        assert!(validate_draft(&draft(&"x".repeat(MAX_TITLE_LEN))).is_ok());
    }

    #[test]
    fn blank_ingredient_name_is_rejected() {
        let mut d = draft("Crepes");
        d.ingredients.push(IngredientInput {
            id: None,
            name: " ".into(),
            quantity: "2".into(),
        });
        assert!(validate_draft(&d).is_err());
    }
}
