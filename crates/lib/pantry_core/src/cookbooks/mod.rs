//! Shared cookbooks.
//!
//! A cookbook has one owner and any number of collaborators. Owner and
//! collaborators may edit content and the recipe set; only the owner may
//! delete the cookbook or manage collaborators.

pub mod queries;

use thiserror::Error;

use crate::models::cookbook::CookbookDraft;
use crate::recipes::MAX_TITLE_LEN;

/// Cookbook errors.
#[derive(Debug, Error)]
pub enum CookbookError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Db(#[from] sqlx::Error),
}

/// What a user may do with a cookbook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CookbookAccess {
    Owner,
    Collaborator,
    None,
}

impl CookbookAccess {
    pub fn resolve(owner_id: i64, is_collaborator: bool, user_id: i64) -> Self {
        if owner_id == user_id {
            CookbookAccess::Owner
        } else if is_collaborator {
            CookbookAccess::Collaborator
        } else {
            CookbookAccess::None
        }
    }

    /// Owner and collaborators may edit content and recipes.
    pub fn can_edit(self) -> bool {
        matches!(self, CookbookAccess::Owner | CookbookAccess::Collaborator)
    }

    pub fn is_owner(self) -> bool {
        self == CookbookAccess::Owner
    }
}

pub fn validate_draft(draft: &CookbookDraft) -> Result<(), CookbookError> {
    let title = draft.title.trim();
    if title.is_empty() {
        return Err(CookbookError::Validation("Title must not be blank".into()));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(CookbookError::Validation(format!(
            "Title must be at most {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(())
}
