//! Request and response bodies.
//!
//! Field names are camelCase on the wire. Conversions to and from the
//! `pantry_core` domain models live next to each type.

use pantry_core::models::auth::{Account, Identity, Role};
use pantry_core::models::cookbook::{CookbookDraft, CookbookView, UserRef};
use pantry_core::models::recipe::{
    IngredientInput, IngredientView, RecipeDraft, RecipeSearch, RecipeView, Tag,
};
use serde::{Deserialize, Serialize};

/// Body of every error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Body returned by create endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedResponse {
    pub id: i64,
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

/// Username + password, used by register and both logins.
#[derive(Debug, Clone, Deserialize)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

/// Result of register (no token) and login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserTokenResponse {
    pub id: i64,
    pub username: String,
    pub token: Option<String>,
}

/// New username and bio for the caller's own profile.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileUpdateRequest {
    pub username: String,
    #[serde(default)]
    pub bio: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfileResponse {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

impl UserProfileResponse {
    /// Public profile without the role.
    pub fn public(account: &Account) -> Self {
        Self {
            id: account.id,
            username: account.username.clone(),
            role: None,
            bio: Some(account.bio.clone()),
        }
    }
}

impl From<&Identity> for UserProfileResponse {
    fn from(identity: &Identity) -> Self {
        Self {
            id: identity.id,
            username: identity.username.clone(),
            role: Some(identity.role),
            bio: None,
        }
    }
}

impl From<&Account> for UserProfileResponse {
    fn from(account: &Account) -> Self {
        Self {
            role: Some(account.role),
            ..Self::public(account)
        }
    }
}

// ---------------------------------------------------------------------------
// Recipes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngredientRequest {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub quantity: String,
}

/// Recipe body for create (`id` ignored) and update (`id` required).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeRequest {
    #[serde(default)]
    pub id: Option<i64>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub instructions: String,
    #[serde(default)]
    pub ingredients: Vec<IngredientRequest>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl From<RecipeRequest> for RecipeDraft {
    fn from(req: RecipeRequest) -> Self {
        RecipeDraft {
            title: req.title,
            description: req.description,
            instructions: req.instructions,
            ingredients: req
                .ingredients
                .into_iter()
                .map(|i| IngredientInput {
                    id: i.id,
                    name: i.name,
                    quantity: i.quantity,
                })
                .collect(),
            tags: req.tags,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngredientResponse {
    pub id: i64,
    pub name: String,
    pub quantity: String,
}

impl From<IngredientView> for IngredientResponse {
    fn from(view: IngredientView) -> Self {
        Self {
            id: view.id,
            name: view.name,
            quantity: view.quantity,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeResponse {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub instructions: String,
    pub ingredients: Vec<IngredientResponse>,
    pub created_by_username: String,
    pub created_by_user_id: i64,
    pub tags: Vec<String>,
    pub favourite: bool,
}

impl From<RecipeView> for RecipeResponse {
    fn from(view: RecipeView) -> Self {
        Self {
            id: view.id,
            title: view.title,
            description: view.description,
            instructions: view.instructions,
            ingredients: view.ingredients.into_iter().map(Into::into).collect(),
            created_by_username: view.created_by_username,
            created_by_user_id: view.created_by_user_id,
            tags: view.tags,
            favourite: view.favourite,
        }
    }
}

/// Query string of `GET /api/recipes/search`. `tags` may repeat.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecipeSearchQuery {
    pub username: Option<String>,
    pub title: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl From<RecipeSearchQuery> for RecipeSearch {
    fn from(q: RecipeSearchQuery) -> Self {
        RecipeSearch {
            username: q.username,
            title: q.title,
            tags: q.tags,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagResponse {
    pub id: i64,
    pub name: String,
}

impl From<Tag> for TagResponse {
    fn from(tag: Tag) -> Self {
        Self {
            id: tag.id,
            name: tag.name,
        }
    }
}

// ---------------------------------------------------------------------------
// Cookbooks
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct CookbookRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

impl From<CookbookRequest> for CookbookDraft {
    fn from(req: CookbookRequest) -> Self {
        CookbookDraft {
            title: req.title,
            description: req.description,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRefResponse {
    pub id: i64,
    pub username: String,
}

impl From<UserRef> for UserRefResponse {
    fn from(user: UserRef) -> Self {
        Self {
            id: user.id,
            username: user.username,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CookbookResponse {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub owner: UserRefResponse,
    pub collaborators: Vec<UserRefResponse>,
    pub recipes: Vec<RecipeResponse>,
}

impl From<CookbookView> for CookbookResponse {
    fn from(view: CookbookView) -> Self {
        Self {
            id: view.id,
            title: view.title,
            description: view.description,
            owner: view.owner.into(),
            collaborators: view.collaborators.into_iter().map(Into::into).collect(),
            recipes: view.recipes.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CookbookSearchQuery {
    pub title: Option<String>,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CollaboratorQuery {
    pub username: String,
}
