//! Authentication and authorization logic.
//!
//! Provides password hashing, token issuance/verification, and the
//! credential store that both resolve identities against.

pub mod password;
pub mod queries;
pub mod store;
pub mod token;

use thiserror::Error;

pub use crate::models::auth::{Account, Identity, NewAccount, ProfileUpdate, Role, TokenClaims};
pub use queries::PgCredentialStore;
pub use store::{CredentialStore, MemoryCredentialStore};
pub use token::TokenService;

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    Expired,

    #[error("Unknown subject: {0}")]
    UnknownSubject(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Username already taken: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Db(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}
