//! Startup data: the bootstrap administrator.

use tracing::{info, warn};

use crate::auth::password::hash_password;
use crate::auth::{AuthError, CredentialStore};
use crate::models::auth::{NewAccount, Role};

/// Make sure an administrator account named `username` exists.
///
/// Returns `true` when the account was created. An existing account is
/// left untouched, whatever its role.
pub async fn ensure_admin(
    store: &dyn CredentialStore,
    username: &str,
    password: &str,
) -> Result<bool, AuthError> {
    let username = username.trim();
    if username.is_empty() || password.is_empty() {
        return Err(AuthError::Validation(
            "Admin username and password must not be blank".into(),
        ));
    }

    if let Some(existing) = store.find_by_username(username).await? {
        if existing.role != Role::Admin {
            warn!(user = %username, "bootstrap admin name belongs to a non-admin account");
        }
        return Ok(false);
    }

    let password_hash = hash_password(password)?;
    store
        .save(NewAccount {
            username: username.to_string(),
            password_hash,
            role: Role::Admin,
        })
        .await?;
    info!(user = %username, "bootstrap admin created");
    Ok(true)
}
