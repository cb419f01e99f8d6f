//! Account service: register and login flows over the credential store.

use pantry_core::auth::password::{hash_password, verify_password};
use pantry_core::auth::{
    Account, AuthError, CredentialStore, Identity, NewAccount, ProfileUpdate, Role, TokenService,
};
use tracing::{debug, info};

use crate::error::{AppError, AppResult};
use crate::models::{UserProfileResponse, UserTokenResponse};

/// Maximum username length, in characters.
pub const MAX_USERNAME_LEN: usize = 50;

fn validate_username(username: &str) -> AppResult<()> {
    if username.is_empty() {
        return Err(AppError::Validation("Username must not be blank".into()));
    }
    if username.chars().count() > MAX_USERNAME_LEN {
        return Err(AppError::Validation(format!(
            "Username must be at most {MAX_USERNAME_LEN} characters"
        )));
    }
    Ok(())
}

fn validate_credentials(username: &str, password: &str) -> AppResult<()> {
    validate_username(username)?;
    if password.trim().is_empty() {
        return Err(AppError::Validation("Password must not be blank".into()));
    }
    Ok(())
}

/// Check a username/password pair. Unknown users and wrong passwords fail
/// identically.
async fn authenticate(
    store: &dyn CredentialStore,
    username: &str,
    password: &str,
) -> Result<Account, AuthError> {
    let account = store
        .find_by_username(username.trim())
        .await?
        .ok_or(AuthError::InvalidCredentials)?;
    if !verify_password(password, &account.password_hash)? {
        return Err(AuthError::InvalidCredentials);
    }
    Ok(account)
}

/// Create a `USER` account. The response carries no token.
pub async fn register(
    store: &dyn CredentialStore,
    username: &str,
    password: &str,
) -> AppResult<UserTokenResponse> {
    let username = username.trim();
    validate_credentials(username, password)?;

    if store.exists_by_username(username).await? {
        return Err(AuthError::Conflict(username.to_string()).into());
    }

    let account = store
        .save(NewAccount {
            username: username.to_string(),
            password_hash: hash_password(password)?,
            role: Role::User,
        })
        .await?;

    info!(user = %account.username, id = account.id, "account registered");
    Ok(UserTokenResponse {
        id: account.id,
        username: account.username,
        token: None,
    })
}

/// Authenticate and issue an access token.
pub async fn login(
    store: &dyn CredentialStore,
    tokens: &TokenService,
    username: &str,
    password: &str,
) -> AppResult<UserTokenResponse> {
    let account = authenticate(store, username, password).await?;
    let token = tokens.issue(&account.username, account.role)?;
    debug!(user = %account.username, "login succeeded");
    Ok(UserTokenResponse {
        id: account.id,
        username: account.username,
        token: Some(token),
    })
}

/// As [`login`], but only admin accounts get a token.
pub async fn login_admin(
    store: &dyn CredentialStore,
    tokens: &TokenService,
    username: &str,
    password: &str,
) -> AppResult<UserTokenResponse> {
    let account = authenticate(store, username, password).await?;
    if account.role != Role::Admin {
        debug!(user = %account.username, "admin login refused for non-admin");
        return Err(AuthError::InvalidCredentials.into());
    }
    let token = tokens.issue(&account.username, account.role)?;
    info!(user = %account.username, "admin login");
    Ok(UserTokenResponse {
        id: account.id,
        username: account.username,
        token: Some(token),
    })
}

/// Replace the caller's username and bio.
///
/// Tokens name their account by username, so after a rename the caller's
/// existing tokens stop resolving and a fresh login is needed.
pub async fn update_profile(
    store: &dyn CredentialStore,
    caller: &Identity,
    username: &str,
    bio: &str,
) -> AppResult<UserProfileResponse> {
    let username = username.trim();
    validate_username(username)?;

    let update = ProfileUpdate {
        username: username.to_string(),
        bio: bio.trim().to_string(),
    };
    let account = store
        .update_profile(caller.id, update)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", caller.id)))?;

    if account.username != caller.username {
        info!(from = %caller.username, to = %account.username, "account renamed");
    }
    Ok(UserProfileResponse::from(&account))
}
