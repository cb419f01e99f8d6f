//! Credential store abstraction.
//!
//! The token service and the account flows only ever see accounts through
//! [`CredentialStore`]. [`PgCredentialStore`](super::PgCredentialStore) is the
//! production implementation; [`MemoryCredentialStore`] keeps accounts in
//! process and is used by tests and database-less local runs.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::AuthError;
use crate::models::auth::{Account, NewAccount, ProfileUpdate};

/// Persistence interface for accounts.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, AuthError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Account>, AuthError>;

    async fn exists_by_username(&self, username: &str) -> Result<bool, AuthError>;

    /// Insert a new account. A taken username yields `AuthError::Conflict`.
    async fn save(&self, account: NewAccount) -> Result<Account, AuthError>;

    /// All accounts, ordered by id.
    async fn list(&self) -> Result<Vec<Account>, AuthError>;

    /// Delete an account. Returns whether a row was removed.
    async fn delete(&self, id: i64) -> Result<bool, AuthError>;

    /// Replace username and bio. `None` when the account does not exist; a
    /// username held by another account yields `AuthError::Conflict`.
    async fn update_profile(
        &self,
        id: i64,
        update: ProfileUpdate,
    ) -> Result<Option<Account>, AuthError>;
}

/// In-process credential store.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    inner: RwLock<MemoryAccounts>,
}

#[derive(Debug, Default)]
struct MemoryAccounts {
    next_id: i64,
    accounts: BTreeMap<i64, Account>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, AuthError> {
        let inner = self.inner.read().await;
        Ok(inner
            .accounts
            .values()
            .find(|a| a.username == username)
            .cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Account>, AuthError> {
        Ok(self.inner.read().await.accounts.get(&id).cloned())
    }

    async fn exists_by_username(&self, username: &str) -> Result<bool, AuthError> {
        let inner = self.inner.read().await;
        Ok(inner.accounts.values().any(|a| a.username == username))
    }

    async fn save(&self, account: NewAccount) -> Result<Account, AuthError> {
        let mut inner = self.inner.write().await;
        if inner
            .accounts
            .values()
            .any(|a| a.username == account.username)
        {
            return Err(AuthError::Conflict(account.username));
        }
        inner.next_id += 1;
        let saved = Account {
            id: inner.next_id,
            username: account.username,
            password_hash: account.password_hash,
            role: account.role,
            bio: String::new(),
        };
        inner.accounts.insert(saved.id, saved.clone());
        Ok(saved)
    }

    async fn list(&self) -> Result<Vec<Account>, AuthError> {
        Ok(self.inner.read().await.accounts.values().cloned().collect())
    }

    async fn delete(&self, id: i64) -> Result<bool, AuthError> {
        Ok(self.inner.write().await.accounts.remove(&id).is_some())
    }

    async fn update_profile(
        &self,
        id: i64,
        update: ProfileUpdate,
    ) -> Result<Option<Account>, AuthError> {
        let mut inner = self.inner.write().await;
        if inner
            .accounts
            .values()
            .any(|a| a.id != id && a.username == update.username)
        {
            return Err(AuthError::Conflict(update.username));
        }
        let Some(account) = inner.accounts.get_mut(&id) else {
            return Ok(None);
        };
        account.username = update.username;
        account.bio = update.bio;
        Ok(Some(account.clone()))
    }
}
