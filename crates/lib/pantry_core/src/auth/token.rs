//! Access token issuance and verification.
//!
//! Tokens are HS256 JWTs carrying `{iss, role, iat, exp}`. The issuer claim
//! is the account username; verification always re-resolves the account
//! through the credential store rather than trusting the embedded role.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::distr::Alphanumeric;
use rand::{Rng, rng};
use tracing::{info, warn};

use super::{AuthError, CredentialStore};
use crate::models::auth::{Identity, Role, TokenClaims};

/// Default access token lifetime: 1 hour.
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 60 * 60;

/// Longest accepted token lifetime: one year.
pub const MAX_TOKEN_TTL_SECS: i64 = 365 * 24 * 60 * 60;

/// Issues and verifies signed, time-limited access tokens.
///
/// The signing secret is fixed for the lifetime of the service.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    /// Service with the default one hour lifetime.
    pub fn with_default_ttl(secret: &[u8]) -> Self {
        Self::new(secret, Duration::seconds(DEFAULT_TOKEN_TTL_SECS))
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for `username`, valid from now.
    pub fn issue(&self, username: &str, role: Role) -> Result<String, AuthError> {
        self.issue_at(username, role, Utc::now())
    }

    /// Issue a token as if the current time were `now`.
    pub fn issue_at(
        &self,
        username: &str,
        role: Role,
        now: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        let expires = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| AuthError::Internal("token expiry out of range".into()))?;
        let claims = TokenClaims {
            iss: username.to_string(),
            role,
            iat: now.timestamp(),
            exp: expires.timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::Internal(format!("jwt encode: {e}")))
    }

    /// Decode and check a token without touching the credential store.
    ///
    /// Expiry is judged before the signature: an expired token is always
    /// `Expired`, a malformed or foreign-signed live token is `InvalidToken`.
    pub fn decode(&self, token: &str) -> Result<TokenClaims, AuthError> {
        self.decode_at(token, Utc::now())
    }

    fn decode_at(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims, AuthError> {
        let mut unverified = Validation::new(Algorithm::HS256);
        unverified.insecure_disable_signature_validation();
        unverified.validate_exp = false;
        unverified.validate_aud = false;
        let claims = decode::<TokenClaims>(token, &DecodingKey::from_secret(&[]), &unverified)
            .map_err(|_| AuthError::InvalidToken)?
            .claims;

        if now.timestamp() > claims.exp {
            return Err(AuthError::Expired);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = false;
        validation.validate_aud = false;
        decode::<TokenClaims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|_| AuthError::InvalidToken)
    }

    /// Verify a token and resolve its issuer to a persisted identity.
    pub async fn verify(
        &self,
        token: &str,
        store: &dyn CredentialStore,
    ) -> Result<Identity, AuthError> {
        let claims = self.decode(token)?;
        let account = store
            .find_by_username(&claims.iss)
            .await?
            .ok_or(AuthError::UnknownSubject(claims.iss))?;
        Ok(account.identity())
    }
}

/// Resolve the signing secret: env var `JWT_SECRET` → persisted file.
pub fn resolve_token_secret() -> String {
    if let Ok(secret) = std::env::var("JWT_SECRET")
        && !secret.is_empty()
    {
        return secret;
    }
    load_or_create_secret(&token_secret_path())
}

/// Read the secret stored at `path`, generating and persisting one if absent.
pub fn load_or_create_secret(path: &Path) -> String {
    if let Ok(existing) = std::fs::read_to_string(path) {
        let trimmed = existing.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }
    let secret: String = rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect();
    if let Some(parent) = path.parent()
        && let Err(e) = std::fs::create_dir_all(parent)
    {
        warn!(path = %parent.display(), "could not create secret directory: {e}");
    }
    match std::fs::write(path, &secret) {
        Ok(()) => info!(path = %path.display(), "generated new token secret"),
        Err(e) => warn!(path = %path.display(), "token secret not persisted: {e}"),
    }
    secret
}

/// Path to the persisted token secret file.
fn token_secret_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("pantry")
        .join("token-secret")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{MemoryCredentialStore, NewAccount};

    const SECRET: &[u8] = b"test-secret";

    async fn store_with(username: &str, role: Role) -> MemoryCredentialStore {
        let store = MemoryCredentialStore::new();
        store
            .save(NewAccount {
                username: username.into(),
                password_hash: "unused".into(),
                role,
            })
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn issued_token_verifies_to_account() {
        let store = store_with("alice", Role::User).await;
        let tokens = TokenService::with_default_ttl(SECRET);

        let token = tokens.issue("alice", Role::User).unwrap();
        let identity = tokens.verify(&token, &store).await.unwrap();

        assert_eq!(identity.username, "alice");
        assert_eq!(identity.role, Role::User);
    }

    #[tokio::test]
    async fn role_comes_from_store_not_claims() {
        let store = store_with("alice", Role::User).await;
        let tokens = TokenService::with_default_ttl(SECRET);

        let token = tokens.issue("alice", Role::Admin).unwrap();
        let identity = tokens.verify(&token, &store).await.unwrap();

        assert_eq!(identity.role, Role::User);
    }

    #[test]
    fn claims_span_the_ttl() {
        let tokens = TokenService::with_default_ttl(SECRET);
        let now = Utc::now();
        let token = tokens.issue_at("alice", Role::User, now).unwrap();

        let claims = tokens.decode(&token).unwrap();
        assert_eq!(claims.iss, "alice");
        assert_eq!(claims.iat, now.timestamp());
        assert_eq!(claims.exp - claims.iat, DEFAULT_TOKEN_TTL_SECS);
    }

    #[test]
    fn expiry_overflow_is_an_error() {
        let tokens = TokenService::with_default_ttl(SECRET);
        let err = tokens
            .issue_at("alice", Role::User, DateTime::<Utc>::MAX_UTC)
            .unwrap_err();
        assert!(matches!(err, AuthError::Internal(_)));
    }

    #[test]
    fn expired_token_is_expired() {
        let tokens = TokenService::with_default_ttl(SECRET);
        let issued = Utc::now() - Duration::hours(2);
        let token = tokens.issue_at("alice", Role::User, issued).unwrap();

        assert!(matches!(tokens.decode(&token), Err(AuthError::Expired)));
    }

    #[test]
    fn expired_token_with_foreign_signature_is_still_expired() {
        let foreign = TokenService::with_default_ttl(b"other-secret");
        let tokens = TokenService::with_default_ttl(SECRET);
        let token = foreign
            .issue_at("alice", Role::User, Utc::now() - Duration::hours(2))
            .unwrap();

        assert!(matches!(tokens.decode(&token), Err(AuthError::Expired)));
    }

    #[test]
    fn foreign_signature_is_invalid() {
        let foreign = TokenService::with_default_ttl(b"other-secret");
        let tokens = TokenService::with_default_ttl(SECRET);
        let token = foreign.issue("alice", Role::User).unwrap();

        assert!(matches!(tokens.decode(&token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn garbage_is_invalid() {
        let tokens = TokenService::with_default_ttl(SECRET);
        assert!(matches!(tokens.decode("not.a.jwt"), Err(AuthError::InvalidToken)));
        assert!(matches!(tokens.decode(""), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn tampered_payload_is_invalid() {
        let tokens = TokenService::with_default_ttl(SECRET);
        let token = tokens.issue("alice", Role::User).unwrap();
        let other = tokens.issue("mallory", Role::Admin).unwrap();

        let parts: Vec<&str> = token.split('.').collect();
        let other_parts: Vec<&str> = other.split('.').collect();
        let forged = format!("{}.{}.{}", parts[0], other_parts[1], parts[2]);

        assert!(matches!(tokens.decode(&forged), Err(AuthError::InvalidToken)));
    }

    #[tokio::test]
    async fn unknown_subject_is_reported() {
        let store = MemoryCredentialStore::new();
        let tokens = TokenService::with_default_ttl(SECRET);
        let token = tokens.issue("ghost", Role::User).unwrap();

        let err = tokens.verify(&token, &store).await.unwrap_err();
        assert!(matches!(err, AuthError::UnknownSubject(name) if name == "ghost"));
    }

    #[test]
    fn secret_is_generated_once_and_reused() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("token-secret");

        let first = load_or_create_secret(&path);
        let second = load_or_create_secret(&path);

        assert_eq!(first.len(), 64);
        assert_eq!(first, second);
    }
}
