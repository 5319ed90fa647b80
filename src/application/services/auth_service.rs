//! API key authentication and key lifecycle.

use base64::Engine as _;
use hmac::{Hmac, Mac};
use serde_json::json;
use sha2::Sha256;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::repositories::{ApiKey, ApiKeyRepository};
use crate::error::AppError;

type HmacSha256 = Hmac<Sha256>;

/// Prefix of every raw API key.
pub const API_KEY_PREFIX: &str = "nl_";

/// Random bytes behind a key; 32 bytes encode to 43 URL-safe characters.
const API_KEY_BYTES: usize = 32;

/// Identity attached to an authenticated management API request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthContext {
    pub owner_id: Uuid,
    pub api_key_id: i64,
}

/// Authenticates API keys and manages their lifecycle.
///
/// Keys are hashed with HMAC-SHA256 (keyed by `signing_secret`) before storage
/// and comparison. Read-only access to the database is not enough to verify
/// or forge keys without the server-side secret.
pub struct AuthService {
    repository: Arc<dyn ApiKeyRepository>,
    signing_secret: String,
}

impl AuthService {
    pub fn new(repository: Arc<dyn ApiKeyRepository>, signing_secret: String) -> Self {
        Self {
            repository,
            signing_secret,
        }
    }

    /// Returns the 64-character hex HMAC of a raw key.
    pub fn hash_key(&self, raw_key: &str) -> Result<String, AppError> {
        let mut mac = HmacSha256::new_from_slice(self.signing_secret.as_bytes()).map_err(|e| {
            tracing::error!(error = %e, "Invalid API key signing secret");
            AppError::internal("Failed to hash API key", json!({}))
        })?;
        mac.update(raw_key.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    /// Authenticates a raw key and returns the caller's identity.
    ///
    /// Refreshes `last_used_at` on success; a failure to do so is logged and
    /// does not reject the request.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] (`INVALID_API_KEY`) for unknown or
    /// revoked keys and [`AppError::Internal`] on database errors.
    pub async fn authenticate(&self, raw_key: &str) -> Result<AuthContext, AppError> {
        let key_hash = self.hash_key(raw_key)?;

        let key = self
            .repository
            .find_active_by_hash(&key_hash)
            .await?
            .ok_or_else(|| AppError::unauthorized("INVALID_API_KEY", "Invalid or revoked API key"))?;

        if let Err(e) = self.repository.update_last_used(key.id).await {
            tracing::warn!(api_key_id = key.id, error = %e, "Failed to update last_used_at");
        }

        Ok(AuthContext {
            owner_id: key.owner_id,
            api_key_id: key.id,
        })
    }

    /// Creates a key for `owner_id` and returns it with the raw value.
    ///
    /// The raw key is not recoverable afterwards.
    pub async fn create_key(&self, owner_id: Uuid, name: &str) -> Result<(ApiKey, String), AppError> {
        let raw_key = generate_api_key()?;
        let key_hash = self.hash_key(&raw_key)?;
        let key = self.repository.create(owner_id, name, &key_hash).await?;
        Ok((key, raw_key))
    }

    pub async fn list_keys(&self, owner_id: Option<Uuid>) -> Result<Vec<ApiKey>, AppError> {
        self.repository.list(owner_id).await
    }

    /// Looks a key up by numeric id first, then by name.
    pub async fn find_key(&self, id_or_name: &str) -> Result<Option<ApiKey>, AppError> {
        if let Ok(id) = id_or_name.parse::<i64>()
            && let Some(key) = self.repository.find_by_id(id).await?
        {
            return Ok(Some(key));
        }
        self.repository.find_by_name(id_or_name).await
    }

    pub async fn revoke_key(&self, id: i64) -> Result<(), AppError> {
        self.repository.revoke(id).await
    }
}

/// Generates a raw key: `nl_` followed by 43 URL-safe base64 characters.
pub fn generate_api_key() -> Result<String, AppError> {
    let mut bytes = [0u8; API_KEY_BYTES];
    getrandom::fill(&mut bytes).map_err(|e| {
        tracing::error!(error = %e, "System RNG unavailable");
        AppError::internal("Failed to generate API key", json!({}))
    })?;

    Ok(format!(
        "{}{}",
        API_KEY_PREFIX,
        base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockApiKeyRepository;
    use chrono::Utc;

    fn test_secret() -> String {
        "test-signing-secret".to_string()
    }

    fn api_key(id: i64, owner_id: Uuid, key_hash: &str) -> ApiKey {
        ApiKey {
            id,
            owner_id,
            name: "ci".to_string(),
            key_hash: key_hash.to_string(),
            created_at: Utc::now(),
            last_used_at: None,
            revoked_at: None,
        }
    }

    fn expected_hash(raw: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(test_secret().as_bytes()).unwrap();
        mac.update(raw.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    #[tokio::test]
    async fn test_authenticate_success() {
        let owner = Uuid::new_v4();
        let hash = expected_hash("nl_valid");

        let mut repo = MockApiKeyRepository::new();
        let lookup_hash = hash.clone();
        repo.expect_find_active_by_hash()
            .withf(move |h| h == lookup_hash)
            .times(1)
            .returning(move |h| Ok(Some(api_key(3, owner, h))));
        repo.expect_update_last_used()
            .withf(|id| *id == 3)
            .times(1)
            .returning(|_| Ok(()));

        let service = AuthService::new(Arc::new(repo), test_secret());
        let ctx = service.authenticate("nl_valid").await.unwrap();

        assert_eq!(ctx.owner_id, owner);
        assert_eq!(ctx.api_key_id, 3);
    }

    #[tokio::test]
    async fn test_authenticate_unknown_key() {
        let mut repo = MockApiKeyRepository::new();
        repo.expect_find_active_by_hash()
            .times(1)
            .returning(|_| Ok(None));
        repo.expect_update_last_used().never();

        let service = AuthService::new(Arc::new(repo), test_secret());
        let err = service.authenticate("nl_nope").await.unwrap_err();

        assert!(matches!(err, AppError::Unauthorized { .. }));
        assert_eq!(err.code(), "INVALID_API_KEY");
    }

    #[tokio::test]
    async fn test_last_used_failure_does_not_reject() {
        let mut repo = MockApiKeyRepository::new();
        repo.expect_find_active_by_hash()
            .returning(|h| Ok(Some(api_key(1, Uuid::nil(), h))));
        repo.expect_update_last_used()
            .returning(|_| Err(AppError::internal("Database error", json!({}))));

        let service = AuthService::new(Arc::new(repo), test_secret());
        assert!(service.authenticate("nl_valid").await.is_ok());
    }

    #[tokio::test]
    async fn test_create_key_stores_hash_not_raw() {
        let owner = Uuid::new_v4();
        let mut repo = MockApiKeyRepository::new();
        repo.expect_create()
            .withf(move |o, name, hash| *o == owner && name == "deploy" && hash.len() == 64)
            .times(1)
            .returning(|o, _, h| Ok(api_key(9, o, h)));

        let service = AuthService::new(Arc::new(repo), test_secret());
        let (key, raw) = service.create_key(owner, "deploy").await.unwrap();

        assert_eq!(key.key_hash, expected_hash(&raw));
        assert_ne!(key.key_hash, raw);
    }

    #[tokio::test]
    async fn test_find_key_falls_back_to_name() {
        let mut repo = MockApiKeyRepository::new();
        repo.expect_find_by_id().never();
        repo.expect_find_by_name()
            .withf(|n| n == "deploy")
            .returning(|_| Ok(Some(api_key(4, Uuid::nil(), "h"))));

        let service = AuthService::new(Arc::new(repo), test_secret());
        let key = service.find_key("deploy").await.unwrap().unwrap();
        assert_eq!(key.id, 4);
    }

    #[test]
    fn test_generated_key_shape() {
        let key = generate_api_key().unwrap();
        assert!(key.starts_with("nl_"));
        assert_eq!(key.len(), 3 + 43);
        assert!(
            key[3..]
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn test_hash_depends_on_secret() {
        let a = AuthService::new(Arc::new(MockApiKeyRepository::new()), "secret-a".to_string());
        let b = AuthService::new(Arc::new(MockApiKeyRepository::new()), "secret-b".to_string());

        assert_eq!(a.hash_key("k").unwrap(), a.hash_key("k").unwrap());
        assert_ne!(a.hash_key("k").unwrap(), b.hash_key("k").unwrap());
        assert_eq!(a.hash_key("k").unwrap().len(), 64);
    }
}
