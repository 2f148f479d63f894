//! API key storage.
//!
//! Keys are shown to the operator once at creation; only their SHA-256
//! hash is stored, alongside the user id the key acts for.

use chrono::Utc;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use chatrelay_types::error::RepositoryError;

use super::pool::DatabasePool;

/// Prefix of every plaintext key.
pub const KEY_PREFIX: &str = "crly_";

/// A freshly minted key. `plaintext` is never stored.
#[derive(Debug, Clone)]
pub struct NewApiKey {
    pub id: Uuid,
    pub user_id: String,
    pub plaintext: String,
}

/// Compute SHA-256 hash of an API key (lowercase hex).
pub fn hash_api_key(key: &str) -> String {
    let digest = Sha256::digest(key.as_bytes());
    format!("{:x}", digest)
}

fn generate_key() -> String {
    format!(
        "{KEY_PREFIX}{}{}",
        Uuid::new_v4().simple(),
        Uuid::new_v4().simple()
    )
}

#[derive(Clone)]
pub struct SqliteApiKeyStore {
    pool: DatabasePool,
}

impl SqliteApiKeyStore {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Mint a key for `user_id`.
    pub async fn create(&self, user_id: &str, name: &str) -> Result<NewApiKey, RepositoryError> {
        let user_id = user_id.trim();
        if user_id.is_empty() {
            return Err(RepositoryError::Conflict("user id must not be empty".to_string()));
        }

        let id = Uuid::now_v7();
        let plaintext = generate_key();
        sqlx::query(
            "INSERT INTO api_keys (id, key_hash, user_id, name, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(id.to_string())
        .bind(hash_api_key(&plaintext))
        .bind(user_id)
        .bind(name)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        tracing::info!(key_id = %id, user_id = %user_id, "api key created");
        Ok(NewApiKey {
            id,
            user_id: user_id.to_string(),
            plaintext,
        })
    }

    /// Resolve a plaintext key to its owning user id.
    ///
    /// Also stamps `last_used_at`; a failure to do so is logged, not returned.
    pub async fn authenticate(&self, key: &str) -> Result<Option<String>, RepositoryError> {
        let row: Option<(String, String)> =
            sqlx::query_as("SELECT id, user_id FROM api_keys WHERE key_hash = ?")
                .bind(hash_api_key(key))
                .fetch_optional(&self.pool.reader)
                .await
                .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let Some((id, user_id)) = row else {
            return Ok(None);
        };

        if let Err(e) = sqlx::query("UPDATE api_keys SET last_used_at = ? WHERE id = ?")
            .bind(Utc::now().to_rfc3339())
            .bind(&id)
            .execute(&self.pool.writer)
            .await
        {
            tracing::warn!(key_id = %id, error = %e, "failed to record api key use");
        }
        Ok(Some(user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store() -> SqliteApiKeyStore {
        let dir = tempfile::tempdir().unwrap();
        let pool = DatabasePool::open_in(dir.path()).await.unwrap();
        std::mem::forget(dir);
        SqliteApiKeyStore::new(pool)
    }

    #[test]
    fn test_hash_is_lowercase_hex() {
        let hash = hash_api_key("crly_abc");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_eq!(hash, hash_api_key("crly_abc"));
    }

    #[tokio::test]
    async fn test_create_and_authenticate() {
        let store = store().await;
        let key = store.create("user-1", "laptop").await.unwrap();
        assert!(key.plaintext.starts_with(KEY_PREFIX));
        assert_eq!(key.plaintext.len(), KEY_PREFIX.len() + 64);

        let user = store.authenticate(&key.plaintext).await.unwrap();
        assert_eq!(user.as_deref(), Some("user-1"));

        let (last_used,): (Option<String>,) =
            sqlx::query_as("SELECT last_used_at FROM api_keys WHERE id = ?")
                .bind(key.id.to_string())
                .fetch_one(&store.pool.reader)
                .await
                .unwrap();
        assert!(last_used.is_some());
    }

    #[tokio::test]
    async fn test_unknown_key() {
        let store = store().await;
        store.create("user-1", "default").await.unwrap();
        assert!(store.authenticate("crly_nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_plaintext_not_stored() {
        let store = store().await;
        let key = store.create("user-2", "default").await.unwrap();
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM api_keys WHERE key_hash = ?")
            .bind(&key.plaintext)
            .fetch_one(&store.pool.reader)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_blank_user_rejected() {
        let store = store().await;
        assert!(store.create("  ", "default").await.is_err());
    }
}
