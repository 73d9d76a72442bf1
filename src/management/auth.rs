use std::{fmt, io::Error, path::PathBuf};

use chrono::{DateTime, Utc};

use crate::types::{Credential, TokenResponse};

/// Seconds before `expires_at` at which a cached token stops being used.
pub const TOKEN_SAFETY_MARGIN_SECS: i64 = 300;

#[derive(Debug)]
pub enum CacheError {
    IoError(Error),
    SerdeError(serde_json::Error),
}

impl From<Error> for CacheError {
    fn from(err: Error) -> Self {
        CacheError::IoError(err)
    }
}

impl From<serde_json::Error> for CacheError {
    fn from(err: serde_json::Error) -> Self {
        CacheError::SerdeError(err)
    }
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheError::IoError(e) => write!(f, "token cache I/O error: {}", e),
            CacheError::SerdeError(e) => write!(f, "token cache corrupted or key missing: {}", e),
        }
    }
}

impl std::error::Error for CacheError {}

impl Credential {
    /// Builds the credential for a token issued at `now`.
    pub fn issue(response: TokenResponse, now: DateTime<Utc>) -> Self {
        Credential {
            access_token: response.access_token,
            expires_at: now.timestamp().saturating_add(response.expires_in),
            token_type: response.token_type,
            cached_at: now,
        }
    }

    pub fn is_valid_at(&self, now: i64) -> bool {
        now < self.expires_at.saturating_sub(TOKEN_SAFETY_MARGIN_SECS)
    }
}

/// JSON file holding the last client-credentials token.
pub struct TokenCache {
    path: PathBuf,
}

impl TokenCache {
    pub fn new(path: PathBuf) -> Self {
        TokenCache { path }
    }

    /// `Ok(None)` when no cache file exists yet.
    pub async fn load(&self) -> Result<Option<Credential>, CacheError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = async_fs::read_to_string(&self.path).await?;
        let credential: Credential = serde_json::from_str(&content)?;
        Ok(Some(credential))
    }

    pub async fn persist(&self, credential: &Credential) -> Result<(), CacheError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                async_fs::create_dir_all(parent).await?;
            }
        }

        let json = serde_json::to_string_pretty(credential)?;
        async_fs::write(&self.path, json).await?;
        Ok(())
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn credential(expires_at: i64) -> Credential {
        Credential {
            access_token: "token".to_string(),
            expires_at,
            token_type: "Bearer".to_string(),
            cached_at: Utc.timestamp_opt(0, 0).unwrap(),
        }
    }

    #[test]
    fn token_valid_well_before_expiry() {
        let now = 1_700_000_000;
        assert!(credential(now + 1000).is_valid_at(now));
    }

    #[test]
    fn token_inside_safety_margin_is_invalid() {
        let now = 1_700_000_000;
        assert!(!credential(now + 100).is_valid_at(now));
        assert!(!credential(now + TOKEN_SAFETY_MARGIN_SECS).is_valid_at(now));
        assert!(credential(now + TOKEN_SAFETY_MARGIN_SECS + 1).is_valid_at(now));
    }

    #[test]
    fn issue_computes_expiry_from_ttl() {
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let credential = Credential::issue(
            TokenResponse {
                access_token: "abc".to_string(),
                expires_in: 3600,
                token_type: "Bearer".to_string(),
            },
            now,
        );

        assert_eq!(credential.access_token, "abc");
        assert_eq!(credential.expires_at, 1_700_003_600);
        assert_eq!(credential.cached_at, now);
    }

    #[test]
    fn extreme_expiry_values_do_not_overflow() {
        let now = 1_700_000_000;
        assert!(!credential(i64::MIN).is_valid_at(now));
        assert!(credential(i64::MAX).is_valid_at(now));

        let issued = Credential::issue(
            TokenResponse {
                access_token: "abc".to_string(),
                expires_in: i64::MAX,
                token_type: "Bearer".to_string(),
            },
            Utc.timestamp_opt(now, 0).unwrap(),
        );
        assert_eq!(issued.expires_at, i64::MAX);
    }

    #[tokio::test]
    async fn missing_cache_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let cache = TokenCache::new(dir.path().join("cache/token.json"));

        assert!(cache.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn persisted_credential_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let cache = TokenCache::new(dir.path().join("cache/token.json"));
        let stored = credential(1_700_000_000);

        cache.persist(&stored).await.unwrap();

        assert_eq!(cache.load().await.unwrap(), Some(stored));
    }

    #[tokio::test]
    async fn cache_file_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");
        TokenCache::new(path.clone())
            .persist(&credential(1_700_003_600))
            .await
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        let object = value.as_object().unwrap();

        let mut keys: Vec<&str> = object.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["access_token", "cached_at", "expires_at", "token_type"]);

        assert_eq!(object["access_token"], "token");
        assert_eq!(object["expires_at"].as_i64(), Some(1_700_003_600));
        assert_eq!(object["token_type"], "Bearer");

        let cached_at = object["cached_at"].as_str().unwrap();
        assert!(DateTime::parse_from_rfc3339(cached_at).is_ok());
    }

    #[tokio::test]
    async fn corrupt_cache_is_a_serde_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");
        std::fs::write(&path, "{\"access_token\": \"abc\"}").unwrap();

        let err = TokenCache::new(path).load().await.unwrap_err();
        assert!(matches!(err, CacheError::SerdeError(_)));
    }
}
