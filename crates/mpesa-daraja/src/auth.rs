//! Daraja OAuth token cache (C4, §4.4)
//!
//! Keyed by `(consumerKey, environment)`. Backed by `dashmap` for a
//! race-free process-wide cache, with a per-key single-flight mutex so
//! concurrent refreshes for the same key coalesce into one upstream call.

use std::sync::Arc;
use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use mpesa_types::Environment;
use serde::Deserialize;
use tokio::sync::Mutex as AsyncMutex;

use crate::error::{DarajaError, DarajaResult};

/// Plaintext credentials needed to mint or reuse a token. Never logged.
#[derive(Debug, Clone)]
pub struct DarajaCredentials {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub environment: Environment,
}

type CacheKey = (String, Environment);

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

/// Buffer subtracted from the token's real expiry so callers never race a
/// just-expired token.
const EXPIRY_BUFFER: Duration = Duration::from_secs(5 * 60);
const DEFAULT_EXPIRES_IN_SECS: i64 = 3600;

#[derive(Deserialize)]
struct OAuthResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: String,
}

fn default_expires_in() -> String {
    DEFAULT_EXPIRES_IN_SECS.to_string()
}

pub struct DarajaAuth {
    client: reqwest::Client,
    cache: DashMap<CacheKey, CachedToken>,
    refresh_locks: DashMap<CacheKey, Arc<AsyncMutex<()>>>,
}

impl DarajaAuth {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            cache: DashMap::new(),
            refresh_locks: DashMap::new(),
        }
    }

    /// Get a cached token or fetch a fresh one, coalescing concurrent
    /// refreshes for the same `(consumerKey, environment)` key.
    pub async fn get_token(&self, creds: &DarajaCredentials) -> DarajaResult<String> {
        let key = (creds.consumer_key.clone(), creds.environment);

        if let Some(token) = self.fresh_cached(&key) {
            return Ok(token);
        }

        let lock = self
            .refresh_locks
            .entry(key.clone())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone();
        let _guard = lock.lock().await;

        // Re-check: another task may have refreshed while we waited.
        if let Some(token) = self.fresh_cached(&key) {
            return Ok(token);
        }

        let fetched = self.fetch_token(creds).await?;
        self.cache.insert(key, fetched.clone());
        Ok(fetched.access_token)
    }

    fn fresh_cached(&self, key: &CacheKey) -> Option<String> {
        let entry = self.cache.get(key)?;
        let buffer = chrono::Duration::from_std(EXPIRY_BUFFER).unwrap();
        if Utc::now() + buffer < entry.expires_at {
            Some(entry.access_token.clone())
        } else {
            None
        }
    }

    async fn fetch_token(&self, creds: &DarajaCredentials) -> DarajaResult<CachedToken> {
        let url = format!(
            "{}/oauth/v1/generate?grant_type=client_credentials",
            creds.environment.base_url()
        );
        let basic = STANDARD.encode(format!("{}:{}", creds.consumer_key, creds.consumer_secret));

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Basic {basic}"))
            .send()
            .await
            .map_err(|e| DarajaError::AuthFailed(e.to_string()))?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DarajaError::AuthFailed(body));
        }

        let parsed: OAuthResponse = response
            .json()
            .await
            .map_err(|e| DarajaError::AuthFailed(e.to_string()))?;

        let expires_in: i64 = parsed
            .expires_in
            .parse()
            .unwrap_or(DEFAULT_EXPIRES_IN_SECS);

        Ok(CachedToken {
            access_token: parsed.access_token,
            expires_at: Utc::now() + chrono::Duration::seconds(expires_in),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_key_distinguishes_environment() {
        let creds_sandbox = DarajaCredentials {
            consumer_key: "key".to_string(),
            consumer_secret: "secret".to_string(),
            environment: Environment::Sandbox,
        };
        let creds_prod = DarajaCredentials {
            consumer_key: "key".to_string(),
            consumer_secret: "secret".to_string(),
            environment: Environment::Production,
        };
        let key_a: CacheKey = (creds_sandbox.consumer_key.clone(), creds_sandbox.environment);
        let key_b: CacheKey = (creds_prod.consumer_key.clone(), creds_prod.environment);
        assert_ne!(key_a, key_b);
    }
}
