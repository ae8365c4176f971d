use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use crate::cache::token::{FetchedToken, Token};
use crate::helpers::time::{deadline_rfc3339, get_instant, secs};
use crate::utils::constants::{DEFAULT_TOKEN_SKEW_SECS, DEFAULT_TOKEN_TTL_SECS};

/// Holder of the current bearer token for one set of credentials.
///
/// Clones share state. Each `ApiClient` owns its own cache, so clients built
/// with different credentials never see each other's tokens.
#[derive(Debug, Clone)]
pub struct TokenCache {
    state: Arc<RwLock<Option<Token>>>,
    // single-flight guard: only one fetch in progress per cache
    refresh: Arc<Mutex<()>>,
    skew: Duration,
}

impl Default for TokenCache {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenCache {
    pub fn new() -> Self {
        Self::with_skew(secs(DEFAULT_TOKEN_SKEW_SECS))
    }

    pub fn with_skew(skew: Duration) -> Self {
        Self {
            state: Arc::new(RwLock::new(None)),
            refresh: Arc::new(Mutex::new(())),
            skew,
        }
    }

    /// Cached token value if it is still outside the skew window.
    pub async fn current(&self) -> Option<String> {
        self.state
            .read()
            .await
            .as_ref()
            .filter(|token| token.is_fresh(self.skew))
            .map(|token| token.value.to_owned())
    }

    /// Returns the cached token, or runs `fetch` and caches its result.
    ///
    /// Fetch errors are returned as-is and leave the cache untouched.
    pub async fn get_or_refresh<F, Fut, E>(&self, fetch: F) -> Result<String, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<FetchedToken, E>>,
    {
        if let Some(value) = self.current().await {
            return Ok(value);
        }

        let _guard = self.refresh.lock().await;
        // another caller may have refreshed while we waited
        if let Some(value) = self.current().await {
            debug!("token refreshed by a concurrent caller");
            return Ok(value);
        }

        let fetched = fetch().await?;
        let expires_in = fetched.ttl_secs();
        let now = get_instant();
        let expires_at = now
            .checked_add(secs(expires_in))
            .unwrap_or_else(|| now + secs(DEFAULT_TOKEN_TTL_SECS));
        let token = Token::new(fetched.access_token, expires_at);
        info!(
            "token cached, expires in {} seconds (at {})",
            expires_in,
            deadline_rfc3339(token.expires_at)
        );
        let value = token.value.to_owned();
        *self.state.write().await = Some(token);
        Ok(value)
    }

    /// Forget the cached token; the next `get_or_refresh` fetches.
    pub async fn clear(&self) {
        let mut state = self.state.write().await;
        if state.take().is_some() {
            debug!("token cache cleared");
        }
    }

    pub async fn expires_at(&self) -> Option<tokio::time::Instant> {
        self.state.read().await.as_ref().map(|token| token.expires_at)
    }
}
