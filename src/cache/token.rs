use std::time::Duration;

use serde::Deserialize;
use tokio::time::Instant;

use crate::helpers::time::get_instant;
use crate::utils::constants::{DEFAULT_TOKEN_TTL_SECS, MAX_TOKEN_TTL_SECS};

/// Bearer token with the monotonic instant it stops being valid.
#[derive(Clone)]
pub struct Token {
    pub value: String,
    pub expires_at: Instant,
}

impl Token {
    pub fn new(value: String, expires_at: Instant) -> Self {
        Self { value, expires_at }
    }

    /// Usable if `now < expires_at - skew`.
    pub fn is_fresh(&self, skew: Duration) -> bool {
        match self.expires_at.checked_sub(skew) {
            Some(refresh_at) => get_instant() < refresh_at,
            None => false,
        }
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("value", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Token endpoint response (client-credentials grant).
#[derive(Clone, Deserialize)]
pub struct FetchedToken {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

impl FetchedToken {
    pub fn new(access_token: impl Into<String>, expires_in: Option<u64>) -> Self {
        Self { access_token: access_token.into(), expires_in }
    }

    /// Lifetime to cache for: one day when absent, capped at `MAX_TOKEN_TTL_SECS`.
    pub fn ttl_secs(&self) -> u64 {
        self.expires_in.unwrap_or(DEFAULT_TOKEN_TTL_SECS).min(MAX_TOKEN_TTL_SECS)
    }
}

impl std::fmt::Debug for FetchedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchedToken")
            .field("access_token", &"<redacted>")
            .field("expires_in", &self.expires_in)
            .finish()
    }
}
