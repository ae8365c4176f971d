//! Shared constants and invariants

pub const DEFAULT_TOKEN_SKEW_SECS: u64 = 60;
/// Used when the token endpoint omits `expires_in`.
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 86_400;
/// Upper bound on any advertised `expires_in`.
pub const MAX_TOKEN_TTL_SECS: u64 = 30 * 86_400;
pub const DEFAULT_HTTP_TIMEOUT_MS: u64 = 10_000;

pub const ENV_CLIENT_ID: &str = "PAYMENTS_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "PAYMENTS_CLIENT_SECRET";

pub const SANDBOX_BASE_URL: &str = "https://sandbox.api.payments.example.com/v1";
pub const SANDBOX_AUTH_URL: &str = "https://sandbox.api.payments.example.com/oauth/token";
pub const PRODUCTION_BASE_URL: &str = "https://api.payments.example.com/v1";
pub const PRODUCTION_AUTH_URL: &str = "https://api.payments.example.com/oauth/token";

pub const IDEMPOTENCY_KEY_HEADER: &str = "Idempotency-Key";
