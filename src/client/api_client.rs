use std::time::Duration;

use reqwest::{Client, Url};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::cache::TokenCache;
use crate::client::credentials::Credentials;
use crate::client::oauth2;
use crate::client::request::ApiRequest;
use crate::config::settings::{ServiceConfig, SettingsConfig};
use crate::errors::ToolError;
use crate::helpers::time::{get_instant, secs};
use crate::observability::metrics::get_metrics;
use crate::utils::constants::{
    DEFAULT_HTTP_TIMEOUT_MS, DEFAULT_TOKEN_SKEW_SECS, IDEMPOTENCY_KEY_HEADER, SANDBOX_AUTH_URL,
    SANDBOX_BASE_URL,
};

static NETWORK_MSG: &'static str = "network";

#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub base_url: String,
    pub auth_url: String,
    pub timeout: Duration,
    pub token_skew: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            base_url: SANDBOX_BASE_URL.to_owned(),
            auth_url: SANDBOX_AUTH_URL.to_owned(),
            timeout: Duration::from_millis(DEFAULT_HTTP_TIMEOUT_MS),
            token_skew: secs(DEFAULT_TOKEN_SKEW_SECS),
        }
    }
}

impl ClientOptions {
    pub fn from_settings(settings: &SettingsConfig) -> Self {
        Self {
            base_url: settings.resolved_base_url().to_owned(),
            auth_url: settings.resolved_auth_url().to_owned(),
            timeout: Duration::from_millis(settings.timeout_ms),
            token_skew: secs(settings.token_skew_seconds),
        }
    }

    /// Points both the API and the token endpoint at one host, `{host}/oauth/token` for auth.
    pub fn for_host(host: &str) -> Self {
        let host = host.trim_end_matches('/');
        Self {
            base_url: host.to_owned(),
            auth_url: format!("{}/oauth/token", host),
            ..Self::default()
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Payments API client with a private token cache.
///
/// Every call obtains a token through the cache, and a 401 clears the cache and
/// retries exactly once with a fresh token. Nothing else is retried.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    credentials: Credentials,
    base_url: Url,
    auth_url: Url,
    cache: TokenCache,
}

impl ApiClient {
    pub fn new(credentials: Credentials, options: ClientOptions) -> Result<Self, ToolError> {
        let base_url = parse_url("base_url", &options.base_url)?;
        let auth_url = parse_url("auth_url", &options.auth_url)?;
        if base_url.cannot_be_a_base() {
            return Err(ToolError::Configuration(format!("base_url '{}' cannot be a base", base_url)));
        }
        if options.timeout.is_zero() {
            return Err(ToolError::Configuration("timeout must be greater than zero".to_owned()));
        }
        let http = Client::builder()
            .timeout(options.timeout)
            .connect_timeout(options.timeout)
            .build()
            .map_err(|e| ToolError::Configuration(format!("failed to build HTTP client: {}", e)))?;

        info!(
            "api client for '{}' targeting {} (auth {})",
            credentials.client_id(),
            base_url,
            auth_url
        );
        Ok(Self {
            http,
            credentials,
            base_url,
            auth_url,
            cache: TokenCache::with_skew(options.token_skew),
        })
    }

    pub fn from_config(config: &ServiceConfig) -> Result<Self, ToolError> {
        let credentials = Credentials::resolve(&config.credentials)?;
        Self::new(credentials, ClientOptions::from_settings(&config.settings))
    }

    pub fn token_cache(&self) -> &TokenCache {
        &self.cache
    }

    /// Valid bearer token, fetched only on a cold or stale cache.
    pub async fn access_token(&self) -> Result<String, ToolError> {
        self.cache
            .get_or_refresh(|| oauth2::fetch_token(&self.http, &self.auth_url, &self.credentials))
            .await
    }

    /// Performs `request` and returns the parsed JSON body.
    pub async fn request(&self, request: &ApiRequest) -> Result<Value, ToolError> {
        let token = self.access_token().await?;
        match self.send(request, &token).await {
            Err(err) if err.is_unauthorized() => {
                warn!(
                    "{} {} unauthorized, refreshing token and retrying once",
                    request.method,
                    request.path()
                );
                get_metrics().await.token_refresh_on_unauthorized.inc();
                self.cache.clear().await;
                let token = self.access_token().await?;
                self.send(request, &token).await
            }
            result => result,
        }
    }

    async fn send(&self, request: &ApiRequest, token: &str) -> Result<Value, ToolError> {
        let metrics = get_metrics().await;
        let method = request.method.as_str();
        let url = self.url_for(request)?;

        let mut builder = self.http.request(request.method.clone(), url).bearer_auth(token);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        if let Some(key) = &request.idempotency_key {
            builder = builder.header(IDEMPOTENCY_KEY_HEADER, key);
        }

        let start = get_instant();
        let response = builder.send().await.map_err(|e| {
            metrics.api_requests.with_label_values(&[method, NETWORK_MSG]).inc();
            ToolError::network(e)
        })?;
        let status = response.status();
        metrics.api_requests.with_label_values(&[method, status.as_str()]).inc();

        let body = response.text().await.map_err(ToolError::network)?;
        metrics
            .api_request_duration
            .with_label_values(&[method])
            .observe(start.elapsed().as_secs_f64());
        debug!("{} {} -> {} in {:?}", method, request.path(), status, start.elapsed());

        if !status.is_success() {
            return Err(ToolError::upstream(status.as_u16(), &body));
        }
        parse_body(&body)
    }

    fn url_for(&self, request: &ApiRequest) -> Result<Url, ToolError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ToolError::Configuration(format!("base_url '{}' cannot be a base", self.base_url)))?
            .pop_if_empty()
            .extend(&request.segments);
        Ok(url)
    }
}

fn parse_url(field: &str, raw: &str) -> Result<Url, ToolError> {
    Url::parse(raw.trim()).map_err(|e| ToolError::Configuration(format!("{} '{}' is not a valid URL: {}", field, raw, e)))
}

fn parse_body(body: &str) -> Result<Value, ToolError> {
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(body).map_err(|e| ToolError::contract("body", format!("response is not valid JSON: {}", e)))
}
