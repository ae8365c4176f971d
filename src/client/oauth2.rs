use reqwest::{Client, Url};
use serde::Serialize;
use tracing::{debug, error};

use crate::cache::FetchedToken;
use crate::client::credentials::Credentials;
use crate::errors::ToolError;
use crate::helpers::time::{get_instant, now_i64};
use crate::observability::metrics::get_metrics;

static OK_MSG: &'static str = "ok";
static ERROR_MSG: &'static str = "error";

#[derive(Serialize)]
struct ClientCredentialsRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
}

/// Client-credentials exchange: `POST auth_url` with `{client_id, client_secret}`.
pub async fn fetch_token(client: &Client, auth_url: &Url, credentials: &Credentials) -> Result<FetchedToken, ToolError> {
    let metrics = get_metrics().await;
    let start = get_instant();
    debug!("fetching access token for client '{}'", credentials.client_id());

    let result = exchange(client, auth_url, credentials).await;
    match &result {
        Ok(token) => {
            metrics.token_fetches.with_label_values(&[OK_MSG]).inc();
            let expires_in = i64::try_from(token.ttl_secs()).unwrap_or(i64::MAX);
            metrics.token_expiry_unix.set(now_i64().saturating_add(expires_in));
            debug!("access token fetched in {:?}", start.elapsed());
        }
        Err(err) => {
            metrics.token_fetches.with_label_values(&[ERROR_MSG]).inc();
            error!("access token request failed: {}", err);
        }
    }
    result
}

async fn exchange(client: &Client, auth_url: &Url, credentials: &Credentials) -> Result<FetchedToken, ToolError> {
    let response = client
        .post(auth_url.clone())
        .json(&ClientCredentialsRequest {
            client_id: credentials.client_id(),
            client_secret: credentials.client_secret(),
        })
        .send()
        .await
        .map_err(ToolError::network)?;

    let status = response.status();
    let body = response.text().await.map_err(ToolError::network)?;
    if !status.is_success() {
        return Err(ToolError::upstream(status.as_u16(), &body));
    }

    serde_json::from_str::<FetchedToken>(&body)
        .map_err(|e| ToolError::contract("access_token", format!("invalid token response: {}", e)))
}
