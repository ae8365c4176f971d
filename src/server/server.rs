use anyhow::{Context, Result};
use axum::Router;
use tracing::info;

use crate::config::settings::SettingsConfig;
use crate::observability::metrics::{get_metrics, Metrics};
use crate::observability::routes::MetricsState;
use crate::server::tool_routes;
use crate::tools::Toolkit;

#[derive(Clone)]
pub struct AppState {
    pub metrics_state: MetricsState,
    pub toolkit: Toolkit,
}

impl AppState {
    pub fn new(metrics: &Metrics, toolkit: Toolkit) -> Self {
        Self {
            metrics_state: MetricsState::new(metrics.registry.clone()),
            toolkit,
        }
    }
}

/// Tool, MCP and health routes, plus the metrics route when enabled.
pub async fn router(settings_config: &SettingsConfig, toolkit: Toolkit) -> Router {
    let metrics = get_metrics().await;
    let state = AppState::new(metrics, toolkit);

    Router::new()
        .merge(state.metrics_state.router(&settings_config.metrics))
        .merge(tool_routes::router())
        .with_state(state)
}

/// Serves the tool surface until the listener fails.
pub async fn start(settings_config: &SettingsConfig, toolkit: Toolkit) -> Result<()> {
    let metrics = get_metrics().await;
    let app = router(settings_config, toolkit).await;

    let bind_addr = &settings_config.server.host;
    let port = &settings_config.server.port;
    let address = format!("{}:{}", bind_addr, port);
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {}", address))?;
    info!("listening on {}", address);

    metrics.up.set(1);
    let served = axum::serve(listener, app).await.context("server stopped");
    metrics.up.set(0);
    served
}
