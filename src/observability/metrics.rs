use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry};
use tracing::info;
use std::sync::Arc;
use tokio::sync::OnceCell;


// Declare the static OnceCell to hold the Metrics.
static METRICS_INSTANCE: OnceCell<Arc<Metrics>> = OnceCell::const_new();

/// Asynchronously initializes and gets a reference to the static `Metrics`.
pub async fn get_metrics() -> &'static Arc<Metrics> {
    METRICS_INSTANCE.get_or_init(|| async {
        info!("Initializing Metrics ...");
        Metrics::new()}
    ).await
}

// Metric names and labels below are static; construction only fails on programmer error.
const DEFINITION: &str = "static metric definition";


#[derive(Clone)]
pub struct Metrics {
    pub registry: Registry,

    // Upstream API metrics
    pub api_requests: IntCounterVec,
    pub api_request_duration: HistogramVec,

    // Token metrics
    pub token_fetches: IntCounterVec,
    pub token_refresh_on_unauthorized: IntCounter,
    pub token_expiry_unix: IntGauge,

    // Tool metrics
    pub tool_invocations: IntCounterVec,
    pub tool_duration: HistogramVec,

    // Config/runtime
    pub config_validation_errors: IntCounter,
    pub up: IntGauge,
}

impl Metrics {
    fn new() -> Arc<Self> {
        let registry = Registry::new_custom(Some("paymentsagent".into()), None).expect(DEFINITION);

        let metrics: Arc<Metrics> = Arc::new(Self {
            // Upstream
            api_requests: IntCounterVec::new(Opts::new("api_requests_total", "Upstream API calls by method and status"),&["method", "status"],).expect(DEFINITION),
            api_request_duration: HistogramVec::new(HistogramOpts::new("api_request_duration_seconds", "Upstream API call duration seconds").buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),&["method"],).expect(DEFINITION),

            // Token
            token_fetches: IntCounterVec::new(Opts::new("token_fetches_total", "OAuth token fetches by outcome"),&["outcome"],).expect(DEFINITION),
            token_refresh_on_unauthorized: IntCounter::new("token_refresh_on_unauthorized_total", "Token cache invalidations caused by a 401").expect(DEFINITION),
            token_expiry_unix: IntGauge::new("token_expiry_unix_seconds", "Expiry of the most recently fetched token").expect(DEFINITION),

            // Tools
            tool_invocations: IntCounterVec::new(Opts::new("tool_invocations_total", "Tool invocations by outcome"),&["tool", "outcome"],).expect(DEFINITION),
            tool_duration: HistogramVec::new(HistogramOpts::new("tool_duration_seconds", "Tool invocation duration seconds").buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),&["tool"],).expect(DEFINITION),

            // Config/runtime
            config_validation_errors: IntCounter::new("config_validation_errors_total","Validation errors during startup",).expect(DEFINITION),
            up: IntGauge::new("up", "1 if service is healthy").expect(DEFINITION),

            registry,
        });

        // Register all metrics in the registry
        let reg = &metrics.registry;
        reg.register(Box::new(metrics.api_requests.clone())).expect(DEFINITION);
        reg.register(Box::new(metrics.api_request_duration.clone())).expect(DEFINITION);
        reg.register(Box::new(metrics.token_fetches.clone())).expect(DEFINITION);
        reg.register(Box::new(metrics.token_refresh_on_unauthorized.clone())).expect(DEFINITION);
        reg.register(Box::new(metrics.token_expiry_unix.clone())).expect(DEFINITION);
        reg.register(Box::new(metrics.tool_invocations.clone())).expect(DEFINITION);
        reg.register(Box::new(metrics.tool_duration.clone())).expect(DEFINITION);
        reg.register(Box::new(metrics.config_validation_errors.clone())).expect(DEFINITION);
        reg.register(Box::new(metrics.up.clone())).expect(DEFINITION);

        metrics
    }
}
