//! Configuration validation with aggregated errors.
//! Every problem is collected so one run reports all of them.

use std::collections::HashSet;

use reqwest::Url;
use tracing::{error, info};

use crate::client::credentials::Credentials;
use crate::config::settings::{RateLimitConfig, ServiceConfig, SettingsConfig};
use crate::tools::ToolRegistry;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Public entrypoint: returns Ok(()) or Err(Vec<String>) containing all issues.
pub fn validate_service_config(cfg: &ServiceConfig) -> Result<(), Vec<String>> {
    let mut errors: Vec<String> = Vec::new();

    validate_settings(&cfg.settings, &mut errors);

    if let Err(e) = Credentials::resolve(&cfg.credentials) {
        errors.push(format!("credentials: {}", e));
    }

    let known: HashSet<String> = ToolRegistry::standard().names().map(str::to_owned).collect();
    let mut unknown: Vec<&String> = cfg.tools.keys().filter(|name| !known.contains(*name)).collect();
    unknown.sort();
    for name in unknown {
        errors.push(format!("tools['{}'] is not a known tool", name));
    }

    if errors.is_empty() {
        info!("config valid");
        Ok(())
    } else {
        error!("configuration validation errors ({}):", errors.len());
        for e in &errors {
            error!(" - {}", e);
        }
        Err(errors)
    }
}

/// SETTINGS VALIDATION
fn validate_settings(settings: &SettingsConfig, errors: &mut Vec<String>) {
    if let Some(base_url) = &settings.base_url {
        validate_url("settings.base_url", base_url, errors);
    }
    if let Some(auth_url) = &settings.auth_url {
        validate_url("settings.auth_url", auth_url, errors);
    }

    if settings.timeout_ms == 0 {
        errors.push("settings.timeout_ms must be > 0".to_string());
    }

    // skew sane bounds
    if settings.token_skew_seconds > 60 * 60 * 24 {
        errors.push(format!(
            "settings.token_skew_seconds ({}) is unreasonably large",
            settings.token_skew_seconds
        ));
    }

    if let Some(rate_limit) = &settings.rate_limit {
        validate_rate_limit(rate_limit, errors);
    }

    if settings.server.host.is_empty() {
        errors.push(format!(
            "settings.server.host '{}' must be valid",
            settings.server.host
        ));
    }
    if settings.server.port.parse::<u16>().is_err() {
        errors.push(format!(
            "settings.server.port '{}' must be an integer in range 0-65535",
            settings.server.port
        ));
    }

    // metrics endpoint start with '/'
    let metrics = &settings.metrics;
    if !metrics.path.starts_with('/') {
        errors.push(format!(
            "settings.metrics.path '{}' must start with '/'",
            metrics.path
        ));
    }

    // logging level
    if let Some(logging) = &settings.logging {
        if !LOG_LEVELS.contains(&logging.level.to_lowercase().as_str()) {
            errors.push(format!(
                "settings.logging.level '{}' invalid; allowed: {:?}",
                logging.level, LOG_LEVELS
            ));
        }
    }
}

fn validate_url(path: &str, raw: &str, errors: &mut Vec<String>) {
    match Url::parse(raw) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => errors.push(format!("{} '{}' must use http or https, got '{}'", path, raw, url.scheme())),
        Err(e) => errors.push(format!("{} '{}' is not a valid URL: {}", path, raw, e)),
    }
}

fn validate_rate_limit(rate_limit: &RateLimitConfig, errors: &mut Vec<String>) {
    if rate_limit.requests_per_second == 0 {
        errors.push("settings.rate_limit.requests_per_second must be > 0".to_string());
    }
    if let Some(burst) = rate_limit.burst {
        if burst < rate_limit.requests_per_second {
            errors.push(format!(
                "settings.rate_limit.burst ({}) must be >= requests_per_second ({})",
                burst, rate_limit.requests_per_second
            ));
        }
    }
}
