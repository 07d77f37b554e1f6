//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Normalize and parse backend URLs
//! - Require TLS material before the listener is considered
//! - Validate value ranges (intervals and timeouts > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: BalancerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use url::Url;

use crate::config::schema::BalancerConfig;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("no backends configured; set BACKENDS to a comma-separated list of URLs")]
    NoBackends,

    #[error("backend {url:?} is not a valid URL: {reason}")]
    InvalidBackend { url: String, reason: String },

    #[error("TLS certificate path is required (TLS_CERT)")]
    MissingTlsCert,

    #[error("TLS private key path is required (TLS_KEY)")]
    MissingTlsKey,

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("metrics address {0:?} is not a socket address (METRICS_ADDR)")]
    InvalidMetricsAddress(String),
}

/// Prefix `http://` when a backend entry carries no scheme.
pub fn normalize_backend(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    }
}

/// Parse one backend entry into its base URL.
pub fn parse_backend_url(raw: &str) -> Result<Url, ValidationError> {
    let normalized = normalize_backend(raw);
    let invalid = |reason: String| ValidationError::InvalidBackend {
        url: raw.to_string(),
        reason,
    };

    let url = Url::parse(&normalized).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme {}", url.scheme())));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(invalid("missing host".to_string()));
    }
    Ok(url)
}

/// Parse every configured backend, failing on the first bad entry.
pub fn backend_urls(config: &BalancerConfig) -> Result<Vec<Url>, ValidationError> {
    if config.backends.is_empty() {
        return Err(ValidationError::NoBackends);
    }
    config.backends.iter().map(|b| parse_backend_url(b)).collect()
}

/// Check a fully merged configuration.
pub fn validate_config(config: &BalancerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.backends.is_empty() {
        errors.push(ValidationError::NoBackends);
    }
    for backend in &config.backends {
        if let Err(e) = parse_backend_url(backend) {
            errors.push(e);
        }
    }

    let tls = &config.listener.tls;
    if tls.cert_path.as_deref().map_or(true, str::is_empty) {
        errors.push(ValidationError::MissingTlsCert);
    }
    if tls.key_path.as_deref().map_or(true, str::is_empty) {
        errors.push(ValidationError::MissingTlsKey);
    }

    if let Some(addr) = &config.observability.metrics_address {
        if addr.trim().parse::<SocketAddr>().is_err() {
            errors.push(ValidationError::InvalidMetricsAddress(addr.clone()));
        }
    }

    let durations = [
        ("health_check.interval_secs", config.health_check.interval_secs),
        ("health_check.timeout_secs", config.health_check.timeout_secs),
        ("timeouts.response_header_secs", config.timeouts.response_header_secs),
        ("timeouts.upstream_read_secs", config.timeouts.upstream_read_secs),
        ("timeouts.header_read_secs", config.timeouts.header_read_secs),
        ("timeouts.request_secs", config.timeouts.request_secs),
        ("timeouts.shutdown_grace_secs", config.timeouts.shutdown_grace_secs),
    ];
    for (field, value) in durations {
        if value == 0 {
            errors.push(ValidationError::Zero(field));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
