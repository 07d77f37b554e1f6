//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use crate::config::schema::BalancerConfig;
use crate::config::validation::{normalize_backend, validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid {key}={value:?}: {reason}")]
    Env {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration from a TOML file without validating it.
pub fn load_config(path: &Path) -> Result<BalancerConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(toml::from_str(&content)?)
}

/// Build and validate the configuration from the process environment.
pub fn from_env() -> Result<BalancerConfig, ConfigError> {
    from_lookup(|key| std::env::var(key).ok())
}

/// Build and validate the configuration from an arbitrary variable source.
///
/// `LB_CONFIG` names an optional TOML base layer; `BACKENDS`, `PORT`,
/// `TLS_CERT`, `TLS_KEY`, `DEBUG` and `METRICS_ADDR` override it.
pub fn from_lookup<F>(lookup: F) -> Result<BalancerConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    let mut config = match var("LB_CONFIG") {
        Some(path) => {
            tracing::info!(path = %path, "Loading configuration file");
            load_config(Path::new(&path))?
        }
        None => BalancerConfig::default(),
    };

    match var("BACKENDS") {
        Some(list) => {
            tracing::info!(backends = %list, "Parsing backends from environment");
            config.backends = split_backend_list(&list);
        }
        None => tracing::info!(backends = ?config.backends, "Using configured backends"),
    }

    if let Some(port) = var("PORT") {
        config.listener.port = port.trim().parse().map_err(|e: std::num::ParseIntError| {
            ConfigError::Env {
                key: "PORT",
                value: port.clone(),
                reason: e.to_string(),
            }
        })?;
    }

    if let Some(cert) = var("TLS_CERT") {
        config.listener.tls.cert_path = Some(cert);
    }
    if let Some(key) = var("TLS_KEY") {
        config.listener.tls.key_path = Some(key);
    }
    if let Some(debug) = var("DEBUG") {
        config.observability.debug = parse_flag(&debug);
    }
    if let Some(addr) = var("METRICS_ADDR") {
        config.observability.metrics_address = Some(addr);
    }

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Split a comma-separated backend list, dropping blanks and defaulting the scheme.
pub fn split_backend_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let normalized = normalize_backend(entry);
            if normalized != entry {
                tracing::info!(backend = %normalized, "Added http:// prefix to backend");
            }
            normalized
        })
        .collect()
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const TLS: [(&str, &str); 2] = [("TLS_CERT", "/certs/lb.crt"), ("TLS_KEY", "/certs/lb.key")];

    #[test]
    fn backend_list_is_trimmed_and_prefixed() {
        assert_eq!(
            split_backend_list(" app1:8080 ,, https://app2:8443,"),
            vec!["http://app1:8080".to_string(), "https://app2:8443".to_string()]
        );
    }

    #[test]
    fn env_overrides_defaults() {
        let mut vars = TLS.to_vec();
        vars.extend([("BACKENDS", "a:1,b:2"), ("PORT", "8443"), ("DEBUG", "true")]);

        let config = from_lookup(lookup(&vars)).unwrap();
        assert_eq!(config.backends, vec!["http://a:1", "http://b:2"]);
        assert_eq!(config.listener.port, 8443);
        assert!(config.observability.debug);
        assert_eq!(config.listener.tls.cert_path.as_deref(), Some("/certs/lb.crt"));
    }

    #[test]
    fn defaults_apply_without_backends_var() {
        let config = from_lookup(lookup(&TLS)).unwrap();
        assert_eq!(config.backends.len(), 3);
        assert_eq!(config.listener.port, 443);
        assert!(!config.observability.debug);
    }

    #[test]
    fn missing_tls_is_fatal() {
        let err = from_lookup(lookup(&[("BACKENDS", "a:1")])).unwrap_err();
        match err {
            ConfigError::Validation(errors) => {
                assert!(errors.contains(&ValidationError::MissingTlsCert));
                assert!(errors.contains(&ValidationError::MissingTlsKey));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn blank_entries_only_is_fatal() {
        let mut vars = TLS.to_vec();
        vars.push(("BACKENDS", " , ,"));
        assert!(matches!(
            from_lookup(lookup(&vars)),
            Err(ConfigError::Validation(errors)) if errors == vec![ValidationError::NoBackends]
        ));
    }

    #[test]
    fn debug_flag_values() {
        for value in ["true", "TRUE", " 1 ", "yes"] {
            assert!(parse_flag(value), "{value}");
        }
        for value in ["false", "0", "no", "", "on"] {
            assert!(!parse_flag(value), "{value}");
        }
    }

    #[test]
    fn bad_metrics_address_is_fatal() {
        let mut vars = TLS.to_vec();
        vars.push(("METRICS_ADDR", "not-an-addr"));
        assert!(matches!(
            from_lookup(lookup(&vars)),
            Err(ConfigError::Validation(errors))
                if errors == vec![ValidationError::InvalidMetricsAddress("not-an-addr".into())]
        ));
    }

    #[test]
    fn bad_port_is_rejected() {
        let mut vars = TLS.to_vec();
        vars.push(("PORT", "https"));
        assert!(matches!(
            from_lookup(lookup(&vars)),
            Err(ConfigError::Env { key: "PORT", .. })
        ));
    }

    #[test]
    fn toml_file_is_parsed() {
        let config: BalancerConfig = toml::from_str(
            r#"
            backends = ["http://10.0.0.1:8080"]

            [listener]
            port = 9443

            [health_check]
            interval_secs = 3
            "#,
        )
        .unwrap();
        assert_eq!(config.listener.port, 9443);
        assert_eq!(config.health_check.interval_secs, 3);
        assert_eq!(config.health_check.timeout_secs, 2);
        assert_eq!(config.circuit_breaker.cooldown_secs, 30);
    }
}
