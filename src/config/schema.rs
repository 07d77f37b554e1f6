//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the balancer.
//! All types derive Serde traits so a TOML file can provide any subset of
//! fields; everything else falls back to the documented defaults.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Backends used when neither the config file nor `BACKENDS` names any.
pub const DEFAULT_BACKENDS: [&str; 3] = [
    "http://app1:8080",
    "http://app2:8080",
    "http://app3:8080",
];

/// Root configuration for the load balancer.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BalancerConfig {
    /// Listener configuration (port, TLS material).
    pub listener: ListenerConfig,

    /// Backend base URLs, in rotation order.
    pub backends: Vec<String>,

    /// Active health probing.
    pub health_check: HealthCheckConfig,

    /// Failure threshold and cooldown window.
    pub circuit_breaker: CircuitBreakerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Request hardening.
    pub security: SecurityConfig,
}

impl Default for BalancerConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            backends: DEFAULT_BACKENDS.iter().map(|b| b.to_string()).collect(),
            health_check: HealthCheckConfig::default(),
            circuit_breaker: CircuitBreakerConfig::default(),
            timeouts: TimeoutConfig::default(),
            observability: ObservabilityConfig::default(),
            security: SecurityConfig::default(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Interface to bind.
    pub host: String,

    /// TCP port.
    pub port: u16,

    /// TLS material. The listener refuses to start without it.
    pub tls: TlsConfig,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 443,
            tls: TlsConfig::default(),
        }
    }
}

/// TLS configuration for the listener.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct TlsConfig {
    /// Path to certificate chain file (PEM).
    pub cert_path: Option<String>,

    /// Path to private key file (PEM).
    pub key_path: Option<String>,
}

/// Health check configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HealthCheckConfig {
    /// Seconds between probe sweeps.
    pub interval_secs: u64,

    /// Delay before the first sweep after startup.
    pub warmup_secs: u64,

    /// Per-probe timeout in seconds.
    pub timeout_secs: u64,

    /// Path probed on every backend.
    pub path: String,
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            interval_secs: 10,
            warmup_secs: 5,
            timeout_secs: 2,
            path: "/health".to_string(),
        }
    }
}

impl HealthCheckConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn warmup(&self) -> Duration {
        Duration::from_secs(self.warmup_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Circuit breaker configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CircuitBreakerConfig {
    /// The breaker opens once the failure count exceeds this value.
    pub failure_threshold: u32,

    /// How long an open breaker excludes the backend, in seconds.
    pub cooldown_secs: u64,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 3,
            cooldown_secs: 30,
        }
    }
}

impl CircuitBreakerConfig {
    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }
}

/// Timeout configuration for forwarding and the server.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Upstream connect timeout in seconds.
    pub connect_secs: u64,

    /// Time allowed for an upstream to send response headers.
    pub response_header_secs: u64,

    /// Longest silence tolerated while reading an upstream response body.
    pub upstream_read_secs: u64,

    /// Time allowed for a client to send request headers.
    pub header_read_secs: u64,

    /// Idle upstream connections are closed after this many seconds.
    pub idle_pool_secs: u64,

    /// Idle connections kept per backend.
    pub max_idle_per_host: usize,

    /// Bound on handling one inbound request, in seconds.
    pub request_secs: u64,

    /// Grace period for in-flight requests on shutdown.
    pub shutdown_grace_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 2,
            response_header_secs: 2,
            upstream_read_secs: 10,
            header_read_secs: 10,
            idle_pool_secs: 2,
            max_idle_per_host: 100,
            request_secs: 10,
            shutdown_grace_secs: 30,
        }
    }
}

impl TimeoutConfig {
    pub fn connect(&self) -> Duration {
        Duration::from_secs(self.connect_secs)
    }

    pub fn response_header(&self) -> Duration {
        Duration::from_secs(self.response_header_secs)
    }

    pub fn upstream_read(&self) -> Duration {
        Duration::from_secs(self.upstream_read_secs)
    }

    pub fn header_read(&self) -> Duration {
        Duration::from_secs(self.header_read_secs)
    }

    pub fn idle_pool(&self) -> Duration {
        Duration::from_secs(self.idle_pool_secs)
    }

    pub fn request(&self) -> Duration {
        Duration::from_secs(self.request_secs)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Verbose logging, including a per-backend report on every sweep.
    pub debug: bool,

    /// Prometheus exporter bind address. Metrics are off when unset.
    pub metrics_address: Option<String>,
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum buffered request body in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}
