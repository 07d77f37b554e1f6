//! Active health checking.
//!
//! # Responsibilities
//! - Wait out the warm-up delay, then sweep every backend on a fixed interval
//! - Skip backends whose circuit breaker is open
//! - Update backend health state based on results

use std::sync::Arc;
use std::time::Instant;

use reqwest::header::USER_AGENT;
use reqwest::StatusCode;
use tokio::sync::broadcast;
use tokio::time::{self, MissedTickBehavior};

use crate::config::HealthCheckConfig;
use crate::load_balancer::{Backend, BackendPool};
use crate::observability::metrics;

/// Why a single probe counted as a failure.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("timed out")]
    Timeout,

    #[error("returned non-200: {0}")]
    Status(StatusCode),

    #[error("connection error: {0}")]
    Transport(#[source] reqwest::Error),
}

/// What a probe did to one backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// Breaker open; state left untouched.
    Skipped,
    /// Marked alive. `recovered` is set when it had been down.
    Healthy { recovered: bool },
    /// Marked failed.
    Unhealthy,
}

/// Totals from one sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    pub total: usize,
    pub healthy: usize,
    pub skipped: usize,
}

pub struct HealthMonitor {
    pool: Arc<BackendPool>,
    config: HealthCheckConfig,
    client: reqwest::Client,
    debug: bool,
}

impl HealthMonitor {
    /// Build a monitor with its own probe client.
    ///
    /// Backends in the mesh present internally issued certificates, so the
    /// probe client does not verify them.
    pub fn new(
        pool: Arc<BackendPool>,
        config: HealthCheckConfig,
        debug: bool,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .timeout(config.timeout())
            .redirect(reqwest::redirect::Policy::none())
            .no_proxy()
            .build()?;

        Ok(Self {
            pool,
            config,
            client,
            debug,
        })
    }

    /// Probe forever until the shutdown signal arrives.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            warmup_secs = self.config.warmup_secs,
            interval_secs = self.config.interval_secs,
            path = %self.config.path,
            "Health monitor starting"
        );

        let probing = async {
            time::sleep(self.config.warmup()).await;
            tracing::info!("Performing initial health check");

            let mut ticker = time::interval(self.config.interval());
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                self.sweep().await;
            }
        };

        tokio::select! {
            _ = probing => {}
            _ = shutdown.recv() => {
                tracing::info!("Health monitor received shutdown signal, exiting loop");
            }
        }
    }

    /// Probe every backend once, in pool order.
    pub async fn sweep(&self) -> SweepReport {
        let mut skipped = 0;
        for backend in self.pool.all_backends() {
            if self.check_backend(backend).await == ProbeOutcome::Skipped {
                skipped += 1;
            }
        }

        let report = SweepReport {
            total: self.pool.len(),
            healthy: self.pool.eligible_count(),
            skipped,
        };
        tracing::info!(
            healthy = report.healthy,
            total = report.total,
            "Health check completed"
        );

        if self.debug {
            for (index, backend) in self.pool.all_backends().iter().enumerate() {
                let state = backend.snapshot();
                tracing::info!(
                    index,
                    backend = %backend,
                    status = if backend.is_eligible() { "up" } else { "down" },
                    failures = state.failure_count,
                    "Backend state"
                );
            }
        }

        report
    }

    /// Probe one backend and record the result.
    pub async fn check_backend(&self, backend: &Backend) -> ProbeOutcome {
        let before = backend.snapshot();
        if before.in_cooldown(backend.policy(), Instant::now()) {
            tracing::info!(
                backend = %backend,
                failures = before.failure_count,
                "Backend is in circuit breaker state, skipping probe"
            );
            return ProbeOutcome::Skipped;
        }

        let outcome = match self.probe(backend).await {
            Ok(()) => {
                let previous = backend.mark_success();
                let recovered = !previous.alive;
                if recovered {
                    tracing::info!(
                        backend = %backend,
                        down_for = ?previous.last_check.elapsed(),
                        "Backend is back up"
                    );
                }
                ProbeOutcome::Healthy { recovered }
            }
            Err(e) => {
                let state = backend.mark_failure();
                tracing::warn!(
                    backend = %backend,
                    error = %e,
                    failures = state.failure_count,
                    "Health check failed"
                );
                ProbeOutcome::Unhealthy
            }
        };

        metrics::record_backend_health(&backend.to_string(), backend.is_eligible());
        outcome
    }

    async fn probe(&self, backend: &Backend) -> Result<(), ProbeError> {
        let response = self
            .client
            .get(health_url(backend, &self.config.path))
            .header(USER_AGENT, "mesh-balancer-health-check")
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProbeError::Timeout
                } else {
                    ProbeError::Transport(e)
                }
            })?;

        match response.status() {
            StatusCode::OK => Ok(()),
            status => Err(ProbeError::Status(status)),
        }
    }
}

/// `<backend base URL><path>`, without doubling the slash.
pub fn health_url(backend: &Backend, path: &str) -> String {
    format!("{}{}", backend.url().as_str().trim_end_matches('/'), path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resilience::circuit_breaker::CooldownPolicy;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use url::Url;

    /// Answer every connection with the given status line.
    async fn fixed_status_backend(status: &'static str) -> Url {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                tokio::spawn(async move {
                    let mut buf = [0u8; 1024];
                    let _ = socket.read(&mut buf).await;
                    let response = format!(
                        "HTTP/1.1 {}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
                        status
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });
        Url::parse(&format!("http://{}", addr)).unwrap()
    }

    async fn closed_port() -> Url {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        Url::parse(&format!("http://{}", addr)).unwrap()
    }

    fn monitor(urls: Vec<Url>) -> HealthMonitor {
        let pool = Arc::new(BackendPool::new(urls, CooldownPolicy::default()).unwrap());
        HealthMonitor::new(pool, HealthCheckConfig::default(), true).unwrap()
    }

    #[test]
    fn health_url_joins_cleanly() {
        let b = Backend::new(
            Url::parse("http://app1:8080").unwrap(),
            CooldownPolicy::default(),
        );
        assert_eq!(health_url(&b, "/health"), "http://app1:8080/health");
    }

    #[tokio::test]
    async fn sweep_marks_up_and_down() {
        let up = fixed_status_backend("200 OK").await;
        let erroring = fixed_status_backend("500 Internal Server Error").await;
        let dead = closed_port().await;
        let monitor = monitor(vec![up, erroring, dead]);

        let report = monitor.sweep().await;
        assert_eq!(report, SweepReport { total: 3, healthy: 1, skipped: 0 });

        let backends = monitor.pool.all_backends();
        assert!(backends[0].snapshot().alive);
        assert_eq!(backends[1].snapshot().failure_count, 1);
        assert_eq!(backends[2].snapshot().failure_count, 1);
    }

    #[tokio::test]
    async fn non_200_success_codes_count_as_failure() {
        let monitor = monitor(vec![fixed_status_backend("204 No Content").await]);
        let backend = monitor.pool.get(0).unwrap().clone();
        assert_eq!(monitor.check_backend(&backend).await, ProbeOutcome::Unhealthy);
    }

    #[tokio::test]
    async fn recovery_is_reported() {
        let monitor = monitor(vec![fixed_status_backend("200 OK").await]);
        let backend = monitor.pool.get(0).unwrap().clone();
        backend.mark_failure();

        assert_eq!(
            monitor.check_backend(&backend).await,
            ProbeOutcome::Healthy { recovered: true }
        );
        assert_eq!(
            monitor.check_backend(&backend).await,
            ProbeOutcome::Healthy { recovered: false }
        );
    }

    #[tokio::test]
    async fn open_breaker_skips_probe() {
        let monitor = monitor(vec![fixed_status_backend("200 OK").await]);
        let backend = monitor.pool.get(0).unwrap().clone();
        for _ in 0..4 {
            backend.mark_failure();
        }
        let before = backend.snapshot();

        assert_eq!(monitor.check_backend(&backend).await, ProbeOutcome::Skipped);
        assert_eq!(backend.snapshot(), before);
        assert!(!backend.is_eligible());
    }

    #[tokio::test]
    async fn run_exits_on_shutdown() {
        let monitor = monitor(vec![closed_port().await]);
        let (tx, rx) = broadcast::channel(1);
        let task = tokio::spawn(monitor.run(rx));
        tx.send(()).unwrap();
        time::timeout(std::time::Duration::from_secs(1), task)
            .await
            .expect("monitor did not stop")
            .unwrap();
    }
}
