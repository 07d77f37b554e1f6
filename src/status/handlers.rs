use std::time::Instant;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};

use crate::http::server::AppState;
use crate::load_balancer::BackendPool;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendStatus {
    pub url: String,
    /// Eligibility: the raw alive flag with the cooldown override applied.
    pub alive: bool,
    pub failure_count: u32,
    /// RFC 3339, UTC.
    pub last_check: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    /// `operational` or `degraded`.
    pub status: String,
    pub total_backends: usize,
    pub healthy_backends: usize,
    pub current_index: usize,
    pub backends: Vec<BackendStatus>,
}

impl StatusReport {
    pub fn is_operational(&self) -> bool {
        self.healthy_backends > 0
    }
}

/// Snapshot the pool. Every backend is read once, against a single `now`,
/// so `healthy_backends` always matches the `alive` flags reported.
pub fn build_report(pool: &BackendPool) -> StatusReport {
    let now = Instant::now();
    let backends: Vec<BackendStatus> = pool
        .all_backends()
        .iter()
        .map(|backend| {
            let state = backend.snapshot();
            BackendStatus {
                url: backend.to_string(),
                alive: state.is_eligible(backend.policy(), now),
                failure_count: state.failure_count,
                last_check: state.last_check_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            }
        })
        .collect();

    let healthy_backends = backends.iter().filter(|b| b.alive).count();
    StatusReport {
        status: if healthy_backends > 0 { "operational" } else { "degraded" }.to_string(),
        total_backends: backends.len(),
        healthy_backends,
        current_index: pool.current_index(),
        backends,
    }
}

pub async fn get_health(State(state): State<AppState>) -> Response {
    let healthy = state.pool.eligible_count();
    if healthy == 0 {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            "UNHEALTHY: No healthy backends available",
        )
            .into_response();
    }
    (
        StatusCode::OK,
        format!("HEALTHY: {}/{} backends available", healthy, state.pool.len()),
    )
        .into_response()
}

pub async fn get_status(State(state): State<AppState>) -> Response {
    let report = build_report(&state.pool);
    let status = if report.is_operational() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(report)).into_response()
}
