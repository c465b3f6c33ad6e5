//! Operational endpoints: liveness, readiness and Prometheus scrape

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::time::Instant;

use crate::AppState;
use yomitomo_common::errors::{AppError, Result};

#[derive(Debug, Serialize)]
pub struct Liveness {
    pub status: &'static str,
    pub version: &'static str,
}

/// Whether the catalogue can be served right now
#[derive(Debug, Serialize)]
pub struct Readiness {
    pub ready: bool,
    pub database: DatabaseProbe,
}

#[derive(Debug, Serialize)]
pub struct DatabaseProbe {
    pub reachable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub async fn health() -> Json<Liveness> {
    Json(Liveness {
        status: "ok",
        version: yomitomo_common::VERSION,
    })
}

/// `503` until the SQLite pool answers
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<Readiness>) {
    let started = Instant::now();

    let database = match state.db.ping().await {
        Ok(()) => DatabaseProbe {
            reachable: true,
            latency_ms: Some(started.elapsed().as_millis() as u64),
            error: None,
        },
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            DatabaseProbe {
                reachable: false,
                latency_ms: None,
                error: Some(e.public_message()),
            }
        }
    };

    let status = if database.reachable {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(Readiness {
            ready: database.reachable,
            database,
        }),
    )
}

/// Prometheus text exposition; `404` when no recorder is installed
pub async fn metrics(State(state): State<AppState>) -> Result<String> {
    state
        .metrics
        .as_ref()
        .map(|handle| handle.render())
        .ok_or_else(|| AppError::not_found("Metrics", "prometheus"))
}
