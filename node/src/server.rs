// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Read-only query service.
//!
//! Every request replays the ledger from the start; there is no cached
//! state to invalidate.

use crate::api::*;
use crate::errors::EngineError;
use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use vaultline_kernel::config::MAX_TAIL_LIMIT;
use vaultline_kernel::event::RawEvent;
use vaultline_kernel::verify::fingerprint_hex;
use vaultline_kernel::view::{CorruptReport, Evaluation, HeaderReport, RansomReport, Summary, Views};
use vaultline_persistence::EventLedger;

#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<EventLedger>,
    pub tail_limit: usize,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/summary", get(summary))
        .route("/api/events", get(events))
        .route("/api/ransom_status", get(ransom_status))
        .route("/api/header_status", get(header_status))
        .route("/api/corrupt_status", get(corrupt_status))
        .route("/api/evaluation", get(evaluation))
        .route("/status", get(status))
        // Observability
        .route("/metrics", get(metrics_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Full replay off the async runtime.
async fn replay_views(state: &AppState) -> Result<(Views, Option<f64>), EngineError> {
    let ledger = state.ledger.clone();
    tokio::task::spawn_blocking(move || -> Result<_, EngineError> {
        let mut replayer = vaultline_kernel::Replayer::default();
        let mut last_ts = None;
        for ev in ledger.read_all()? {
            last_ts = Some(ev.ts);
            replayer.apply(&ev);
        }
        Ok((replayer.finish(), last_ts))
    })
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "replay task failed");
        EngineError::Internal
    })?
}

async fn summary(State(state): State<AppState>) -> Result<Json<Summary>, EngineError> {
    let (views, _) = replay_views(&state).await?;
    Ok(Json(views.summary()))
}

async fn events(
    State(state): State<AppState>,
    Query(q): Query<EventsQuery>,
) -> Result<Json<Vec<RawEvent>>, EngineError> {
    let limit = q.limit.unwrap_or(state.tail_limit).min(MAX_TAIL_LIMIT);
    let ledger = state.ledger.clone();
    let tail = tokio::task::spawn_blocking(move || ledger.tail(limit))
        .await
        .map_err(|_| EngineError::Internal)??;
    Ok(Json(tail))
}

async fn ransom_status(State(state): State<AppState>) -> Result<Json<RansomReport>, EngineError> {
    let (views, _) = replay_views(&state).await?;
    Ok(Json(views.ransom()))
}

async fn header_status(State(state): State<AppState>) -> Result<Json<HeaderReport>, EngineError> {
    let (views, _) = replay_views(&state).await?;
    Ok(Json(views.header()))
}

async fn corrupt_status(State(state): State<AppState>) -> Result<Json<CorruptReport>, EngineError> {
    let (views, _) = replay_views(&state).await?;
    Ok(Json(views.corrupt()))
}

async fn evaluation(State(state): State<AppState>) -> Result<Json<Evaluation>, EngineError> {
    let (views, _) = replay_views(&state).await?;
    Ok(Json(views.evaluation()))
}

async fn status(State(state): State<AppState>) -> Result<Json<StatusResponse>, EngineError> {
    let (views, last_event_ts) = replay_views(&state).await?;
    Ok(Json(StatusResponse {
        status: "ok".to_string(),
        ledger: state.ledger.path().display().to_string(),
        events: views.applied(),
        last_event_ts,
        fingerprint: fingerprint_hex(&views),
    }))
}

async fn metrics_handler() -> String {
    crate::telemetry::get_metrics()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tempfile::tempdir;
    use tower::ServiceExt;

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let resp = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_events_limit() {
        let dir = tempdir().unwrap();
        let ledger = Arc::new(EventLedger::open(dir.path().join("e.jsonl")).unwrap());
        for i in 0..5 {
            ledger.append_json("tick", json!({"i": i})).unwrap();
        }
        let app = build_router(AppState { ledger, tail_limit: 3 });

        let (status, body) = get_json(app.clone(), "/api/events").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 3);
        assert_eq!(body[2]["data"]["i"], 4);

        let (_, body) = get_json(app, "/api/events?limit=1").await;
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["event"], "tick");
    }

    #[tokio::test]
    async fn test_events_huge_limit_is_clamped() {
        let dir = tempdir().unwrap();
        let ledger = Arc::new(EventLedger::open(dir.path().join("e.jsonl")).unwrap());
        for i in 0..3 {
            ledger.append_json("tick", json!({"i": i})).unwrap();
        }
        let app = build_router(AppState { ledger, tail_limit: 200 });

        let (status, body) = get_json(app.clone(), "/api/events?limit=1000000000000").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 3);

        let uri = format!("/api/events?limit={}", usize::MAX);
        let (status, body) = get_json(app, &uri).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["data"]["i"], 0);
    }

    #[tokio::test]
    async fn test_empty_ledger_status() {
        let dir = tempdir().unwrap();
        let ledger = Arc::new(EventLedger::open(dir.path().join("e.jsonl")).unwrap());
        let app = build_router(AppState { ledger, tail_limit: 200 });

        let (status, body) = get_json(app.clone(), "/status").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["events"], 0);
        assert_eq!(body["last_event_ts"], Value::Null);

        let (_, ransom) = get_json(app, "/api/ransom_status").await;
        assert_eq!(ransom["status"], "Idle");
        assert_eq!(ransom["running"], false);
    }
}
