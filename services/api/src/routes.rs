use std::sync::Arc;

use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use serde_json::json;

use bnpl_decision::decisions::webhook::{WebhookQueue, WebhookStore, WebhookTransport};
use bnpl_decision::decisions::{
    decision_router, DecisionRepository, DecisionService, TransactionSource,
};

use crate::infra::AppState;

/// Decision endpoints plus the operational routes every deployment carries.
pub(crate) fn with_operational_routes<S, R, WS, WT>(
    service: Arc<DecisionService<S, R>>,
    webhooks: Arc<WebhookQueue<WS, WT>>,
) -> axum::Router
where
    S: TransactionSource + 'static,
    R: DecisionRepository + 'static,
    WS: WebhookStore + 'static,
    WT: WebhookTransport + 'static,
{
    decision_router(service, webhooks)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
