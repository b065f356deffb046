use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;

use super::repository::{DecisionHistoryItem, DecisionRepository, PlanId, RepositoryError};
use super::service::{Decision, DecisionService, DecisionServiceError};
use super::source::{SourceError, TransactionSource};
use super::webhook::{WebhookQueue, WebhookStore, WebhookTransport};
use super::UserId;

/// Request body for `POST /v1/decision`.
#[derive(Debug, Deserialize)]
pub struct DecisionRequestBody {
    pub user_id: String,
    pub amount_cents_requested: i64,
    /// Decision date override, mainly for reproducible tests.
    #[serde(default)]
    pub as_of: Option<NaiveDate>,
}

/// Factors surfaced alongside a decision response.
#[derive(Debug, Serialize)]
pub struct DecisionFactorsBody {
    pub avg_daily_balance: f64,
    pub income_ratio: f64,
    pub nsf_count: u32,
    pub risk_score: i64,
}

/// Response body for `POST /v1/decision`.
#[derive(Debug, Serialize)]
pub struct DecisionResponseBody {
    pub approved: bool,
    pub credit_limit_cents: i64,
    pub amount_granted_cents: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan_id: Option<String>,
    pub decision_factors: DecisionFactorsBody,
}

impl DecisionResponseBody {
    fn from_decision(decision: &Decision) -> Self {
        Self {
            approved: decision.approved,
            credit_limit_cents: decision.credit_limit_cents,
            amount_granted_cents: decision.amount_granted_cents,
            plan_id: decision.plan_id.as_ref().map(|id| id.0.clone()),
            decision_factors: DecisionFactorsBody {
                avg_daily_balance: decision.score.factors.avg_daily_balance_dollars(),
                income_ratio: decision.score.factors.income_ratio_reported(),
                nsf_count: decision.score.factors.nsf_count,
                risk_score: decision.score.total,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    pub user_id: String,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponseBody {
    pub user_id: String,
    pub decisions: Vec<DecisionHistoryItem>,
}

/// Shared state for the decision routes.
pub struct DecisionRoutes<S, R, WS, WT> {
    service: Arc<DecisionService<S, R>>,
    webhooks: Arc<WebhookQueue<WS, WT>>,
}

impl<S, R, WS, WT> Clone for DecisionRoutes<S, R, WS, WT> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            webhooks: self.webhooks.clone(),
        }
    }
}

/// Router builder exposing the decision, plan, and history endpoints.
pub fn decision_router<S, R, WS, WT>(
    service: Arc<DecisionService<S, R>>,
    webhooks: Arc<WebhookQueue<WS, WT>>,
) -> Router
where
    S: TransactionSource + 'static,
    R: DecisionRepository + 'static,
    WS: WebhookStore + 'static,
    WT: WebhookTransport + 'static,
{
    Router::new()
        .route("/v1/decision", post(decide_handler::<S, R, WS, WT>))
        .route("/v1/plan/:plan_id", get(plan_handler::<S, R, WS, WT>))
        .route(
            "/v1/decision/history",
            get(history_handler::<S, R, WS, WT>),
        )
        .with_state(DecisionRoutes { service, webhooks })
}

pub(crate) async fn decide_handler<S, R, WS, WT>(
    State(state): State<DecisionRoutes<S, R, WS, WT>>,
    axum::Json(body): axum::Json<DecisionRequestBody>,
) -> Response
where
    S: TransactionSource + 'static,
    R: DecisionRepository + 'static,
    WS: WebhookStore + 'static,
    WT: WebhookTransport + 'static,
{
    if body.amount_cents_requested <= 0 {
        let payload = json!({ "error": "amount_cents_requested must be positive" });
        return (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response();
    }

    // The source and webhook transport may block on I/O, so run the whole
    // pass off the async runtime.
    let outcome = tokio::task::spawn_blocking(move || {
        let user_id = UserId(body.user_id.clone());
        let now = body.as_of.unwrap_or_else(|| Local::now().date_naive());
        let decision = state
            .service
            .decide(&user_id, body.amount_cents_requested, now)?;

        let delivered = state.webhooks.enqueue(
            "decision.created",
            json!({
                "event": "decision.created",
                "user_id": user_id.0,
                "approved": decision.approved,
                "credit_limit_cents": decision.credit_limit_cents,
                "amount_granted_cents": decision.amount_granted_cents,
                "plan_id": decision.plan_id.as_ref().map(|id| id.0.clone()),
            }),
        );
        if !delivered {
            warn!(user_id = %user_id.0, "decision webhook not delivered on first attempt");
        }

        Ok::<Decision, DecisionServiceError>(decision)
    })
    .await;

    match outcome {
        Ok(Ok(decision)) => (
            StatusCode::OK,
            axum::Json(DecisionResponseBody::from_decision(&decision)),
        )
            .into_response(),
        Ok(Err(DecisionServiceError::InvalidRequest(amount))) => {
            let payload = json!({ "error": format!("invalid requested amount: {amount}") });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        Ok(Err(DecisionServiceError::Source(SourceError::Upstream { status, detail }))) => {
            let payload = json!({ "error": format!("bank api error {status}: {detail}") });
            (StatusCode::BAD_GATEWAY, axum::Json(payload)).into_response()
        }
        Ok(Err(DecisionServiceError::Source(SourceError::Transport(detail)))) => {
            let payload = json!({ "error": format!("bank api unreachable: {detail}") });
            (StatusCode::BAD_GATEWAY, axum::Json(payload)).into_response()
        }
        Ok(Err(other)) => {
            let payload = json!({ "error": other.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
        Err(join_error) => {
            let payload = json!({ "error": format!("decision task failed: {join_error}") });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn plan_handler<S, R, WS, WT>(
    State(state): State<DecisionRoutes<S, R, WS, WT>>,
    Path(plan_id): Path<String>,
) -> Response
where
    S: TransactionSource + 'static,
    R: DecisionRepository + 'static,
    WS: WebhookStore + 'static,
    WT: WebhookTransport + 'static,
{
    let id = PlanId(plan_id);
    match state.service.plan(&id) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(DecisionServiceError::Repository(RepositoryError::NotFound)) => {
            let payload = json!({ "error": "plan not found" });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({ "error": other.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn history_handler<S, R, WS, WT>(
    State(state): State<DecisionRoutes<S, R, WS, WT>>,
    Query(params): Query<HistoryParams>,
) -> Response
where
    S: TransactionSource + 'static,
    R: DecisionRepository + 'static,
    WS: WebhookStore + 'static,
    WT: WebhookTransport + 'static,
{
    let user_id = UserId(params.user_id.clone());
    match state.service.history(&user_id) {
        Ok(decisions) => (
            StatusCode::OK,
            axum::Json(HistoryResponseBody {
                user_id: params.user_id,
                decisions,
            }),
        )
            .into_response(),
        Err(other) => {
            let payload = json!({ "error": other.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
