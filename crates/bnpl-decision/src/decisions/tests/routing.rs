use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use super::common::*;
use crate::decisions::source::SourceError;
use crate::decisions::webhook::WebhookQueue;
use crate::decisions::{decision_router, DecisionService, ScoringEngine};

fn router_with(source: MemorySource) -> (Router, Arc<MemoryWebhookStore>) {
    let repository = Arc::new(MemoryRepository::default());
    let service = Arc::new(DecisionService::new(
        Arc::new(source),
        repository,
        ScoringEngine::default(),
    ));
    let store = Arc::new(MemoryWebhookStore::default());
    let webhooks = Arc::new(WebhookQueue::new(
        store.clone(),
        Arc::new(ScriptedTransport::always_ok()),
        "https://ledger.example.com/hooks".to_string(),
    ));
    (decision_router(service, webhooks), store)
}

fn decision_request(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/v1/decision")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request should build")
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    serde_json::from_slice(&bytes).expect("body should be json")
}

#[tokio::test]
async fn decision_endpoint_approves_a_strong_user() {
    let (router, webhook_store) = router_with(MemorySource::with_history(user(), strong_history()));

    let response = router
        .oneshot(decision_request(json!({
            "user_id": "user-123",
            "amount_cents_requested": 45_000,
            "as_of": "2026-08-30",
        })))
        .await
        .expect("request should succeed");

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["approved"], json!(true));
    assert_eq!(body["credit_limit_cents"], json!(60_000));
    assert_eq!(body["amount_granted_cents"], json!(45_000));
    assert!(body["plan_id"].is_string());
    assert_eq!(body["decision_factors"]["risk_score"], json!(100));
    assert_eq!(body["decision_factors"]["nsf_count"], json!(0));

    // The decision fired exactly one outbound notification.
    let records = webhook_store.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].payload["user_id"], json!("user-123"));
}

#[tokio::test]
async fn decision_endpoint_denies_an_unknown_user() {
    let (router, _store) = router_with(MemorySource::default());

    let response = router
        .oneshot(decision_request(json!({
            "user_id": "ghost",
            "amount_cents_requested": 30_000,
            "as_of": "2026-08-30",
        })))
        .await
        .expect("request should succeed");

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["approved"], json!(false));
    assert_eq!(body["credit_limit_cents"], json!(0));
    assert!(body.get("plan_id").is_none());
}

#[tokio::test]
async fn non_positive_amount_is_unprocessable() {
    let (router, store) = router_with(MemorySource::with_history(user(), strong_history()));

    let response = router
        .oneshot(decision_request(json!({
            "user_id": "user-123",
            "amount_cents_requested": 0,
        })))
        .await
        .expect("request should succeed");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    // Rejected before any decision or webhook work happened.
    assert!(store.records().is_empty());
}

#[tokio::test]
async fn upstream_failure_maps_to_bad_gateway() {
    let (router, _store) = router_with(MemorySource::failing(SourceError::Upstream {
        status: 503,
        detail: "maintenance".to_string(),
    }));

    let response = router
        .oneshot(decision_request(json!({
            "user_id": "user-123",
            "amount_cents_requested": 30_000,
        })))
        .await
        .expect("request should succeed");

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn plan_endpoint_returns_the_stored_schedule() {
    let (router, _store) = router_with(MemorySource::with_history(user(), strong_history()));

    let response = router
        .clone()
        .oneshot(decision_request(json!({
            "user_id": "user-123",
            "amount_cents_requested": 40_000,
            "as_of": "2026-08-30",
        })))
        .await
        .expect("request should succeed");
    let decision = json_body(response).await;
    let plan_id = decision["plan_id"]
        .as_str()
        .expect("plan id should be present")
        .to_string();

    let response = router
        .oneshot(
            Request::builder()
                .uri(format!("/v1/plan/{plan_id}"))
                .body(Body::empty())
                .expect("request should build"),
        )
        .await
        .expect("request should succeed");

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["plan_id"], json!(plan_id));
    assert_eq!(body["total_cents"], json!(40_000));
    assert_eq!(body["installments"].as_array().map(Vec::len), Some(4));
    assert_eq!(body["installments"][0]["amount_cents"], json!(10_000));
    assert_eq!(body["installments"][0]["status"], json!("scheduled"));
}

#[tokio::test]
async fn missing_plan_is_not_found() {
    let (router, _store) = router_with(MemorySource::default());

    let response = router
        .oneshot(
            Request::builder()
                .uri("/v1/plan/plan-999999")
                .body(Body::empty())
                .expect("request should build"),
        )
        .await
        .expect("request should succeed");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn history_endpoint_lists_decisions_newest_first() {
    let (router, _store) = router_with(MemorySource::with_history(user(), strong_history()));

    for amount in [10_000, 20_000] {
        let response = router
            .clone()
            .oneshot(decision_request(json!({
                "user_id": "user-123",
                "amount_cents_requested": amount,
                "as_of": "2026-08-30",
            })))
            .await
            .expect("request should succeed");
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = router
        .oneshot(
            Request::builder()
                .uri("/v1/decision/history?user_id=user-123")
                .body(Body::empty())
                .expect("request should build"),
        )
        .await
        .expect("request should succeed");

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["user_id"], json!("user-123"));
    let decisions = body["decisions"].as_array().expect("decisions array");
    assert_eq!(decisions.len(), 2);
    assert_eq!(decisions[0]["requested_cents"], json!(20_000));
    assert_eq!(decisions[1]["requested_cents"], json!(10_000));
}
