use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use teller_api::build_app_with;
use teller_core::RemoteEndpoints;
use tower::ServiceExt;

// TEST-NET-1 addresses: connections fail instead of reaching a real service.
fn offline_endpoints() -> RemoteEndpoints {
    RemoteEndpoints {
        spending: "http://192.0.2.1:9/v1/summary".to_string(),
        trip: "http://192.0.2.1:9/v1/plan".to_string(),
    }
}

fn app() -> Router {
    build_app_with(offline_endpoints(), Duration::from_secs(1)).expect("app should build")
}

async fn chat(app: Router, query: &str) -> Value {
    let request = Request::builder()
        .method("POST")
        .uri("/chat")
        .header("content-type", "application/json")
        .body(Body::from(json!({ "query": query }).to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn health_reports_service_and_metrics() {
    let response = app()
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let parsed: Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(parsed["status"], "ok");
    assert_eq!(parsed["service"], "teller-orchestrator");
    assert!(parsed["metrics"]["requests_total"].is_u64());
}

#[tokio::test]
async fn empty_query_is_rejected_without_dispatch() {
    let parsed = chat(app(), "   ").await;

    assert_eq!(parsed["status"], "error");
    assert_eq!(parsed["error"]["kind"], "invalid_query");
    assert_eq!(parsed["query"], "   ");
}

#[tokio::test]
async fn spending_query_without_user_id_asks_for_it() {
    let parsed = chat(app(), "how much did I spend this month").await;

    assert_eq!(parsed["status"], "needs_input");
    assert_eq!(parsed["capability"], "spending_analysis");
    assert_eq!(parsed["missing_parameters"], json!(["user_id"]));
}

#[tokio::test]
async fn trip_query_lists_every_missing_parameter() {
    let parsed = chat(app(), "plan a vacation").await;

    assert_eq!(parsed["status"], "needs_input");
    assert_eq!(parsed["capability"], "trip_planning");
    let missing: Vec<&str> = parsed["missing_parameters"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(Value::as_str)
        .collect();
    assert_eq!(missing, ["origin", "destination", "days", "budget_inr"]);
}

#[tokio::test]
async fn generic_query_is_answered_directly() {
    let parsed = chat(app(), "hello there").await;

    assert_eq!(parsed["status"], "ok");
    assert!(parsed.get("capability").is_none());
    assert!(parsed["reply_text"].as_str().unwrap().starts_with("Hello"));
}

#[tokio::test]
async fn investment_advice_runs_locally_without_backends() {
    let parsed = chat(app(), "invest 1000 with low risk").await;

    assert_eq!(parsed["status"], "ok");
    assert_eq!(parsed["capability"], "investment_advice");
    assert_eq!(parsed["result"]["allocation"]["FD"], 0.8);
    assert_eq!(parsed["result"]["allocation"]["bonds"], 0.2);
}

#[tokio::test]
async fn unparseable_risk_level_asks_instead_of_guessing() {
    let parsed = chat(app(), "invest 1000 with extreme risk").await;

    // "extreme" is not in the risk vocabulary, so risk stays missing.
    assert_eq!(parsed["status"], "needs_input");
    assert_eq!(parsed["missing_parameters"], json!(["risk"]));
}
