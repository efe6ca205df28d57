use std::net::SocketAddr;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use teller_api::build_app_with;
use teller_backends::{spending, trip};
use teller_core::RemoteEndpoints;
use tower::ServiceExt;

async fn serve(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

async fn never_answers(Json(_request): Json<Value>) -> Json<Value> {
    tokio::time::sleep(Duration::from_secs(30)).await;
    Json(json!({}))
}

async fn not_json(Json(_request): Json<Value>) -> &'static str {
    "pong"
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
async fn live_backends_round_trip() {
    let spending_addr = serve(spending::router()).await;
    let trip_addr = serve(trip::router()).await;

    let app = build_app_with(
        RemoteEndpoints {
            spending: format!("http://{spending_addr}/v1/summary"),
            trip: format!("http://{trip_addr}/v1/plan"),
        },
        Duration::from_secs(2),
    )
    .unwrap();

    let summary = chat(app.clone(), "spending analysis for user_123").await;
    assert_eq!(summary["status"], "ok");
    assert_eq!(summary["result"]["total_spent"], 10500);
    assert_eq!(summary["result"]["top_category"], "Shopping");
    assert_eq!(summary["result"]["transaction_count"], 5);

    let plan = chat(
        app,
        "plan a trip from Bangalore to Goa for 3 days budget 50000",
    )
    .await;
    assert_eq!(plan["status"], "ok");
    assert_eq!(plan["result"]["daily_plan"].as_array().unwrap().len(), 3);
    assert_eq!(plan["result"]["budget_breakdown"]["hotel"], 20000);
    assert_eq!(plan["result"]["total_budget"], 50000);
}

#[tokio::test]
async fn unknown_user_round_trips_as_empty_summary() {
    let spending_addr = serve(spending::router()).await;

    let app = build_app_with(
        RemoteEndpoints {
            spending: format!("http://{spending_addr}/v1/summary"),
            trip: "http://192.0.2.1:9/v1/plan".to_string(),
        },
        Duration::from_secs(2),
    )
    .unwrap();

    let summary = chat(app, "spending analysis for user_999").await;

    assert_eq!(summary["status"], "ok");
    assert_eq!(summary["result"]["total_spent"], 0);
    assert_eq!(summary["result"]["by_category"], json!({}));
}

#[tokio::test]
async fn slow_backend_times_out_without_stalling_other_capabilities() {
    let spending_addr = serve(spending::router()).await;
    let hung_trip = serve(Router::new().route("/v1/plan", post(never_answers))).await;

    let app = build_app_with(
        RemoteEndpoints {
            spending: format!("http://{spending_addr}/v1/summary"),
            trip: format!("http://{hung_trip}/v1/plan"),
        },
        Duration::from_secs(1),
    )
    .unwrap();

    let (trip_reply, spending_reply) = tokio::join!(
        chat(
            app.clone(),
            "plan a trip from Bangalore to Goa for 3 days budget 50000"
        ),
        chat(app, "spending analysis for user_123")
    );

    assert_eq!(trip_reply["status"], "error");
    assert_eq!(trip_reply["error"]["kind"], "unavailable");
    assert_eq!(
        trip_reply["query"],
        "plan a trip from Bangalore to Goa for 3 days budget 50000"
    );

    assert_eq!(spending_reply["status"], "ok");
    assert_eq!(spending_reply["result"]["total_spent"], 10500);
}

#[tokio::test]
async fn malformed_backend_response_is_unavailable() {
    let bad_trip = serve(Router::new().route("/v1/plan", post(not_json))).await;

    let app = build_app_with(
        RemoteEndpoints {
            spending: "http://192.0.2.1:9/v1/summary".to_string(),
            trip: format!("http://{bad_trip}/v1/plan"),
        },
        Duration::from_secs(2),
    )
    .unwrap();

    let reply = chat(
        app,
        "plan a trip from Bangalore to Goa for 3 days budget 50000",
    )
    .await;

    assert_eq!(reply["status"], "error");
    assert_eq!(reply["error"]["kind"], "unavailable");
    assert!(!reply["reply_text"].as_str().unwrap().contains("json"));
}

#[tokio::test]
async fn identical_queries_get_identical_replies() {
    let spending_addr = serve(spending::router()).await;

    let app = build_app_with(
        RemoteEndpoints {
            spending: format!("http://{spending_addr}/v1/summary"),
            trip: "http://192.0.2.1:9/v1/plan".to_string(),
        },
        Duration::from_secs(2),
    )
    .unwrap();

    let first = chat(app.clone(), "spending analysis for user_456").await;
    let second = chat(app, "spending analysis for user_456").await;

    assert_eq!(first, second);
}

#[tokio::test]
async fn backend_services_report_health() {
    for (router, service) in [
        (spending::router(), "spending-analysis"),
        (trip::router(), "trip-planning"),
    ] {
        let response = router
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let parsed: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(parsed["status"], "ok");
        assert_eq!(parsed["service"], service);
    }
}
