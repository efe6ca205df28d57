use std::env;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use teller_backends::investment;
use teller_connector::HttpConnector;
use teller_core::{
    standard_capabilities, CapabilityRegistry, ChatQuery, KeywordClassifier, RemoteEndpoints,
    INVESTMENT_ADVICE,
};
use teller_observability::{AppMetrics, MetricsSnapshot};
use teller_orchestrator::Orchestrator;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

const DEFAULT_DISPATCH_TIMEOUT_SECS: u64 = 5;

#[derive(Clone)]
pub struct ApiState {
    pub orchestrator: Arc<Orchestrator<HttpConnector>>,
    pub metrics: Arc<AppMetrics>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatRequest {
    query: String,
    session_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
    timestamp_utc: String,
    metrics: MetricsSnapshot,
}

pub fn endpoints_from_env() -> RemoteEndpoints {
    RemoteEndpoints {
        spending: env::var("TELLER_SPENDING_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:8101/v1/summary".to_string()),
        trip: env::var("TELLER_TRIP_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:8102/v1/plan".to_string()),
    }
}

pub fn dispatch_timeout_from_env() -> Duration {
    Duration::from_secs(
        env::var("TELLER_DISPATCH_TIMEOUT_SECS")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .unwrap_or(DEFAULT_DISPATCH_TIMEOUT_SECS),
    )
}

pub fn build_app() -> Result<Router> {
    build_app_with(endpoints_from_env(), dispatch_timeout_from_env())
}

pub fn build_app_with(endpoints: RemoteEndpoints, dispatch_timeout: Duration) -> Result<Router> {
    let metrics = AppMetrics::shared();

    let registry = CapabilityRegistry::from_capabilities(standard_capabilities(endpoints))
        .context("failed to build capability registry")?;

    let connector = HttpConnector::new(dispatch_timeout)
        .context("failed to build backend connector")?
        .with_local_handler(INVESTMENT_ADVICE, Arc::new(investment::handle));
    connector
        .verify_against(&registry)
        .context("capability registry is not fully dispatchable")?;

    let orchestrator = Arc::new(Orchestrator::new(
        Arc::new(registry),
        Arc::new(connector),
        Arc::new(KeywordClassifier),
        metrics.clone(),
    ));

    Ok(build_router(ApiState {
        orchestrator,
        metrics,
    }))
}

pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/chat", post(chat))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(RequestBodyLimitLayer::new(16 * 1024))
        .with_state(state)
}

async fn health(State(state): State<ApiState>) -> impl IntoResponse {
    let payload = HealthResponse {
        status: "ok",
        service: "teller-orchestrator",
        timestamp_utc: chrono::Utc::now().to_rfc3339(),
        metrics: state.metrics.snapshot(),
    };
    (StatusCode::OK, Json(payload))
}

async fn chat(State(state): State<ApiState>, Json(request): Json<ChatRequest>) -> impl IntoResponse {
    let reply = state
        .orchestrator
        .handle(ChatQuery {
            text: request.query,
            session_id: request.session_id,
        })
        .await;

    (StatusCode::OK, Json(reply))
}
