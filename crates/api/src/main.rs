use std::env;

use anyhow::Result;
use teller_api::build_app;
use teller_observability::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("teller_api");

    let bind = env::var("TELLER_BIND").unwrap_or_else(|_| "0.0.0.0:8100".to_string());

    let app = build_app()?;

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    tracing::info!(bind = %bind, "teller orchestrator api started");

    axum::serve(listener, app).await?;
    Ok(())
}
