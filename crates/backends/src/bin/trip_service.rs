use std::env;

use anyhow::Result;
use teller_backends::trip;
use teller_observability::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("trip_service");

    let bind = env::var("TELLER_TRIP_BIND").unwrap_or_else(|_| "0.0.0.0:8102".to_string());
    let listener = tokio::net::TcpListener::bind(&bind).await?;
    tracing::info!(bind = %bind, "trip planning service started");

    axum::serve(listener, trip::router()).await?;
    Ok(())
}
