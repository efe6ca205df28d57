use std::env;

use anyhow::Result;
use teller_backends::spending;
use teller_observability::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("spending_service");

    let bind = env::var("TELLER_SPENDING_BIND").unwrap_or_else(|_| "0.0.0.0:8101".to_string());
    let listener = tokio::net::TcpListener::bind(&bind).await?;
    tracing::info!(bind = %bind, "spending analysis service started");

    axum::serve(listener, spending::router()).await?;
    Ok(())
}
