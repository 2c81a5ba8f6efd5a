//! Rekon API Server
//!
//! Main entry point for the settlement reconciliation service.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rekon_api::{AppState, create_router};
use rekon_db::{PgSettlementGateway, connect};
use rekon_shared::{AppConfig, JwtService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rekon=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let db = connect(&config.database).await?;
    let gateway = PgSettlementGateway::new(
        db,
        Duration::from_secs(config.database.request_timeout_secs),
    );

    info!(
        header_scan_rows = config.reconciliation.header_scan_rows,
        max_sync_days = config.reconciliation.max_sync_days,
        sync_concurrency = config.reconciliation.sync_concurrency,
        "Reconciliation engine configured"
    );

    let state = AppState {
        gateway: Arc::new(gateway),
        jwt_service: Arc::new(JwtService::new(&config.jwt.secret)),
        reconciliation: Arc::new(config.reconciliation.clone()),
    };

    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
