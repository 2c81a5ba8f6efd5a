//! Database layer with `SeaORM` entities and the accounting store gateway.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - [`PgSettlementGateway`], the PostgreSQL implementation of the core
//!   capability traits
//! - Database migrations

pub mod entities;
pub mod gateway;
pub mod migration;

pub use gateway::PgSettlementGateway;

use std::time::Duration;

use rekon_shared::config::DatabaseConfig;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

/// Establishes a pooled connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(config.request_timeout_secs))
        .sqlx_logging(false);

    let db = Database::connect(options).await?;
    tracing::info!(
        max_connections = config.max_connections,
        "Connected to accounting store"
    );
    Ok(db)
}
