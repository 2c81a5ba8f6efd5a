//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes for reconciliation, statements and float balances
//! - Bearer token middleware
//! - Domain error → JSON response mapping

pub mod error;
pub mod middleware;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use rekon_core::float::FloatTracker;
use rekon_core::reconciliation::ReconciliationService;
use rekon_core::statement::{IngestOptions, StatementIngestor};
use rekon_core::sync::{SyncCoordinator, SyncOptions};
use rekon_db::PgSettlementGateway;
use rekon_shared::{JwtService, ReconciliationConfig};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Accounting store gateway.
    pub gateway: Arc<PgSettlementGateway>,
    /// JWT service for token validation.
    pub jwt_service: Arc<JwtService>,
    /// Reconciliation engine settings.
    pub reconciliation: Arc<ReconciliationConfig>,
}

impl AppState {
    /// Record workflow service.
    #[must_use]
    pub fn reconciliations(&self) -> ReconciliationService<PgSettlementGateway> {
        ReconciliationService::new(Arc::clone(&self.gateway))
    }

    /// Range refresh coordinator.
    #[must_use]
    pub fn sync(&self) -> SyncCoordinator<PgSettlementGateway> {
        SyncCoordinator::new(
            Arc::clone(&self.gateway),
            SyncOptions::from(self.reconciliation.as_ref()),
        )
    }

    /// Transit balance tracker.
    #[must_use]
    pub fn float(&self) -> FloatTracker<PgSettlementGateway> {
        FloatTracker::new(Arc::clone(&self.gateway))
    }

    /// Statement ingestor configured from settings.
    #[must_use]
    pub fn ingestor(&self) -> StatementIngestor {
        StatementIngestor::new(IngestOptions::from(self.reconciliation.as_ref()))
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes_with_state(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
