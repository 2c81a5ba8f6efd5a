//! Reconciliation view and record workflow routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, patch, post},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;

use rekon_core::gateway::RecordQuery;
use rekon_core::reconciliation::{PaymentMethod, ReconciliationRecord};
use rekon_core::sync::ReconciliationView;
use rekon_shared::types::{BankAccountId, BranchId, RecordId};

use crate::error::ApiError;
use crate::{AppState, middleware::AuthUser};

/// Creates the reconciliation routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/branches/{branch_id}/reconciliations",
            get(list_reconciliations),
        )
        .route(
            "/reconciliations/{id}/actual-amount",
            patch(edit_actual_amount),
        )
        .route("/reconciliations/{id}/approve", post(approve))
        .route("/reconciliations/{id}/reject", post(reject))
        .route("/reconciliations/{id}/investigate", post(investigate))
        .route("/reconciliations/{id}/resolve", post(resolve))
}

// ============================================================================
// Request Types
// ============================================================================

/// Query for the reconciliation view.
#[derive(Debug, Deserialize)]
pub struct ViewQuery {
    /// First day, inclusive.
    pub from: NaiveDate,
    /// Last day, inclusive.
    pub to: NaiveDate,
    /// Restrict to one payment method.
    #[serde(default)]
    pub method: Option<String>,
    /// Recompute system totals before listing.
    #[serde(default = "default_refresh")]
    pub refresh: bool,
}

fn default_refresh() -> bool {
    true
}

/// Body for an actual-amount edit.
#[derive(Debug, Deserialize)]
pub struct EditActualRequest {
    /// New deposited amount.
    pub actual_amount: Decimal,
}

/// Body for an approval.
#[derive(Debug, Deserialize)]
pub struct ApproveRequest {
    /// Head-office account receiving the deposit.
    #[serde(default)]
    pub bank_account_id: Option<BankAccountId>,
}

/// Body for a rejection.
#[derive(Debug, Deserialize)]
pub struct RejectRequest {
    /// Why the deposit does not belong to this record.
    #[serde(default)]
    pub reason: String,
}

/// Body for a resolution.
#[derive(Debug, Deserialize)]
pub struct ResolveRequest {
    /// How the discrepancy was closed.
    #[serde(default)]
    pub note: String,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/branches/{branch_id}/reconciliations`
async fn list_reconciliations(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(branch_id): Path<BranchId>,
    Query(params): Query<ViewQuery>,
) -> Result<Json<ReconciliationView>, ApiError> {
    let payment_method = params
        .method
        .as_deref()
        .map(PaymentMethod::new)
        .filter(|m| !m.as_str().is_empty());
    let query = RecordQuery {
        business_id: auth.business_id(),
        branch_id,
        from: params.from,
        to: params.to,
        payment_method,
    };

    let coordinator = state.sync();
    let view = if params.refresh {
        coordinator.load_view(&query).await?
    } else {
        coordinator.list_only(&query).await?
    };
    Ok(Json(view))
}

/// PATCH `/reconciliations/{id}/actual-amount`
async fn edit_actual_amount(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<RecordId>,
    Json(body): Json<EditActualRequest>,
) -> Result<Json<ReconciliationRecord>, ApiError> {
    let record = state
        .reconciliations()
        .edit_actual_amount(auth.business_id(), id, body.actual_amount)
        .await?;
    Ok(Json(record))
}

/// POST `/reconciliations/{id}/approve`
async fn approve(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<RecordId>,
    Json(body): Json<ApproveRequest>,
) -> Result<Json<ReconciliationRecord>, ApiError> {
    let record = state
        .reconciliations()
        .approve(auth.business_id(), id, body.bank_account_id, auth.user_id())
        .await?;
    Ok(Json(record))
}

/// POST `/reconciliations/{id}/reject`
async fn reject(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<RecordId>,
    Json(body): Json<RejectRequest>,
) -> Result<Json<ReconciliationRecord>, ApiError> {
    let record = state
        .reconciliations()
        .reject(auth.business_id(), id, &body.reason, auth.user_id())
        .await?;
    Ok(Json(record))
}

/// POST `/reconciliations/{id}/investigate`
async fn investigate(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<RecordId>,
) -> Result<Json<ReconciliationRecord>, ApiError> {
    let record = state
        .reconciliations()
        .investigate(auth.business_id(), id, auth.user_id())
        .await?;
    Ok(Json(record))
}

/// POST `/reconciliations/{id}/resolve`
async fn resolve(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<RecordId>,
    Json(body): Json<ResolveRequest>,
) -> Result<Json<ReconciliationRecord>, ApiError> {
    let record = state
        .reconciliations()
        .resolve(auth.business_id(), id, &body.note)
        .await?;
    Ok(Json(record))
}
