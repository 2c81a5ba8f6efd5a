//! Transit account (float) routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use rust_decimal::Decimal;
use serde::Deserialize;

use rekon_core::float::{SettlementOutcome, TransitAccountBalance};
use rekon_shared::types::TransitAccountId;

use crate::error::ApiError;
use crate::{AppState, middleware::AuthUser};

/// Creates the float balance routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/float-balances", get(list_unsettled))
        .route("/float-balances/{account_id}/settle", post(settle))
}

/// Body for a settlement.
#[derive(Debug, Deserialize)]
pub struct SettleRequest {
    /// Positive to transfer to head office, negative to adjust.
    pub amount: Decimal,
    /// Operator note.
    #[serde(default)]
    pub note: String,
}

/// GET `/float-balances`
async fn list_unsettled(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<TransitAccountBalance>>, ApiError> {
    let balances = state.float().list_unsettled(auth.business_id()).await?;
    Ok(Json(balances))
}

/// POST `/float-balances/{account_id}/settle`
async fn settle(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(account_id): Path<TransitAccountId>,
    Json(body): Json<SettleRequest>,
) -> Result<Json<SettlementOutcome>, ApiError> {
    let outcome = state
        .float()
        .settle(
            auth.business_id(),
            account_id,
            body.amount,
            &body.note,
            auth.user_id(),
        )
        .await?;
    Ok(Json(outcome))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use axum::http::StatusCode;
    use rust_decimal_macros::dec;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};
    use serde_json::json;

    use crate::routes::test_support::{body_json, json_request, offline_state, send, state_with};

    #[tokio::test]
    async fn test_zero_settlement_is_refused_before_store() {
        let request = json_request("POST", "/api/v1/float-balances/11/settle", &json!({ "amount": "0" }));
        let response = send(offline_state(), request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "INVALID_AMOUNT");
    }

    #[tokio::test]
    async fn test_negative_settlement_is_an_adjustment() {
        let remaining = BTreeMap::from([
            ("account_id", Value::from(11i64)),
            ("account_name", Value::from("QRIS Kemang")),
            ("branch_id", Value::from(3i64)),
            ("branch_name", Value::from("Kemang")),
            ("current_balance", Value::from(dec!(1150000))),
            ("last_activity", Value::ChronoDateTimeWithTimeZone(None)),
        ]);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .append_query_results([vec![remaining]])
            .into_connection();

        let request = json_request(
            "POST",
            "/api/v1/float-balances/11/settle",
            &json!({ "amount": "-100000", "note": "selisih MDR" }),
        );
        let response = send(state_with(db), request).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["kind"], "adjustment");
        assert_eq!(body["message"], "Adjustment saldo berhasil dicatat");
        assert_eq!(body["balances"][0]["account_id"], 11);
    }

    #[tokio::test]
    async fn test_store_outage_is_opaque() {
        let request = json_request("POST", "/api/v1/float-balances/11/settle", &json!({ "amount": "5000" }));
        let response = send(offline_state(), request).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await["message"], "An error occurred");
    }
}
