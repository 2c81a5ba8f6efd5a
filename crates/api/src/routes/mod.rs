//! API route definitions.

use axum::{Router, middleware};

use crate::{AppState, middleware::auth_middleware};

pub mod float_balances;
pub mod health;
pub mod reconciliations;
pub mod statements;

/// Creates the API router; everything but health requires a bearer token.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    let protected_routes = Router::new()
        .merge(reconciliations::routes())
        .merge(statements::routes(state.reconciliation.max_upload_bytes))
        .merge(float_balances::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .merge(health::routes())
        .merge(protected_routes)
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Router harness for handler tests.

    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{Request, Response, header};
    use http_body_util::BodyExt;
    use rekon_db::PgSettlementGateway;
    use rekon_shared::{JwtService, ReconciliationConfig};
    use sea_orm::DatabaseConnection;
    use tower::ServiceExt;
    use uuid::Uuid;

    use crate::{AppState, create_router};

    pub const SECRET: &str = "test-secret";

    pub fn business() -> Uuid {
        Uuid::from_u128(1)
    }

    pub fn state_with(db: DatabaseConnection) -> AppState {
        AppState {
            gateway: Arc::new(PgSettlementGateway::new(db, Duration::from_secs(5))),
            jwt_service: Arc::new(JwtService::new(SECRET)),
            reconciliation: Arc::new(ReconciliationConfig::default()),
        }
    }

    /// State whose store is never reachable; for requests that must fail
    /// before touching it.
    pub fn offline_state() -> AppState {
        state_with(DatabaseConnection::Disconnected)
    }

    pub fn bearer() -> String {
        let token = JwtService::new(SECRET)
            .issue_token(
                Uuid::from_u128(2),
                business(),
                "finance",
                chrono::Utc::now() + chrono::Duration::hours(1),
            )
            .unwrap();
        format!("Bearer {token}")
    }

    pub fn authed(method: &str, uri: &str) -> axum::http::request::Builder {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, bearer())
    }

    pub fn json_request(method: &str, uri: &str, body: &serde_json::Value) -> Request<Body> {
        authed(method, uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    pub async fn send(state: AppState, request: Request<Body>) -> Response<Body> {
        create_router(state).oneshot(request).await.unwrap()
    }

    pub async fn body_json(response: Response<Body>) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }
}
