//! Domain error → JSON response mapping.

use axum::{
    Json,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use rekon_core::float::FloatError;
use rekon_core::reconciliation::ReconError;
use rekon_core::statement::IngestError;
use rekon_core::sync::SyncError;
use rekon_shared::AppError;

/// Any error a handler can return.
#[derive(Debug)]
pub enum ApiError {
    /// Request-level failure.
    App(AppError),
    /// Statement rejected.
    Ingest(IngestError),
    /// Workflow failure.
    Recon(ReconError),
    /// Float settlement failure.
    Float(FloatError),
    /// Range refresh failure.
    Sync(SyncError),
}

macro_rules! from_domain {
    ($($variant:ident($err:ty)),* $(,)?) => {
        $(impl From<$err> for ApiError {
            fn from(err: $err) -> Self {
                Self::$variant(err)
            }
        })*
    };
}

from_domain!(
    App(AppError),
    Ingest(IngestError),
    Recon(ReconError),
    Float(FloatError),
    Sync(SyncError),
);

impl ApiError {
    fn parts(&self) -> (u16, &'static str, String) {
        match self {
            Self::App(e) => (e.status_code(), e.error_code(), e.to_string()),
            Self::Ingest(e) => (e.status_code(), e.error_code(), e.to_string()),
            Self::Recon(e) => (e.status_code(), e.error_code(), e.to_string()),
            Self::Float(e) => (e.status_code(), e.error_code(), e.to_string()),
            Self::Sync(e) => (e.status_code(), e.error_code(), e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, mut message) = self.parts();
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %message, code, "Request failed");
            message = "An error occurred".to_string();
        }

        (status, Json(json!({ "error": code, "message": message }))).into_response()
    }
}

/// Maps a multipart read failure, keeping the body-limit rejection distinct.
pub fn multipart_error(err: &MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text()).into()
    } else {
        AppError::Validation(err.body_text()).into()
    }
}

/// Shorthand for a 400 response.
pub fn validation(message: impl Into<String>) -> ApiError {
    AppError::Validation(message.into()).into()
}
