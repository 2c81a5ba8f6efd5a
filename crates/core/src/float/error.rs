//! Float settlement error types.

use rekon_shared::types::TransitAccountId;
use thiserror::Error;

use crate::gateway::GatewayError;

/// Errors from the float tracker.
#[derive(Debug, Error)]
pub enum FloatError {
    /// A settlement of zero.
    #[error("Settlement amount must not be zero")]
    InvalidAmount,

    /// The transit account is unknown to the business.
    #[error("Transit account {0} not found")]
    AccountNotFound(TransitAccountId),

    /// Accounting store failure.
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

impl FloatError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidAmount => 400,
            Self::AccountNotFound(_) | Self::Gateway(GatewayError::NotFound(_)) => 404,
            Self::Gateway(GatewayError::Conflict(_)) => 409,
            Self::Gateway(GatewayError::Timeout) => 504,
            Self::Gateway(GatewayError::Backend(_)) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidAmount => "INVALID_AMOUNT",
            Self::AccountNotFound(_) | Self::Gateway(GatewayError::NotFound(_)) => "NOT_FOUND",
            Self::Gateway(GatewayError::Conflict(_)) => "CONFLICT",
            Self::Gateway(GatewayError::Timeout) => "TIMEOUT",
            Self::Gateway(GatewayError::Backend(_)) => "DATABASE_ERROR",
        }
    }
}
