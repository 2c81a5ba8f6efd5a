//! Sync error types.

use chrono::NaiveDate;
use thiserror::Error;

use crate::gateway::GatewayError;

/// Errors from the sync coordinator.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The range ends before it starts.
    #[error("Invalid date range: {from} is after {to}")]
    InvalidRange {
        /// First day.
        from: NaiveDate,
        /// Last day.
        to: NaiveDate,
    },

    /// The range spans more days than allowed.
    #[error("Date range of {days} days exceeds the maximum of {max}")]
    RangeTooWide {
        /// Requested span in days.
        days: i64,
        /// Configured maximum.
        max: u32,
    },

    /// Accounting store failure while listing records.
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

impl SyncError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidRange { .. } | Self::RangeTooWide { .. } => 400,
            Self::Gateway(GatewayError::NotFound(_)) => 404,
            Self::Gateway(GatewayError::Conflict(_)) => 409,
            Self::Gateway(GatewayError::Timeout) => 504,
            Self::Gateway(GatewayError::Backend(_)) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidRange { .. } => "INVALID_DATE_RANGE",
            Self::RangeTooWide { .. } => "DATE_RANGE_TOO_WIDE",
            Self::Gateway(GatewayError::NotFound(_)) => "NOT_FOUND",
            Self::Gateway(GatewayError::Conflict(_)) => "CONFLICT",
            Self::Gateway(GatewayError::Timeout) => "TIMEOUT",
            Self::Gateway(GatewayError::Backend(_)) => "DATABASE_ERROR",
        }
    }
}
