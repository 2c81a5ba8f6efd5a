//! Reconciliation workflow error types.

use rekon_shared::types::RecordId;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::gateway::GatewayError;
use crate::reconciliation::types::ReconStatus;

/// Errors that can occur while driving a reconciliation record.
#[derive(Debug, Error)]
pub enum ReconError {
    /// Attempted an invalid status transition.
    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition {
        /// The current status.
        from: ReconStatus,
        /// The attempted target status.
        to: ReconStatus,
    },

    /// Attempted to edit amounts of a record that is no longer pending.
    #[error("Record is {0} and can no longer be edited")]
    RecordFrozen(ReconStatus),

    /// Approval requires a zero variance.
    #[error("Cannot approve with variance {0}")]
    VarianceNotZero(Decimal),

    /// Approval requires a positive deposit.
    #[error("Actual amount must be greater than zero")]
    NonPositiveActual,

    /// Approval requires a destination bank account.
    #[error("Destination bank account is required")]
    BankAccountRequired,

    /// Rejection reason is required but not provided.
    #[error("Rejection reason is required")]
    RejectionReasonRequired,

    /// Resolution note is required but not provided.
    #[error("Resolution note is required")]
    ResolutionNoteRequired,

    /// Investigation requires a non-zero variance.
    #[error("Record has no variance to investigate")]
    NoVariance,

    /// Actual amounts cannot be negative.
    #[error("Amount cannot be negative: {0}")]
    NegativeAmount(Decimal),

    /// Record not found.
    #[error("Reconciliation record {0} not found")]
    RecordNotFound(RecordId),

    /// The record changed between read and write.
    #[error("Record was modified concurrently: {0}")]
    Conflict(String),

    /// Accounting store failure.
    #[error(transparent)]
    Gateway(GatewayError),
}

impl From<GatewayError> for ReconError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Conflict(msg) => Self::Conflict(msg),
            other => Self::Gateway(other),
        }
    }
}

impl ReconError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidTransition { .. }
            | Self::RecordFrozen(_)
            | Self::VarianceNotZero(_)
            | Self::NonPositiveActual
            | Self::BankAccountRequired
            | Self::RejectionReasonRequired
            | Self::ResolutionNoteRequired
            | Self::NoVariance
            | Self::NegativeAmount(_) => 400,

            Self::RecordNotFound(_) | Self::Gateway(GatewayError::NotFound(_)) => 404,

            Self::Conflict(_) | Self::Gateway(GatewayError::Conflict(_)) => 409,

            Self::Gateway(GatewayError::Timeout) => 504,

            Self::Gateway(GatewayError::Backend(_)) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::RecordFrozen(_) => "RECORD_FROZEN",
            Self::VarianceNotZero(_) => "VARIANCE_NOT_ZERO",
            Self::NonPositiveActual => "NON_POSITIVE_ACTUAL",
            Self::BankAccountRequired => "BANK_ACCOUNT_REQUIRED",
            Self::RejectionReasonRequired => "REJECTION_REASON_REQUIRED",
            Self::ResolutionNoteRequired => "RESOLUTION_NOTE_REQUIRED",
            Self::NoVariance => "NO_VARIANCE",
            Self::NegativeAmount(_) => "NEGATIVE_AMOUNT",
            Self::RecordNotFound(_) | Self::Gateway(GatewayError::NotFound(_)) => "NOT_FOUND",
            Self::Conflict(_) | Self::Gateway(GatewayError::Conflict(_)) => "CONFLICT",
            Self::Gateway(GatewayError::Timeout) => "TIMEOUT",
            Self::Gateway(GatewayError::Backend(_)) => "DATABASE_ERROR",
        }
    }
}
