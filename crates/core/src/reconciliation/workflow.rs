//! Reconciliation record state machine.
//!
//! Validates transitions against the record as last read. The accounting
//! store re-checks the status when the transition is written, so a record
//! that moved on concurrently is rejected there as a conflict.

use rekon_shared::types::{BankAccountId, UserId};
use rust_decimal::Decimal;

use crate::reconciliation::error::ReconError;
use crate::reconciliation::types::{ReconAction, ReconStatus, ReconciliationRecord};

/// Note prefix for rejected records.
pub const REJECT_MARKER: &str = "[REJECTED]";
/// Note prefix for records flagged for investigation.
pub const INVESTIGATE_MARKER: &str = "[INVESTIGATE]";

/// Stateless validator for reconciliation transitions.
pub struct ReconWorkflow;

impl ReconWorkflow {
    /// Approve a pending record and post it to a bank account.
    ///
    /// # Errors
    ///
    /// * `InvalidTransition` if the record is not pending
    /// * `BankAccountRequired` if no destination account was chosen
    /// * `NonPositiveActual` if nothing was deposited
    /// * `VarianceNotZero` if the deposit differs from the target
    pub fn approve(
        record: &ReconciliationRecord,
        bank_account_id: Option<BankAccountId>,
        verified_by: UserId,
    ) -> Result<ReconAction, ReconError> {
        Self::require_status(record.status, ReconStatus::Pending, ReconStatus::Approved)?;

        let bank_account_id = bank_account_id.ok_or(ReconError::BankAccountRequired)?;

        if record.actual_amount <= Decimal::ZERO {
            return Err(ReconError::NonPositiveActual);
        }

        let variance = record.variance();
        if !variance.is_zero() {
            return Err(ReconError::VarianceNotZero(variance));
        }

        Ok(ReconAction::Approve {
            new_status: ReconStatus::Approved,
            bank_account_id,
            verified_by,
        })
    }

    /// Reject a pending record with a reason.
    ///
    /// The reason is checked before the status, so an empty reason is
    /// refused without looking at the record at all.
    pub fn reject(
        record: &ReconciliationRecord,
        reason: &str,
        verified_by: UserId,
    ) -> Result<ReconAction, ReconError> {
        let reason = Self::require_reason(reason)?;
        Self::require_status(record.status, ReconStatus::Pending, ReconStatus::Discrepancy)?;

        Ok(ReconAction::Reject {
            new_status: ReconStatus::Discrepancy,
            note: format!("{REJECT_MARKER} {reason}"),
            verified_by,
        })
    }

    /// Flag a pending record with a non-zero variance for investigation.
    pub fn investigate(
        record: &ReconciliationRecord,
        verified_by: UserId,
    ) -> Result<ReconAction, ReconError> {
        Self::require_status(record.status, ReconStatus::Pending, ReconStatus::Discrepancy)?;

        let variance = record.variance();
        if variance.is_zero() {
            return Err(ReconError::NoVariance);
        }

        Ok(ReconAction::Investigate {
            new_status: ReconStatus::Discrepancy,
            note: format!("{INVESTIGATE_MARKER} variance {variance}"),
            verified_by,
        })
    }

    /// Close a discrepancy with a resolution note.
    pub fn resolve(record: &ReconciliationRecord, note: &str) -> Result<ReconAction, ReconError> {
        let note = note.trim();
        if note.is_empty() {
            return Err(ReconError::ResolutionNoteRequired);
        }
        Self::require_status(record.status, ReconStatus::Discrepancy, ReconStatus::Resolved)?;

        Ok(ReconAction::Resolve {
            new_status: ReconStatus::Resolved,
            note: note.to_string(),
        })
    }

    /// Validate a direct edit of the actual amount.
    ///
    /// Returns the amount to store.
    pub fn edit_actual(record: &ReconciliationRecord, amount: Decimal) -> Result<Decimal, ReconError> {
        if !record.status.is_editable() {
            return Err(ReconError::RecordFrozen(record.status));
        }
        if amount < Decimal::ZERO {
            return Err(ReconError::NegativeAmount(amount));
        }
        Ok(amount)
    }

    /// Check if a status transition is valid.
    ///
    /// Valid transitions:
    /// - Pending → Approved (approve)
    /// - Pending → Discrepancy (reject, investigate)
    /// - Discrepancy → Resolved (resolve)
    #[must_use]
    pub fn is_valid_transition(from: ReconStatus, to: ReconStatus) -> bool {
        matches!(
            (from, to),
            (
                ReconStatus::Pending,
                ReconStatus::Approved | ReconStatus::Discrepancy
            ) | (ReconStatus::Discrepancy, ReconStatus::Resolved)
        )
    }

    /// Trims a rejection reason, refusing an empty one.
    pub fn require_reason(reason: &str) -> Result<&str, ReconError> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(ReconError::RejectionReasonRequired);
        }
        Ok(reason)
    }

    fn require_status(
        current: ReconStatus,
        expected: ReconStatus,
        to: ReconStatus,
    ) -> Result<(), ReconError> {
        if current == expected {
            Ok(())
        } else {
            Err(ReconError::InvalidTransition { from: current, to })
        }
    }
}
