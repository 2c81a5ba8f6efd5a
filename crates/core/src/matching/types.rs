//! Match result types.

use chrono::NaiveDate;
use rekon_shared::types::{BranchId, BusinessId, RecordId};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::gateway::GatewayError;
use crate::reconciliation::{PaymentMethod, ReconStatus};

/// Comparison of statement and system totals for one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    /// Settlement day.
    pub recon_date: NaiveDate,
    /// Branch.
    pub branch_id: BranchId,
    /// System net amount, zero when there is no record.
    pub target: Decimal,
    /// Statement net amount, zero when the statement has no rows that day.
    pub found: Decimal,
    /// Statement fee.
    pub found_fee: Decimal,
    /// `found - target`.
    pub variance: Decimal,
    /// Existing record for the day, if any.
    pub existing_record_id: Option<RecordId>,
    /// Status of the existing record.
    pub existing_status: Option<ReconStatus>,
}

impl MatchResult {
    /// Returns true if the statement covers the target exactly.
    #[must_use]
    pub fn is_exact_match(&self) -> bool {
        self.variance.is_zero() && self.found > Decimal::ZERO
    }
}

/// Counts over a set of match results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MatchSummary {
    /// Days matched exactly.
    pub exact: usize,
    /// Days where the statement exceeds the target.
    pub over: usize,
    /// Days where the statement falls short of the target.
    pub under: usize,
    /// Days with a target but no statement amount.
    pub missing_statement: usize,
    /// Sum of all variances.
    pub net_variance: Decimal,
}

impl MatchSummary {
    /// Summarizes match results.
    #[must_use]
    pub fn from_results(results: &[MatchResult]) -> Self {
        results.iter().fold(Self::default(), |mut acc, r| {
            if r.is_exact_match() {
                acc.exact += 1;
            } else if r.variance > Decimal::ZERO {
                acc.over += 1;
            } else if r.variance < Decimal::ZERO {
                acc.under += 1;
            }
            if r.found.is_zero() {
                acc.missing_statement += 1;
            }
            acc.net_variance += r.variance;
            acc
        })
    }
}

/// Which records an apply run writes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyScope {
    /// Owning business.
    pub business_id: BusinessId,
    /// Branch.
    pub branch_id: BranchId,
    /// Payment method of the statement.
    pub payment_method: PaymentMethod,
}

/// The upsert that stopped an apply run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplyFailure {
    /// Day whose upsert failed.
    pub date: NaiveDate,
    /// Failure message.
    pub message: String,
    /// Underlying store error.
    #[serde(skip)]
    pub error: GatewayError,
}

/// Outcome of applying match results.
///
/// Application stops at the first failed upsert; the report says exactly
/// which days were written before that and which were never attempted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApplyReport {
    /// Days written.
    pub applied: Vec<NaiveDate>,
    /// Days whose record is no longer pending.
    pub skipped_frozen: Vec<NaiveDate>,
    /// Days with nothing on the statement.
    pub skipped_zero: Vec<NaiveDate>,
    /// The failure that stopped the run.
    pub failure: Option<ApplyFailure>,
    /// Days after the failure.
    pub not_attempted: Vec<NaiveDate>,
}

impl ApplyReport {
    /// Number of days written.
    #[must_use]
    pub fn applied_count(&self) -> usize {
        self.applied.len()
    }

    /// Returns true if every result was processed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failure.is_none()
    }
}
