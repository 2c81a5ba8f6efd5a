//! Reconciliation record types.
//!
//! A record holds one day of settlements for a (business, branch, payment
//! method) triple: the system-computed target on one side and the amount the
//! provider actually deposited on the other.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rekon_shared::types::{BankAccountId, BranchId, BusinessId, RecordId, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Reconciliation record status.
///
/// The valid transitions are:
/// - Pending → Approved (approve)
/// - Pending → Discrepancy (reject, investigate)
/// - Discrepancy → Resolved (resolve)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReconStatus {
    /// Awaiting verification; the actual amount can still be edited.
    Pending,
    /// Verified and posted to the ledger (terminal).
    Approved,
    /// Rejected or flagged for investigation.
    Discrepancy,
    /// Discrepancy closed with a resolution note (terminal).
    Resolved,
}

impl ReconStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Discrepancy => "discrepancy",
            Self::Resolved => "resolved",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "discrepancy" => Some(Self::Discrepancy),
            "resolved" => Some(Self::Resolved),
            _ => None,
        }
    }

    /// Returns true if the record's amounts can no longer change.
    #[must_use]
    pub fn is_frozen(&self) -> bool {
        matches!(self, Self::Approved | Self::Resolved)
    }

    /// Returns true if the actual amount may be edited.
    #[must_use]
    pub fn is_editable(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

impl fmt::Display for ReconStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Payment method key, e.g. `qris` or `transfer`.
///
/// Stored trimmed and lower-cased so that keys from statements, the sales
/// sync and operators compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct PaymentMethod(String);

impl PaymentMethod {
    /// Creates a normalized payment method key.
    #[must_use]
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_lowercase())
    }

    /// Returns the key.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the key is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for PaymentMethod {
    fn from(value: String) -> Self {
        Self::new(&value)
    }
}

impl From<&str> for PaymentMethod {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<PaymentMethod> for String {
    fn from(value: PaymentMethod) -> Self {
        value.0
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One reconciled settlement day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationRecord {
    /// Record identifier.
    pub id: RecordId,
    /// Owning business.
    pub business_id: BusinessId,
    /// Branch the sales belong to.
    pub branch_id: BranchId,
    /// Settlement day.
    pub recon_date: NaiveDate,
    /// Payment method.
    pub payment_method: PaymentMethod,
    /// System-computed net sales (the target).
    pub net_system_amount: Decimal,
    /// Amount actually deposited by the provider.
    pub actual_amount: Decimal,
    /// Provider fee.
    pub platform_fee: Decimal,
    /// Workflow status.
    pub status: ReconStatus,
    /// Free-text audit notes, appended by workflow actions.
    pub notes: Option<String>,
    /// Operator who last changed the status.
    pub verified_by: Option<UserId>,
    /// When the status last changed.
    pub verified_at: Option<DateTime<Utc>>,
}

impl ReconciliationRecord {
    /// Returns `actual - target`.
    #[must_use]
    pub fn variance(&self) -> Decimal {
        self.actual_amount - self.net_system_amount
    }

    /// Returns true if the deposit equals a positive target exactly.
    #[must_use]
    pub fn is_exact_match(&self) -> bool {
        self.variance().is_zero() && self.actual_amount > Decimal::ZERO
    }
}

/// A validated workflow transition, ready to be persisted.
///
/// Each variant carries what the persistence layer needs to perform the
/// transition and its audit trail.
#[derive(Debug, Clone, PartialEq)]
pub enum ReconAction {
    /// Pending → Approved, posting the deposit to a bank account.
    Approve {
        /// The new status.
        new_status: ReconStatus,
        /// Destination bank account for the ledger posting.
        bank_account_id: BankAccountId,
        /// Approving operator.
        verified_by: UserId,
    },
    /// Pending → Discrepancy with an operator-supplied reason.
    Reject {
        /// The new status.
        new_status: ReconStatus,
        /// Note recorded on the record.
        note: String,
        /// Rejecting operator.
        verified_by: UserId,
    },
    /// Pending → Discrepancy because of a non-zero variance.
    Investigate {
        /// The new status.
        new_status: ReconStatus,
        /// Note recorded on the record, carrying the variance.
        note: String,
        /// Flagging operator.
        verified_by: UserId,
    },
    /// Discrepancy → Resolved.
    Resolve {
        /// The new status.
        new_status: ReconStatus,
        /// Resolution note.
        note: String,
    },
}

impl ReconAction {
    /// Returns the status the record moves to.
    #[must_use]
    pub fn new_status(&self) -> ReconStatus {
        match self {
            Self::Approve { new_status, .. }
            | Self::Reject { new_status, .. }
            | Self::Investigate { new_status, .. }
            | Self::Resolve { new_status, .. } => *new_status,
        }
    }

    /// Returns the status the record must currently have.
    #[must_use]
    pub fn expected_status(&self) -> ReconStatus {
        match self {
            Self::Approve { .. } | Self::Reject { .. } | Self::Investigate { .. } => {
                ReconStatus::Pending
            }
            Self::Resolve { .. } => ReconStatus::Discrepancy,
        }
    }
}
