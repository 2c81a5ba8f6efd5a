//! Transit account types.

use chrono::{DateTime, Utc};
use rekon_shared::types::{BranchId, TransitAccountId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Balance parked in a transit account, as reported by the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitAccountBalance {
    /// Transit account.
    pub account_id: TransitAccountId,
    /// Account display name.
    pub account_name: String,
    /// Branch the account collects for.
    pub branch_id: BranchId,
    /// Branch display name.
    pub branch_name: String,
    /// Balance not yet swept to head office.
    pub current_balance: Decimal,
    /// Last posting on the account.
    pub last_activity: Option<DateTime<Utc>>,
}

/// What a settlement posting represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettlementKind {
    /// Cash moved to the head-office bank.
    Disbursement,
    /// Non-cash correction or write-off.
    Adjustment,
}

impl SettlementKind {
    /// Classifies a non-zero signed amount.
    #[must_use]
    pub fn from_amount(amount: Decimal) -> Self {
        if amount > Decimal::ZERO {
            Self::Disbursement
        } else {
            Self::Adjustment
        }
    }

    /// Operator-facing confirmation message.
    #[must_use]
    pub fn message(&self) -> &'static str {
        match self {
            Self::Disbursement => "Saldo berhasil dicairkan ke rekening pusat",
            Self::Adjustment => "Adjustment saldo berhasil dicatat",
        }
    }
}

/// Result of a settlement, with balances re-read from the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettlementOutcome {
    /// Disbursement or adjustment.
    pub kind: SettlementKind,
    /// Signed amount posted.
    pub amount: Decimal,
    /// Confirmation message.
    pub message: String,
    /// Unsettled balances after the posting, or `None` if they could not be
    /// read back. The posting stands either way.
    pub balances: Option<Vec<TransitAccountBalance>>,
}
