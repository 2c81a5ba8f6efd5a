//! `SeaORM` active enums.

use rekon_core::reconciliation::ReconStatus as CoreStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// `recon_status` Postgres enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "recon_status")]
pub enum ReconStatus {
    /// Awaiting verification.
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Verified and posted.
    #[sea_orm(string_value = "approved")]
    Approved,
    /// Rejected or under investigation.
    #[sea_orm(string_value = "discrepancy")]
    Discrepancy,
    /// Discrepancy closed.
    #[sea_orm(string_value = "resolved")]
    Resolved,
}

impl From<ReconStatus> for CoreStatus {
    fn from(status: ReconStatus) -> Self {
        match status {
            ReconStatus::Pending => Self::Pending,
            ReconStatus::Approved => Self::Approved,
            ReconStatus::Discrepancy => Self::Discrepancy,
            ReconStatus::Resolved => Self::Resolved,
        }
    }
}

impl From<CoreStatus> for ReconStatus {
    fn from(status: CoreStatus) -> Self {
        match status {
            CoreStatus::Pending => Self::Pending,
            CoreStatus::Approved => Self::Approved,
            CoreStatus::Discrepancy => Self::Discrepancy,
            CoreStatus::Resolved => Self::Resolved,
        }
    }
}
