//! Capability traits for the external accounting store.
//!
//! Records, ledger postings and system sales totals are owned by the
//! accounting store. This crate only reaches them through these traits,
//! which the db crate implements against PostgreSQL.

use std::future::Future;

use chrono::NaiveDate;
use rekon_shared::types::{BankAccountId, BranchId, BusinessId, RecordId, TransitAccountId, UserId};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::float::TransitAccountBalance;
use crate::reconciliation::{PaymentMethod, ReconciliationRecord};

/// Errors reported by the accounting store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// The addressed row does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// A guarded write matched no row: the record moved on concurrently.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The store did not answer in time.
    #[error("Accounting store timed out")]
    Timeout,

    /// Any other store failure.
    #[error("Accounting store error: {0}")]
    Backend(String),
}

/// Filter for listing reconciliation records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordQuery {
    /// Owning business.
    pub business_id: BusinessId,
    /// Branch.
    pub branch_id: BranchId,
    /// First day, inclusive.
    pub from: NaiveDate,
    /// Last day, inclusive.
    pub to: NaiveDate,
    /// Restrict to one payment method.
    pub payment_method: Option<PaymentMethod>,
}

/// Statement values to write into the record for one day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementUpsert {
    /// Owning business.
    pub business_id: BusinessId,
    /// Branch.
    pub branch_id: BranchId,
    /// Settlement day.
    pub recon_date: NaiveDate,
    /// Payment method the statement belongs to.
    pub payment_method: PaymentMethod,
    /// Deposited net amount.
    pub actual_amount: Decimal,
    /// Provider fee.
    pub platform_fee: Decimal,
}

/// Outcome of a statement upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// The record was created or updated.
    Applied,
    /// A record exists but is no longer pending; nothing was written.
    Frozen,
}

/// A signed posting against a transit account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FloatSettlement {
    /// Owning business.
    pub business_id: BusinessId,
    /// Transit account being settled.
    pub account_id: TransitAccountId,
    /// Positive for a transfer to head office, negative for an adjustment.
    pub amount: Decimal,
    /// Operator note.
    pub note: String,
    /// Operator performing the settlement.
    pub verifier: UserId,
}

/// Reconciliation capabilities of the accounting store.
///
/// Transition methods must re-check the record's current status on the
/// store side and fail with [`GatewayError::Conflict`] if it no longer
/// matches; callers never rely on their own read for that.
pub trait ReconciliationGateway: Send + Sync {
    /// Recomputes the system-side totals for one branch and day.
    ///
    /// Idempotent.
    fn sync_daily_sales(
        &self,
        branch_id: BranchId,
        date: NaiveDate,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send;

    /// Lists records matching the query.
    fn list_records(
        &self,
        query: &RecordQuery,
    ) -> impl Future<Output = Result<Vec<ReconciliationRecord>, GatewayError>> + Send;

    /// Finds a record of a business by ID.
    fn find_record(
        &self,
        business_id: BusinessId,
        id: RecordId,
    ) -> impl Future<Output = Result<Option<ReconciliationRecord>, GatewayError>> + Send;

    /// Inserts or updates the record keyed by (business, branch, date,
    /// method). Only pending records are updated.
    fn upsert_from_statement(
        &self,
        upsert: &StatementUpsert,
    ) -> impl Future<Output = Result<UpsertOutcome, GatewayError>> + Send;

    /// Sets the actual amount of a pending record.
    fn update_actual_amount(
        &self,
        id: RecordId,
        amount: Decimal,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send;

    /// Pending → Approved, posting the deposit to the bank account.
    fn confirm_match(
        &self,
        id: RecordId,
        bank_account_id: BankAccountId,
        verifier: UserId,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send;

    /// Pending → Discrepancy with a note.
    fn mark_discrepancy(
        &self,
        id: RecordId,
        verifier: UserId,
        note: &str,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send;

    /// Discrepancy → Resolved with a note.
    fn resolve_discrepancy(
        &self,
        id: RecordId,
        note: &str,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send;
}

/// Transit account capabilities of the accounting store.
pub trait FloatGateway: Send + Sync {
    /// Lists transit accounts with a balance not yet swept to head office.
    fn list_unsettled_balances(
        &self,
        business_id: BusinessId,
    ) -> impl Future<Output = Result<Vec<TransitAccountBalance>, GatewayError>> + Send;

    /// Posts a settlement or adjustment against a transit account.
    fn settle_float_balance(
        &self,
        settlement: &FloatSettlement,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send;
}
