//! Reconciliation service: validates workflow actions and persists them
//! through the accounting store.

use std::sync::Arc;

use rekon_shared::types::{BankAccountId, BusinessId, RecordId, UserId};
use rust_decimal::Decimal;

use crate::gateway::{RecordQuery, ReconciliationGateway};
use crate::reconciliation::error::ReconError;
use crate::reconciliation::types::{ReconAction, ReconciliationRecord};
use crate::reconciliation::workflow::ReconWorkflow;

/// Drives reconciliation records through their lifecycle.
pub struct ReconciliationService<G: ReconciliationGateway> {
    gateway: Arc<G>,
}

impl<G: ReconciliationGateway> ReconciliationService<G> {
    /// Create a new reconciliation service.
    #[must_use]
    pub fn new(gateway: Arc<G>) -> Self {
        Self { gateway }
    }

    /// Lists records, newest day first.
    pub async fn list_records(
        &self,
        query: &RecordQuery,
    ) -> Result<Vec<ReconciliationRecord>, ReconError> {
        let mut records = self.gateway.list_records(query).await?;
        sort_newest_first(&mut records);
        Ok(records)
    }

    /// Fetches a record of a business.
    pub async fn get(
        &self,
        business_id: BusinessId,
        id: RecordId,
    ) -> Result<ReconciliationRecord, ReconError> {
        self.gateway
            .find_record(business_id, id)
            .await?
            .ok_or(ReconError::RecordNotFound(id))
    }

    /// Approves a pending record with zero variance.
    pub async fn approve(
        &self,
        business_id: BusinessId,
        id: RecordId,
        bank_account_id: Option<BankAccountId>,
        verifier: UserId,
    ) -> Result<ReconciliationRecord, ReconError> {
        let record = self.get(business_id, id).await?;
        let action = ReconWorkflow::approve(&record, bank_account_id, verifier)?;
        self.persist(business_id, &record, action).await
    }

    /// Rejects a pending record.
    ///
    /// An empty reason is refused before the store is contacted.
    pub async fn reject(
        &self,
        business_id: BusinessId,
        id: RecordId,
        reason: &str,
        verifier: UserId,
    ) -> Result<ReconciliationRecord, ReconError> {
        ReconWorkflow::require_reason(reason)?;

        let record = self.get(business_id, id).await?;
        let action = ReconWorkflow::reject(&record, reason, verifier)?;
        self.persist(business_id, &record, action).await
    }

    /// Flags a pending record with a variance for investigation.
    pub async fn investigate(
        &self,
        business_id: BusinessId,
        id: RecordId,
        verifier: UserId,
    ) -> Result<ReconciliationRecord, ReconError> {
        let record = self.get(business_id, id).await?;
        let action = ReconWorkflow::investigate(&record, verifier)?;
        self.persist(business_id, &record, action).await
    }

    /// Resolves a discrepancy.
    pub async fn resolve(
        &self,
        business_id: BusinessId,
        id: RecordId,
        note: &str,
    ) -> Result<ReconciliationRecord, ReconError> {
        if note.trim().is_empty() {
            return Err(ReconError::ResolutionNoteRequired);
        }

        let record = self.get(business_id, id).await?;
        let action = ReconWorkflow::resolve(&record, note)?;
        self.persist(business_id, &record, action).await
    }

    /// Stores an operator-edited actual amount on a pending record.
    ///
    /// Each edit is written on its own; there is no batching.
    pub async fn edit_actual_amount(
        &self,
        business_id: BusinessId,
        id: RecordId,
        amount: Decimal,
    ) -> Result<ReconciliationRecord, ReconError> {
        if amount < Decimal::ZERO {
            return Err(ReconError::NegativeAmount(amount));
        }

        let record = self.get(business_id, id).await?;
        let amount = ReconWorkflow::edit_actual(&record, amount)?;
        self.gateway.update_actual_amount(id, amount).await?;

        tracing::debug!(record_id = %id, %amount, "Actual amount updated");
        self.get(business_id, id).await
    }

    async fn persist(
        &self,
        business_id: BusinessId,
        record: &ReconciliationRecord,
        action: ReconAction,
    ) -> Result<ReconciliationRecord, ReconError> {
        let id = record.id;
        let new_status = action.new_status();

        match action {
            ReconAction::Approve {
                bank_account_id,
                verified_by,
                ..
            } => {
                self.gateway
                    .confirm_match(id, bank_account_id, verified_by)
                    .await?;
            }
            ReconAction::Reject {
                note, verified_by, ..
            }
            | ReconAction::Investigate {
                note, verified_by, ..
            } => {
                self.gateway.mark_discrepancy(id, verified_by, &note).await?;
            }
            ReconAction::Resolve { note, .. } => {
                self.gateway.resolve_discrepancy(id, &note).await?;
            }
        }

        tracing::info!(
            record_id = %id,
            branch_id = %record.branch_id,
            date = %record.recon_date,
            from = %record.status,
            to = %new_status,
            "Reconciliation status changed"
        );

        self.get(business_id, id).await
    }
}

/// Orders records by day descending, then by payment method.
pub fn sort_newest_first(records: &mut [ReconciliationRecord]) {
    records.sort_by(|a, b| {
        b.recon_date
            .cmp(&a.recon_date)
            .then_with(|| a.payment_method.cmp(&b.payment_method))
    });
}
