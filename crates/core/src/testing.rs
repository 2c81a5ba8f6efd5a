//! In-memory accounting store for service tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{NaiveDate, Utc};
use rekon_shared::types::{BankAccountId, BranchId, BusinessId, RecordId, TransitAccountId, UserId};
use rust_decimal::Decimal;

use crate::float::TransitAccountBalance;
use crate::gateway::{
    FloatGateway, FloatSettlement, GatewayError, RecordQuery, ReconciliationGateway,
    StatementUpsert, UpsertOutcome,
};
use crate::reconciliation::{PaymentMethod, ReconStatus, ReconciliationRecord};

/// Mock store that enforces the same status guards as the database.
pub(crate) struct MockGateway {
    records: Mutex<HashMap<RecordId, ReconciliationRecord>>,
    balances: Mutex<Vec<TransitAccountBalance>>,
    settlements: Mutex<Vec<FloatSettlement>>,
    calls: Mutex<Vec<&'static str>>,
    synced: Mutex<Vec<NaiveDate>>,
    fail_sync: Mutex<HashSet<NaiveDate>>,
    fail_upsert: Mutex<HashSet<NaiveDate>>,
    race_confirm: Mutex<HashSet<RecordId>>,
    fail_balances: Mutex<bool>,
    next_id: AtomicI64,
}

impl MockGateway {
    pub(crate) fn new() -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            balances: Mutex::new(Vec::new()),
            settlements: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
            synced: Mutex::new(Vec::new()),
            fail_sync: Mutex::new(HashSet::new()),
            fail_upsert: Mutex::new(HashSet::new()),
            race_confirm: Mutex::new(HashSet::new()),
            fail_balances: Mutex::new(false),
            next_id: AtomicI64::new(1),
        }
    }

    pub(crate) fn seed_record(
        &self,
        business_id: BusinessId,
        branch_id: BranchId,
        date: NaiveDate,
        method: &str,
        net: Decimal,
        actual: Decimal,
    ) -> RecordId {
        let id = RecordId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let record = ReconciliationRecord {
            id,
            business_id,
            branch_id,
            recon_date: date,
            payment_method: PaymentMethod::new(method),
            net_system_amount: net,
            actual_amount: actual,
            platform_fee: Decimal::ZERO,
            status: ReconStatus::Pending,
            notes: None,
            verified_by: None,
            verified_at: None,
        };
        self.records.lock().unwrap().insert(id, record);
        id
    }

    pub(crate) fn seed_balance(&self, account_id: TransitAccountId, branch_id: BranchId, balance: Decimal) {
        self.balances.lock().unwrap().push(TransitAccountBalance {
            account_id,
            account_name: format!("QRIS {account_id}"),
            branch_id,
            branch_name: format!("Branch {branch_id}"),
            current_balance: balance,
            last_activity: None,
        });
    }

    pub(crate) fn set_status(&self, id: RecordId, status: ReconStatus) {
        if let Some(record) = self.records.lock().unwrap().get_mut(&id) {
            record.status = status;
        }
    }

    pub(crate) fn fail_sync_on(&self, date: NaiveDate) {
        self.fail_sync.lock().unwrap().insert(date);
    }

    pub(crate) fn fail_upsert_on(&self, date: NaiveDate) {
        self.fail_upsert.lock().unwrap().insert(date);
    }

    pub(crate) fn fail_balance_reads(&self) {
        *self.fail_balances.lock().unwrap() = true;
    }

    /// Makes the next `confirm_match` on `id` find the record already
    /// approved by someone else.
    pub(crate) fn race_next_confirm(&self, id: RecordId) {
        self.race_confirm.lock().unwrap().insert(id);
    }

    pub(crate) fn records_snapshot(&self) -> Vec<ReconciliationRecord> {
        let mut records: Vec<_> = self.records.lock().unwrap().values().cloned().collect();
        records.sort_by_key(|r| r.id);
        records
    }

    pub(crate) fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn call_count(&self, name: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| **c == name).count()
    }

    pub(crate) fn synced_days(&self) -> Vec<NaiveDate> {
        self.synced.lock().unwrap().clone()
    }

    pub(crate) fn settlements(&self) -> Vec<FloatSettlement> {
        self.settlements.lock().unwrap().clone()
    }

    fn log(&self, call: &'static str) {
        self.calls.lock().unwrap().push(call);
    }

    /// Applies `change` to a record currently in `expected`, or reports a
    /// conflict.
    fn transition(
        &self,
        id: RecordId,
        expected: ReconStatus,
        change: impl FnOnce(&mut ReconciliationRecord),
    ) -> Result<(), GatewayError> {
        let mut records = self.records.lock().unwrap();
        let record = records
            .get_mut(&id)
            .ok_or_else(|| GatewayError::NotFound(format!("record {id}")))?;
        if record.status != expected {
            return Err(GatewayError::Conflict(format!(
                "record {id} is {}, expected {expected}",
                record.status
            )));
        }
        change(record);
        Ok(())
    }
}

fn append_note(notes: &mut Option<String>, note: &str) {
    *notes = Some(match notes.take() {
        Some(existing) => format!("{existing}\n{note}"),
        None => note.to_string(),
    });
}

impl ReconciliationGateway for MockGateway {
    async fn sync_daily_sales(&self, _branch_id: BranchId, date: NaiveDate) -> Result<(), GatewayError> {
        self.log("sync_daily_sales");
        if self.fail_sync.lock().unwrap().contains(&date) {
            return Err(GatewayError::Backend(format!("sync failed for {date}")));
        }
        self.synced.lock().unwrap().push(date);
        Ok(())
    }

    async fn list_records(&self, query: &RecordQuery) -> Result<Vec<ReconciliationRecord>, GatewayError> {
        self.log("list_records");
        Ok(self
            .records_snapshot()
            .into_iter()
            .filter(|r| {
                r.business_id == query.business_id
                    && r.branch_id == query.branch_id
                    && r.recon_date >= query.from
                    && r.recon_date <= query.to
                    && query
                        .payment_method
                        .as_ref()
                        .is_none_or(|m| *m == r.payment_method)
            })
            .collect())
    }

    async fn find_record(
        &self,
        business_id: BusinessId,
        id: RecordId,
    ) -> Result<Option<ReconciliationRecord>, GatewayError> {
        self.log("find_record");
        Ok(self
            .records
            .lock()
            .unwrap()
            .get(&id)
            .filter(|r| r.business_id == business_id)
            .cloned())
    }

    async fn upsert_from_statement(&self, upsert: &StatementUpsert) -> Result<UpsertOutcome, GatewayError> {
        self.log("upsert_from_statement");
        if self.fail_upsert.lock().unwrap().contains(&upsert.recon_date) {
            return Err(GatewayError::Timeout);
        }

        let mut records = self.records.lock().unwrap();
        let existing = records.values_mut().find(|r| {
            r.business_id == upsert.business_id
                && r.branch_id == upsert.branch_id
                && r.recon_date == upsert.recon_date
                && r.payment_method == upsert.payment_method
        });

        match existing {
            Some(record) if record.status != ReconStatus::Pending => Ok(UpsertOutcome::Frozen),
            Some(record) => {
                record.actual_amount = upsert.actual_amount;
                record.platform_fee = upsert.platform_fee;
                Ok(UpsertOutcome::Applied)
            }
            None => {
                let id = RecordId(self.next_id.fetch_add(1, Ordering::SeqCst));
                records.insert(
                    id,
                    ReconciliationRecord {
                        id,
                        business_id: upsert.business_id,
                        branch_id: upsert.branch_id,
                        recon_date: upsert.recon_date,
                        payment_method: upsert.payment_method.clone(),
                        net_system_amount: Decimal::ZERO,
                        actual_amount: upsert.actual_amount,
                        platform_fee: upsert.platform_fee,
                        status: ReconStatus::Pending,
                        notes: None,
                        verified_by: None,
                        verified_at: None,
                    },
                );
                Ok(UpsertOutcome::Applied)
            }
        }
    }

    async fn update_actual_amount(&self, id: RecordId, amount: Decimal) -> Result<(), GatewayError> {
        self.log("update_actual_amount");
        self.transition(id, ReconStatus::Pending, |r| r.actual_amount = amount)
    }

    async fn confirm_match(
        &self,
        id: RecordId,
        _bank_account_id: BankAccountId,
        verifier: UserId,
    ) -> Result<(), GatewayError> {
        self.log("confirm_match");
        if self.race_confirm.lock().unwrap().remove(&id) {
            self.set_status(id, ReconStatus::Approved);
        }
        self.transition(id, ReconStatus::Pending, |r| {
            r.status = ReconStatus::Approved;
            r.verified_by = Some(verifier);
            r.verified_at = Some(Utc::now());
        })
    }

    async fn mark_discrepancy(&self, id: RecordId, verifier: UserId, note: &str) -> Result<(), GatewayError> {
        self.log("mark_discrepancy");
        self.transition(id, ReconStatus::Pending, |r| {
            r.status = ReconStatus::Discrepancy;
            r.verified_by = Some(verifier);
            r.verified_at = Some(Utc::now());
            append_note(&mut r.notes, note);
        })
    }

    async fn resolve_discrepancy(&self, id: RecordId, note: &str) -> Result<(), GatewayError> {
        self.log("resolve_discrepancy");
        self.transition(id, ReconStatus::Discrepancy, |r| {
            r.status = ReconStatus::Resolved;
            append_note(&mut r.notes, note);
        })
    }
}

impl FloatGateway for MockGateway {
    async fn list_unsettled_balances(
        &self,
        _business_id: BusinessId,
    ) -> Result<Vec<TransitAccountBalance>, GatewayError> {
        self.log("list_unsettled_balances");
        if *self.fail_balances.lock().unwrap() {
            return Err(GatewayError::Timeout);
        }
        Ok(self
            .balances
            .lock()
            .unwrap()
            .iter()
            .filter(|b| !b.current_balance.is_zero())
            .cloned()
            .collect())
    }

    async fn settle_float_balance(&self, settlement: &FloatSettlement) -> Result<(), GatewayError> {
        self.log("settle_float_balance");
        let mut balances = self.balances.lock().unwrap();
        let account = balances
            .iter_mut()
            .find(|b| b.account_id == settlement.account_id)
            .ok_or_else(|| GatewayError::NotFound(format!("account {}", settlement.account_id)))?;
        account.current_balance -= settlement.amount.abs();
        self.settlements.lock().unwrap().push(settlement.clone());
        Ok(())
    }
}
