//! PostgreSQL implementation of the accounting store capabilities.
//!
//! Reconciliation rows live in `daily_reconciliations`. System sales totals,
//! ledger postings and transit balances are reached through the store's
//! stored functions.

use std::future::Future;
use std::time::Duration;

use chrono::Utc;
use rekon_core::float::TransitAccountBalance;
use rekon_core::gateway::{
    FloatGateway, FloatSettlement, GatewayError, RecordQuery, ReconciliationGateway,
    StatementUpsert, UpsertOutcome,
};
use rekon_core::reconciliation::{PaymentMethod, ReconciliationRecord};
use rekon_shared::types::{
    BankAccountId, BranchId, BusinessId, RecordId, TransitAccountId, UserId,
};
use rust_decimal::Decimal;
use sea_orm::sea_query::{Alias, Expr, OnConflict, SimpleExpr};
use sea_orm::{
    ActiveEnum, ColumnTrait, ConnectionTrait, DatabaseBackend, DatabaseConnection, DbErr,
    EntityTrait, FromQueryResult, NotSet, QueryFilter, QueryOrder, Set, Statement,
    TransactionTrait, UpdateMany,
};

use crate::entities::daily_reconciliations::{self, Column, Entity};
use crate::entities::sea_orm_active_enums::ReconStatus;

/// Accounting store gateway backed by a `SeaORM` connection.
#[derive(Debug)]
pub struct PgSettlementGateway {
    db: DatabaseConnection,
    timeout: Duration,
}

/// Row returned by `get_unsettled_balances`.
#[derive(Debug, FromQueryResult)]
struct BalanceRow {
    account_id: i64,
    account_name: String,
    branch_id: i64,
    branch_name: String,
    current_balance: Decimal,
    last_activity: Option<chrono::DateTime<chrono::FixedOffset>>,
}

impl From<BalanceRow> for TransitAccountBalance {
    fn from(row: BalanceRow) -> Self {
        Self {
            account_id: TransitAccountId(row.account_id),
            account_name: row.account_name,
            branch_id: BranchId(row.branch_id),
            branch_name: row.branch_name,
            current_balance: row.current_balance,
            last_activity: row.last_activity.map(|t| t.with_timezone(&Utc)),
        }
    }
}

impl From<daily_reconciliations::Model> for ReconciliationRecord {
    fn from(model: daily_reconciliations::Model) -> Self {
        Self {
            id: RecordId(model.id),
            business_id: BusinessId(model.business_id),
            branch_id: BranchId(model.branch_id),
            recon_date: model.recon_date,
            payment_method: PaymentMethod::new(&model.payment_method),
            net_system_amount: model.net_system_amount,
            actual_amount: model.actual_amount,
            platform_fee: model.platform_fee,
            status: model.status.into(),
            notes: model.notes,
            verified_by: model.verified_by.map(UserId),
            verified_at: model.verified_at.map(|t| t.with_timezone(&Utc)),
        }
    }
}

impl PgSettlementGateway {
    /// Creates a gateway whose calls are each bounded by `timeout`.
    #[must_use]
    pub const fn new(db: DatabaseConnection, timeout: Duration) -> Self {
        Self { db, timeout }
    }

    /// Returns the underlying connection.
    #[must_use]
    pub const fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Runs a store call under the request timeout.
    ///
    /// A call that runs out of time is dropped, which rolls back any
    /// transaction it had open.
    async fn bounded<T>(
        &self,
        op: &'static str,
        call: impl Future<Output = Result<T, GatewayError>>,
    ) -> Result<T, GatewayError> {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => {
                if let Err(error) = &result {
                    tracing::debug!(op, error = %error, "Accounting store call failed");
                }
                result
            }
            Err(_) => {
                tracing::warn!(op, timeout_secs = self.timeout.as_secs(), "Accounting store call timed out");
                Err(GatewayError::Timeout)
            }
        }
    }

    /// Explains why a guarded update matched no row.
    async fn guard_failure<C: ConnectionTrait>(
        conn: &C,
        id: RecordId,
        expected: ReconStatus,
    ) -> GatewayError {
        match Entity::find_by_id(id.get()).one(conn).await {
            Ok(Some(model)) => GatewayError::Conflict(format!(
                "record {id} is {}, expected {}",
                model.status.to_value(),
                expected.to_value()
            )),
            Ok(None) => GatewayError::NotFound(format!("record {id}")),
            Err(err) => db_error(err),
        }
    }

    /// Runs an update guarded on the record's current status.
    async fn guarded_update<C: ConnectionTrait>(
        conn: &C,
        id: RecordId,
        expected: ReconStatus,
        update: UpdateMany<Entity>,
    ) -> Result<(), GatewayError> {
        let result = update
            .col_expr(Column::UpdatedAt, Expr::current_timestamp().into())
            .filter(Column::Id.eq(id.get()))
            .filter(Column::Status.eq(expected))
            .exec(conn)
            .await
            .map_err(db_error)?;

        if result.rows_affected == 0 {
            return Err(Self::guard_failure(conn, id, expected).await);
        }
        Ok(())
    }
}

fn db_error(err: DbErr) -> GatewayError {
    let message = err.to_string();
    if message.contains("not found") {
        GatewayError::NotFound(message)
    } else {
        GatewayError::Backend(message)
    }
}

fn status_value(status: ReconStatus) -> SimpleExpr {
    Expr::val(status.to_value()).as_enum(Alias::new("recon_status"))
}

/// Appends `note` on its own line to whatever the record already holds.
fn append_note(note: &str) -> SimpleExpr {
    Expr::cust_with_values("COALESCE(notes || E'\\n', '') || ?", [note.to_owned()])
}

fn call(sql: &str, values: Vec<sea_orm::Value>) -> Statement {
    Statement::from_sql_and_values(DatabaseBackend::Postgres, sql, values)
}

impl ReconciliationGateway for PgSettlementGateway {
    async fn sync_daily_sales(
        &self,
        branch_id: BranchId,
        date: chrono::NaiveDate,
    ) -> Result<(), GatewayError> {
        self.bounded("sync_daily_sales", async {
            self.db
                .execute(call(
                    "SELECT sync_daily_sales($1, $2)",
                    vec![branch_id.get().into(), date.into()],
                ))
                .await
                .map_err(db_error)?;
            Ok(())
        })
        .await
    }

    async fn list_records(
        &self,
        query: &RecordQuery,
    ) -> Result<Vec<ReconciliationRecord>, GatewayError> {
        self.bounded("list_records", async {
            let mut select = Entity::find()
                .filter(Column::BusinessId.eq(query.business_id.into_inner()))
                .filter(Column::BranchId.eq(query.branch_id.get()))
                .filter(Column::ReconDate.between(query.from, query.to));
            if let Some(method) = &query.payment_method {
                select = select.filter(Column::PaymentMethod.eq(method.as_str()));
            }

            let models = select
                .order_by_desc(Column::ReconDate)
                .order_by_asc(Column::PaymentMethod)
                .all(&self.db)
                .await
                .map_err(db_error)?;
            Ok(models.into_iter().map(ReconciliationRecord::from).collect())
        })
        .await
    }

    async fn find_record(
        &self,
        business_id: BusinessId,
        id: RecordId,
    ) -> Result<Option<ReconciliationRecord>, GatewayError> {
        self.bounded("find_record", async {
            let model = Entity::find_by_id(id.get())
                .filter(Column::BusinessId.eq(business_id.into_inner()))
                .one(&self.db)
                .await
                .map_err(db_error)?;
            Ok(model.map(ReconciliationRecord::from))
        })
        .await
    }

    async fn upsert_from_statement(
        &self,
        upsert: &StatementUpsert,
    ) -> Result<UpsertOutcome, GatewayError> {
        self.bounded("upsert_from_statement", async {
            let now = Utc::now().fixed_offset();
            let row = daily_reconciliations::ActiveModel {
                id: NotSet,
                business_id: Set(upsert.business_id.into_inner()),
                branch_id: Set(upsert.branch_id.get()),
                recon_date: Set(upsert.recon_date),
                payment_method: Set(upsert.payment_method.as_str().to_owned()),
                net_system_amount: Set(Decimal::ZERO),
                actual_amount: Set(upsert.actual_amount),
                platform_fee: Set(upsert.platform_fee),
                status: Set(ReconStatus::Pending),
                notes: Set(None),
                verified_by: Set(None),
                verified_at: Set(None),
                created_at: Set(now),
                updated_at: Set(now),
            };

            // Records that left pending keep their statement values.
            let on_conflict = OnConflict::columns([
                Column::BusinessId,
                Column::BranchId,
                Column::ReconDate,
                Column::PaymentMethod,
            ])
            .update_columns([Column::ActualAmount, Column::PlatformFee, Column::UpdatedAt])
            .action_and_where(Expr::cust(
                "daily_reconciliations.status = 'pending'::recon_status",
            ))
            .to_owned();

            let rows = Entity::insert(row)
                .on_conflict(on_conflict)
                .exec_without_returning(&self.db)
                .await
                .map_err(db_error)?;

            Ok(if rows == 0 {
                UpsertOutcome::Frozen
            } else {
                UpsertOutcome::Applied
            })
        })
        .await
    }

    async fn update_actual_amount(&self, id: RecordId, amount: Decimal) -> Result<(), GatewayError> {
        self.bounded("update_actual_amount", async {
            let update = Entity::update_many().col_expr(Column::ActualAmount, Expr::value(amount));
            Self::guarded_update(&self.db, id, ReconStatus::Pending, update).await
        })
        .await
    }

    async fn confirm_match(
        &self,
        id: RecordId,
        bank_account_id: BankAccountId,
        verifier: UserId,
    ) -> Result<(), GatewayError> {
        self.bounded("confirm_match", async {
            let txn = self.db.begin().await.map_err(db_error)?;

            let update = Entity::update_many()
                .col_expr(Column::Status, status_value(ReconStatus::Approved))
                .col_expr(Column::VerifiedBy, Expr::value(verifier.into_inner()))
                .col_expr(Column::VerifiedAt, Expr::current_timestamp().into());
            Self::guarded_update(&txn, id, ReconStatus::Pending, update).await?;

            txn.execute(call(
                "SELECT post_reconciliation_to_ledger($1, $2, $3)",
                vec![
                    id.get().into(),
                    bank_account_id.get().into(),
                    verifier.into_inner().into(),
                ],
            ))
            .await
            .map_err(db_error)?;

            txn.commit().await.map_err(db_error)
        })
        .await
    }

    async fn mark_discrepancy(
        &self,
        id: RecordId,
        verifier: UserId,
        note: &str,
    ) -> Result<(), GatewayError> {
        self.bounded("mark_discrepancy", async {
            let update = Entity::update_many()
                .col_expr(Column::Status, status_value(ReconStatus::Discrepancy))
                .col_expr(Column::Notes, append_note(note))
                .col_expr(Column::VerifiedBy, Expr::value(verifier.into_inner()))
                .col_expr(Column::VerifiedAt, Expr::current_timestamp().into());
            Self::guarded_update(&self.db, id, ReconStatus::Pending, update).await
        })
        .await
    }

    async fn resolve_discrepancy(&self, id: RecordId, note: &str) -> Result<(), GatewayError> {
        self.bounded("resolve_discrepancy", async {
            let update = Entity::update_many()
                .col_expr(Column::Status, status_value(ReconStatus::Resolved))
                .col_expr(Column::Notes, append_note(note));
            Self::guarded_update(&self.db, id, ReconStatus::Discrepancy, update).await
        })
        .await
    }
}

impl FloatGateway for PgSettlementGateway {
    async fn list_unsettled_balances(
        &self,
        business_id: BusinessId,
    ) -> Result<Vec<TransitAccountBalance>, GatewayError> {
        self.bounded("list_unsettled_balances", async {
            let rows = BalanceRow::find_by_statement(call(
                "SELECT account_id, account_name, branch_id, branch_name, current_balance, last_activity \
                 FROM get_unsettled_balances($1)",
                vec![business_id.into_inner().into()],
            ))
            .all(&self.db)
            .await
            .map_err(db_error)?;
            Ok(rows.into_iter().map(TransitAccountBalance::from).collect())
        })
        .await
    }

    async fn settle_float_balance(&self, settlement: &FloatSettlement) -> Result<(), GatewayError> {
        self.bounded("settle_float_balance", async {
            self.db
                .execute(call(
                    "SELECT settle_float_balance($1, $2, $3, $4, $5)",
                    vec![
                        settlement.business_id.into_inner().into(),
                        settlement.account_id.get().into(),
                        settlement.amount.into(),
                        settlement.note.clone().into(),
                        settlement.verifier.into_inner().into(),
                    ],
                ))
                .await
                .map_err(db_error)?;
            Ok(())
        })
        .await
    }
}
