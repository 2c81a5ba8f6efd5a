//! Daily reconciliation records.
//!
//! The ledger, branch, bank and transit account tables, and the stored
//! functions this service calls, belong to the accounting store and are
//! not created here.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(ENUMS_SQL).await?;
        db.execute_unprepared(DAILY_RECONCILIATIONS_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_SQL).await?;
        Ok(())
    }
}

const ENUMS_SQL: &str = r"
CREATE TYPE recon_status AS ENUM (
    'pending',
    'approved',
    'discrepancy',
    'resolved'
);
";

const DAILY_RECONCILIATIONS_SQL: &str = r"
CREATE TABLE daily_reconciliations (
    id BIGSERIAL PRIMARY KEY,
    business_id UUID NOT NULL,
    branch_id BIGINT NOT NULL,
    recon_date DATE NOT NULL,
    payment_method VARCHAR(50) NOT NULL,
    net_system_amount NUMERIC(18, 2) NOT NULL DEFAULT 0,
    actual_amount NUMERIC(18, 2) NOT NULL DEFAULT 0,
    platform_fee NUMERIC(18, 2) NOT NULL DEFAULT 0,
    status recon_status NOT NULL DEFAULT 'pending',
    notes TEXT,
    verified_by UUID,
    verified_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_payment_method_lower CHECK (payment_method = lower(btrim(payment_method))),
    CONSTRAINT chk_actual_non_negative CHECK (actual_amount >= 0)
);

-- Natural key: statement upserts and the sales sync both write through it
CREATE UNIQUE INDEX uq_daily_reconciliations_natural_key
    ON daily_reconciliations(business_id, branch_id, recon_date, payment_method);

-- Reconciliation view: one branch over a date range
CREATE INDEX idx_daily_reconciliations_branch_date
    ON daily_reconciliations(business_id, branch_id, recon_date DESC);

-- Open work queue
CREATE INDEX idx_daily_reconciliations_open
    ON daily_reconciliations(business_id, recon_date)
    WHERE status IN ('pending', 'discrepancy');
";

const DROP_SQL: &str = r"
DROP TABLE IF EXISTS daily_reconciliations CASCADE;
DROP TYPE IF EXISTS recon_status;
";
