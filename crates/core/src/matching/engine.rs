//! Statement vs. system matching.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use rekon_shared::types::BranchId;
use rust_decimal::Decimal;

use crate::gateway::{GatewayError, ReconciliationGateway, StatementUpsert, UpsertOutcome};
use crate::matching::types::{ApplyFailure, ApplyReport, ApplyScope, MatchResult};
use crate::reconciliation::ReconciliationRecord;
use crate::statement::DailyAggregate;

/// Compares statement aggregates with reconciliation records and writes
/// the statement side back.
pub struct MatchEngine;

impl MatchEngine {
    /// Matches statement aggregates against existing records, newest day
    /// first.
    ///
    /// Records are expected to be one branch and payment method. A day with
    /// nothing on either side is omitted.
    #[must_use]
    pub fn match_daily(
        branch_id: BranchId,
        aggregates: &[DailyAggregate],
        records: &[ReconciliationRecord],
    ) -> Vec<MatchResult> {
        let by_date: BTreeMap<NaiveDate, &DailyAggregate> =
            aggregates.iter().map(|a| (a.date, a)).collect();

        let mut records_by_date: BTreeMap<NaiveDate, &ReconciliationRecord> = BTreeMap::new();
        for record in records {
            records_by_date.entry(record.recon_date).or_insert(record);
        }

        let dates: BTreeSet<NaiveDate> = by_date
            .keys()
            .chain(records_by_date.keys())
            .copied()
            .collect();

        dates
            .into_iter()
            .rev()
            .filter_map(|date| {
                let record = records_by_date.get(&date).copied();
                let aggregate = by_date.get(&date).copied();

                let target = record.map_or(Decimal::ZERO, |r| r.net_system_amount);
                let found = aggregate.map_or(Decimal::ZERO, |a| a.amount);
                let found_fee = aggregate.map_or(Decimal::ZERO, |a| a.fee);

                if target.is_zero() && found.is_zero() {
                    return None;
                }

                Some(MatchResult {
                    recon_date: date,
                    branch_id,
                    target,
                    found,
                    found_fee,
                    variance: found - target,
                    existing_record_id: record.map(|r| r.id),
                    existing_status: record.map(|r| r.status),
                })
            })
            .collect()
    }

    /// Writes statement amounts into the records, one day at a time.
    ///
    /// Days with no statement amount are left untouched, so applying never
    /// zeroes an existing actual amount. The first failed upsert stops the
    /// run.
    pub async fn apply<G: ReconciliationGateway>(
        gateway: &G,
        scope: &ApplyScope,
        results: &[MatchResult],
    ) -> ApplyReport {
        let mut report = ApplyReport::default();

        for (idx, result) in results.iter().enumerate() {
            if result.found <= Decimal::ZERO {
                report.skipped_zero.push(result.recon_date);
                continue;
            }

            let upsert = StatementUpsert {
                business_id: scope.business_id,
                branch_id: scope.branch_id,
                recon_date: result.recon_date,
                payment_method: scope.payment_method.clone(),
                actual_amount: result.found,
                platform_fee: result.found_fee,
            };

            match gateway.upsert_from_statement(&upsert).await {
                Ok(UpsertOutcome::Applied) => report.applied.push(result.recon_date),
                Ok(UpsertOutcome::Frozen) => report.skipped_frozen.push(result.recon_date),
                Err(error) => {
                    tracing::error!(
                        branch_id = %scope.branch_id,
                        date = %result.recon_date,
                        error = %error,
                        "Statement apply stopped"
                    );
                    report.failure = Some(failure(result.recon_date, error));
                    report.not_attempted = results[idx + 1..]
                        .iter()
                        .map(|r| r.recon_date)
                        .collect();
                    break;
                }
            }
        }

        tracing::info!(
            branch_id = %scope.branch_id,
            method = %scope.payment_method,
            applied = report.applied.len(),
            frozen = report.skipped_frozen.len(),
            "Statement applied"
        );

        report
    }
}

fn failure(date: NaiveDate, error: GatewayError) -> ApplyFailure {
    ApplyFailure {
        date,
        message: error.to_string(),
        error,
    }
}
