//! Property-based tests for `MatchEngine::match_daily`.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use proptest::prelude::*;
use rekon_shared::types::{BranchId, BusinessId, RecordId};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::matching::engine::MatchEngine;
use crate::reconciliation::{PaymentMethod, ReconStatus, ReconciliationRecord};
use crate::statement::DailyAggregate;

fn day(offset: u8) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap_or_default() + chrono::Days::new(u64::from(offset))
}

fn arb_amount() -> impl Strategy<Value = Decimal> {
    prop_oneof![
        Just(Decimal::ZERO),
        (1i64..100_000_000).prop_map(|n| Decimal::new(n, 2)),
    ]
}

/// Aggregates on distinct days within a two-month window.
fn arb_aggregates() -> impl Strategy<Value = Vec<DailyAggregate>> {
    prop::collection::btree_map(0u8..60, (arb_amount(), arb_amount()), 0..20).prop_map(|m| {
        m.into_iter()
            .map(|(d, (amount, fee))| DailyAggregate { date: day(d), amount, fee })
            .collect()
    })
}

/// Records on distinct days within the same window.
fn arb_records() -> impl Strategy<Value = Vec<ReconciliationRecord>> {
    prop::collection::btree_map(0u8..60, arb_amount(), 0..20).prop_map(|m| {
        m.into_iter()
            .enumerate()
            .map(|(i, (d, net))| ReconciliationRecord {
                id: RecordId(i64::try_from(i).unwrap_or_default() + 1),
                business_id: BusinessId(Uuid::nil()),
                branch_id: BranchId(1),
                recon_date: day(d),
                payment_method: PaymentMethod::new("qris"),
                net_system_amount: net,
                actual_amount: Decimal::ZERO,
                platform_fee: Decimal::ZERO,
                status: ReconStatus::Pending,
                notes: None,
                verified_by: None,
                verified_at: None,
            })
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Variance is always found minus target.
    #[test]
    fn prop_variance_is_found_minus_target(
        aggregates in arb_aggregates(),
        records in arb_records(),
    ) {
        for r in MatchEngine::match_daily(BranchId(1), &aggregates, &records) {
            prop_assert_eq!(r.variance, r.found - r.target);
            prop_assert_eq!(r.is_exact_match(), r.variance.is_zero() && r.found > Decimal::ZERO);
        }
    }

    /// Results cover exactly the union of days with a non-zero side, newest
    /// first, once each.
    #[test]
    fn prop_results_cover_non_empty_union(
        aggregates in arb_aggregates(),
        records in arb_records(),
    ) {
        let results = MatchEngine::match_daily(BranchId(1), &aggregates, &records);

        let expected: BTreeSet<NaiveDate> = aggregates
            .iter()
            .filter(|a| !a.amount.is_zero())
            .map(|a| a.date)
            .chain(records.iter().filter(|r| !r.net_system_amount.is_zero()).map(|r| r.recon_date))
            .collect();
        let got: Vec<NaiveDate> = results.iter().map(|r| r.recon_date).collect();
        let mut want: Vec<NaiveDate> = expected.into_iter().collect();
        want.reverse();

        prop_assert_eq!(got, want);
    }

    /// Matching is deterministic.
    #[test]
    fn prop_match_is_pure(aggregates in arb_aggregates(), records in arb_records()) {
        prop_assert_eq!(
            MatchEngine::match_daily(BranchId(1), &aggregates, &records),
            MatchEngine::match_daily(BranchId(1), &aggregates, &records)
        );
    }
}
