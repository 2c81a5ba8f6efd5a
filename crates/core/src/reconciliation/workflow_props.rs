//! Property-based tests for `ReconWorkflow`.

use chrono::NaiveDate;
use proptest::prelude::*;
use rekon_shared::types::{BankAccountId, BranchId, BusinessId, RecordId, UserId};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::reconciliation::error::ReconError;
use crate::reconciliation::types::{PaymentMethod, ReconStatus, ReconciliationRecord};
use crate::reconciliation::workflow::ReconWorkflow;

fn arb_status() -> impl Strategy<Value = ReconStatus> {
    prop_oneof![
        Just(ReconStatus::Pending),
        Just(ReconStatus::Approved),
        Just(ReconStatus::Discrepancy),
        Just(ReconStatus::Resolved),
    ]
}

/// Amounts in whole rupiah with up to two decimals.
fn arb_amount() -> impl Strategy<Value = Decimal> {
    (0i64..1_000_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

fn arb_user() -> impl Strategy<Value = UserId> {
    any::<u128>().prop_map(|n| UserId(Uuid::from_u128(n)))
}

fn record(status: ReconStatus, target: Decimal, actual: Decimal) -> ReconciliationRecord {
    ReconciliationRecord {
        id: RecordId(1),
        business_id: BusinessId(Uuid::nil()),
        branch_id: BranchId(1),
        recon_date: NaiveDate::from_ymd_opt(2025, 1, 10).unwrap_or_default(),
        payment_method: PaymentMethod::new("qris"),
        net_system_amount: target,
        actual_amount: actual,
        platform_fee: Decimal::ZERO,
        status,
        notes: None,
        verified_by: None,
        verified_at: None,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Every action that validates moves along an allowed edge.
    #[test]
    fn prop_actions_follow_valid_transitions(
        status in arb_status(),
        target in arb_amount(),
        actual in arb_amount(),
        user in arb_user(),
    ) {
        let rec = record(status, target, actual);
        let attempts = [
            ReconWorkflow::approve(&rec, Some(BankAccountId(5)), user),
            ReconWorkflow::reject(&rec, "reason", user),
            ReconWorkflow::investigate(&rec, user),
            ReconWorkflow::resolve(&rec, "note"),
        ];

        for action in attempts.into_iter().flatten() {
            prop_assert_eq!(action.expected_status(), status);
            prop_assert!(ReconWorkflow::is_valid_transition(status, action.new_status()));
        }
    }

    /// Frozen records never accept an amount edit.
    #[test]
    fn prop_frozen_records_reject_edits(
        status in prop_oneof![Just(ReconStatus::Approved), Just(ReconStatus::Resolved)],
        amount in arb_amount(),
    ) {
        let rec = record(status, amount, amount);
        prop_assert!(
            matches!(ReconWorkflow::edit_actual(&rec, amount), Err(ReconError::RecordFrozen(_))),
            "frozen record accepted an edit"
        );
    }

    /// Approval succeeds exactly for pending exact matches.
    #[test]
    fn prop_approve_iff_exact_match(
        target in arb_amount(),
        actual in arb_amount(),
        user in arb_user(),
    ) {
        let rec = record(ReconStatus::Pending, target, actual);
        let approved = ReconWorkflow::approve(&rec, Some(BankAccountId(1)), user).is_ok();
        prop_assert_eq!(approved, rec.is_exact_match());
    }

    /// Investigation succeeds exactly when the variance is non-zero.
    #[test]
    fn prop_investigate_iff_variance(
        target in arb_amount(),
        actual in arb_amount(),
        user in arb_user(),
    ) {
        let rec = record(ReconStatus::Pending, target, actual);
        prop_assert_eq!(
            ReconWorkflow::investigate(&rec, user).is_ok(),
            !rec.variance().is_zero()
        );
    }

    /// Terminal states have no outgoing transitions.
    #[test]
    fn prop_terminal_states(to in arb_status()) {
        prop_assert!(!ReconWorkflow::is_valid_transition(ReconStatus::Approved, to));
        prop_assert!(!ReconWorkflow::is_valid_transition(ReconStatus::Resolved, to));
    }
}
