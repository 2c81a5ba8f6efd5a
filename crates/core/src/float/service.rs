//! Unsettled float tracking and settlement.

use std::sync::Arc;

use rekon_shared::types::{BusinessId, TransitAccountId, UserId};
use rust_decimal::Decimal;

use crate::float::error::FloatError;
use crate::float::types::{SettlementKind, SettlementOutcome, TransitAccountBalance};
use crate::gateway::{FloatGateway, FloatSettlement, GatewayError};

/// Tracks balances parked in transit accounts and settles them.
///
/// Balances are never adjusted locally; after a settlement they are read
/// back from the ledger.
pub struct FloatTracker<G: FloatGateway> {
    gateway: Arc<G>,
}

impl<G: FloatGateway> FloatTracker<G> {
    /// Create a new float tracker.
    #[must_use]
    pub fn new(gateway: Arc<G>) -> Self {
        Self { gateway }
    }

    /// Lists transit accounts with an unsettled balance.
    pub async fn list_unsettled(
        &self,
        business_id: BusinessId,
    ) -> Result<Vec<TransitAccountBalance>, FloatError> {
        Ok(self.gateway.list_unsettled_balances(business_id).await?)
    }

    /// Settles part of a transit balance.
    ///
    /// A positive amount is a transfer to the head-office bank, a negative
    /// one a non-cash adjustment. Both go through the same ledger posting.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAmount` for zero without contacting the store. Once
    /// the posting is committed the call succeeds, even if the balances
    /// cannot be refreshed.
    pub async fn settle(
        &self,
        business_id: BusinessId,
        account_id: TransitAccountId,
        amount: Decimal,
        note: &str,
        verifier: UserId,
    ) -> Result<SettlementOutcome, FloatError> {
        if amount.is_zero() {
            return Err(FloatError::InvalidAmount);
        }

        let kind = SettlementKind::from_amount(amount);
        let settlement = FloatSettlement {
            business_id,
            account_id,
            amount,
            note: note.trim().to_string(),
            verifier,
        };

        self.gateway
            .settle_float_balance(&settlement)
            .await
            .map_err(|e| match e {
                GatewayError::NotFound(_) => FloatError::AccountNotFound(account_id),
                other => FloatError::Gateway(other),
            })?;

        tracing::info!(
            account_id = %account_id,
            %amount,
            kind = ?kind,
            "Float balance settled"
        );

        let balances = match self.gateway.list_unsettled_balances(business_id).await {
            Ok(balances) => Some(balances),
            Err(error) => {
                tracing::warn!(
                    account_id = %account_id,
                    error = %error,
                    "Balances not refreshed after settlement"
                );
                None
            }
        };

        Ok(SettlementOutcome {
            kind,
            amount,
            message: kind.message().to_string(),
            balances,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rekon_shared::types::BranchId;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    use crate::testing::MockGateway;

    fn business() -> BusinessId {
        BusinessId(Uuid::from_u128(1))
    }

    fn verifier() -> UserId {
        UserId(Uuid::from_u128(2))
    }

    fn setup() -> (Arc<MockGateway>, FloatTracker<MockGateway>) {
        let gateway = Arc::new(MockGateway::new());
        gateway.seed_balance(TransitAccountId(9), BranchId(1), dec!(120000));
        let tracker = FloatTracker::new(Arc::clone(&gateway));
        (gateway, tracker)
    }

    #[tokio::test]
    async fn test_negative_amount_is_adjustment() {
        let (gateway, tracker) = setup();

        let outcome = tracker
            .settle(business(), TransitAccountId(9), dec!(-50000), "write-off", verifier())
            .await
            .unwrap();

        assert_eq!(outcome.kind, SettlementKind::Adjustment);
        assert!(outcome.message.contains("Adjustment"));
        assert!(!outcome.message.contains("dicairkan"));

        let posted = gateway.settlements();
        assert_eq!(posted.len(), 1);
        assert_eq!(posted[0].amount, dec!(-50000));
        assert_eq!(posted[0].note, "write-off");
    }

    #[tokio::test]
    async fn test_positive_amount_is_disbursement_and_refetches() {
        let (gateway, tracker) = setup();

        let outcome = tracker
            .settle(business(), TransitAccountId(9), dec!(120000), "", verifier())
            .await
            .unwrap();

        assert_eq!(outcome.kind, SettlementKind::Disbursement);
        assert!(outcome.message.contains("dicairkan"));
        assert_eq!(outcome.balances, Some(Vec::new()));
        assert_eq!(gateway.call_count("list_unsettled_balances"), 1);
    }

    #[tokio::test]
    async fn test_posting_stands_when_refresh_fails() {
        let (gateway, tracker) = setup();
        gateway.fail_balance_reads();

        let outcome = tracker
            .settle(business(), TransitAccountId(9), dec!(70000), "transfer BCA", verifier())
            .await
            .unwrap();

        assert_eq!(outcome.kind, SettlementKind::Disbursement);
        assert_eq!(outcome.balances, None);
        assert_eq!(gateway.settlements().len(), 1);
    }

    #[tokio::test]
    async fn test_zero_amount_rejected_before_any_call() {
        let (gateway, tracker) = setup();

        let result = tracker
            .settle(business(), TransitAccountId(9), Decimal::ZERO, "noop", verifier())
            .await;

        assert!(matches!(result, Err(FloatError::InvalidAmount)));
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_account() {
        let (_gateway, tracker) = setup();

        let result = tracker
            .settle(business(), TransitAccountId(404), dec!(10), "", verifier())
            .await;
        assert!(matches!(result, Err(FloatError::AccountNotFound(TransitAccountId(404)))));
    }

    #[tokio::test]
    async fn test_list_unsettled() {
        let (_gateway, tracker) = setup();
        let balances = tracker.list_unsettled(business()).await.unwrap();
        assert_eq!(balances.len(), 1);
        assert_eq!(balances[0].current_balance, dec!(120000));
    }
}
