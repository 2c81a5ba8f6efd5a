//! Per-day system totals refresh ahead of the reconciliation view.

use std::sync::Arc;

use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use rekon_shared::ReconciliationConfig;
use rekon_shared::types::BranchId;
use serde::Serialize;

use crate::gateway::{RecordQuery, ReconciliationGateway};
use crate::reconciliation::{ReconciliationRecord, sort_newest_first};
use crate::sync::error::SyncError;

/// Sync limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOptions {
    /// Widest range refreshed in one request, in days.
    pub max_days: u32,
    /// Days synced at the same time.
    pub concurrency: usize,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            max_days: 62,
            concurrency: 8,
        }
    }
}

impl From<&ReconciliationConfig> for SyncOptions {
    fn from(config: &ReconciliationConfig) -> Self {
        Self {
            max_days: config.max_sync_days,
            concurrency: config.sync_concurrency,
        }
    }
}

/// Outcome of a range refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// First day.
    pub from: NaiveDate,
    /// Last day.
    pub to: NaiveDate,
    /// Days refreshed successfully.
    pub days_synced: usize,
    /// Days whose refresh failed, ascending.
    pub failed: Vec<NaiveDate>,
}

/// Records of a range, after a refresh.
#[derive(Debug, Clone, Serialize)]
pub struct ReconciliationView {
    /// Refresh outcome.
    pub sync: Option<SyncReport>,
    /// Records, newest day first.
    pub records: Vec<ReconciliationRecord>,
}

/// Refreshes system totals for every day of a range before records are
/// read.
///
/// Days are synced concurrently and awaited as a group. A failed day does
/// not block the view; it is reported and its stale totals are shown.
pub struct SyncCoordinator<G: ReconciliationGateway> {
    gateway: Arc<G>,
    options: SyncOptions,
}

impl<G: ReconciliationGateway> SyncCoordinator<G> {
    /// Create a new coordinator.
    #[must_use]
    pub fn new(gateway: Arc<G>, options: SyncOptions) -> Self {
        Self { gateway, options }
    }

    /// Recomputes the system totals of each day in `from..=to`.
    pub async fn refresh_range(
        &self,
        branch_id: BranchId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<SyncReport, SyncError> {
        if from > to {
            return Err(SyncError::InvalidRange { from, to });
        }
        let days = (to - from).num_days() + 1;
        if days > i64::from(self.options.max_days) {
            return Err(SyncError::RangeTooWide {
                days,
                max: self.options.max_days,
            });
        }

        let gateway = &*self.gateway;
        let outcomes: Vec<_> = stream::iter(from.iter_days().take_while(|d| *d <= to))
            .map(|date| async move { (date, gateway.sync_daily_sales(branch_id, date).await) })
            .buffer_unordered(self.options.concurrency.max(1))
            .collect()
            .await;

        let mut failed = Vec::new();
        let mut days_synced = 0;
        for (date, outcome) in outcomes {
            match outcome {
                Ok(()) => days_synced += 1,
                Err(e) => {
                    tracing::warn!(branch_id = %branch_id, date = %date, error = %e, "Daily sales sync failed");
                    failed.push(date);
                }
            }
        }
        failed.sort_unstable();

        tracing::debug!(branch_id = %branch_id, %from, %to, days_synced, failed = failed.len(), "Range synced");

        Ok(SyncReport {
            from,
            to,
            days_synced,
            failed,
        })
    }

    /// Refreshes the query's range, then lists its records.
    pub async fn load_view(&self, query: &RecordQuery) -> Result<ReconciliationView, SyncError> {
        let sync = self
            .refresh_range(query.branch_id, query.from, query.to)
            .await?;
        let mut records = self.gateway.list_records(query).await?;
        sort_newest_first(&mut records);

        Ok(ReconciliationView {
            sync: Some(sync),
            records,
        })
    }

    /// Lists records without refreshing.
    pub async fn list_only(&self, query: &RecordQuery) -> Result<ReconciliationView, SyncError> {
        if query.from > query.to {
            return Err(SyncError::InvalidRange {
                from: query.from,
                to: query.to,
            });
        }
        let mut records = self.gateway.list_records(query).await?;
        sort_newest_first(&mut records);

        Ok(ReconciliationView { sync: None, records })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rekon_shared::types::BusinessId;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    use crate::testing::MockGateway;

    fn ymd(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, m, d).unwrap()
    }

    fn business() -> BusinessId {
        BusinessId(Uuid::from_u128(1))
    }

    fn coordinator(gateway: &Arc<MockGateway>) -> SyncCoordinator<MockGateway> {
        SyncCoordinator::new(
            Arc::clone(gateway),
            SyncOptions {
                max_days: 31,
                concurrency: 4,
            },
        )
    }

    #[tokio::test]
    async fn test_refresh_syncs_every_day() {
        let gateway = Arc::new(MockGateway::new());
        let report = coordinator(&gateway)
            .refresh_range(BranchId(1), ymd(1, 1), ymd(1, 7))
            .await
            .unwrap();

        assert_eq!(report.days_synced, 7);
        assert!(report.failed.is_empty());

        let mut synced = gateway.synced_days();
        synced.sort_unstable();
        let expected: Vec<_> = (1..=7).map(|d| ymd(1, d)).collect();
        assert_eq!(synced, expected);
    }

    #[tokio::test]
    async fn test_failed_days_do_not_block_view() {
        let gateway = Arc::new(MockGateway::new());
        gateway.fail_sync_on(ymd(1, 3));
        gateway.seed_record(business(), BranchId(1), ymd(1, 2), "qris", dec!(10), dec!(0));
        gateway.seed_record(business(), BranchId(1), ymd(1, 4), "qris", dec!(20), dec!(0));

        let query = RecordQuery {
            business_id: business(),
            branch_id: BranchId(1),
            from: ymd(1, 1),
            to: ymd(1, 5),
            payment_method: None,
        };
        let view = coordinator(&gateway).load_view(&query).await.unwrap();

        let sync = view.sync.unwrap();
        assert_eq!(sync.days_synced, 4);
        assert_eq!(sync.failed, vec![ymd(1, 3)]);
        let dates: Vec<_> = view.records.iter().map(|r| r.recon_date).collect();
        assert_eq!(dates, vec![ymd(1, 4), ymd(1, 2)]);
    }

    #[tokio::test]
    async fn test_range_guards() {
        let gateway = Arc::new(MockGateway::new());
        let sync = coordinator(&gateway);

        assert!(matches!(
            sync.refresh_range(BranchId(1), ymd(1, 5), ymd(1, 4)).await,
            Err(SyncError::InvalidRange { .. })
        ));
        assert!(matches!(
            sync.refresh_range(BranchId(1), ymd(1, 1), ymd(2, 1)).await,
            Err(SyncError::RangeTooWide { days: 32, max: 31 })
        ));
        assert!(gateway.calls().is_empty());

        let single = sync.refresh_range(BranchId(1), ymd(1, 5), ymd(1, 5)).await.unwrap();
        assert_eq!(single.days_synced, 1);
    }

    #[tokio::test]
    async fn test_list_only_skips_refresh() {
        let gateway = Arc::new(MockGateway::new());
        let query = RecordQuery {
            business_id: business(),
            branch_id: BranchId(1),
            from: ymd(1, 1),
            to: ymd(1, 5),
            payment_method: None,
        };
        let view = coordinator(&gateway).list_only(&query).await.unwrap();
        assert!(view.sync.is_none());
        assert_eq!(gateway.call_count("sync_daily_sales"), 0);
    }
}
