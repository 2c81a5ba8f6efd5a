//! Statement import types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::statement::columns::ResolvedColumns;

/// Statement totals for one calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DailyAggregate {
    /// Transaction date.
    pub date: NaiveDate,
    /// Sum of `amount - fee` over the day's rows.
    pub amount: Decimal,
    /// Sum of fees over the day's rows.
    pub fee: Decimal,
}

/// Result of ingesting one statement sheet.
#[derive(Debug, Clone, Serialize)]
pub struct StatementImport {
    /// Sheet the rows were read from.
    pub sheet: String,
    /// 0-based index of the discovered header row.
    pub header_row: usize,
    /// Resolved column indices.
    pub columns: ResolvedColumns,
    /// Non-blank data rows read after the header.
    pub rows_read: usize,
    /// Rows dropped for an unreadable date or a non-positive amount.
    pub rows_skipped: usize,
    /// Per-date totals, ascending by date.
    pub aggregates: Vec<DailyAggregate>,
}

impl StatementImport {
    /// Returns the first and last aggregated dates.
    #[must_use]
    pub fn date_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.aggregates.first()?.date;
        let last = self.aggregates.last()?.date;
        Some((first, last))
    }

    /// Returns the aggregated net amount over all dates.
    #[must_use]
    pub fn total_amount(&self) -> Decimal {
        self.aggregates.iter().map(|a| a.amount).sum()
    }
}
