//! Settlement statement ingestion.

use std::collections::BTreeMap;
use std::io::Cursor;

use calamine::{Data, Range, Reader, open_workbook_auto_from_rs};
use chrono::NaiveDate;
use rekon_shared::{DateSystem, ReconciliationConfig};
use rust_decimal::Decimal;

use crate::statement::cell::RawCell;
use crate::statement::columns::{ColumnRules, ResolvedColumns, is_header_row};
use crate::statement::error::IngestError;
use crate::statement::types::{DailyAggregate, StatementImport};

/// Default number of leading rows searched for the header.
pub const DEFAULT_HEADER_SCAN_ROWS: usize = 30;

/// Ingestion settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestOptions {
    /// Number of leading rows searched for the header.
    pub header_scan_rows: usize,
    /// Epoch used for numeric date cells.
    pub date_system: DateSystem,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            header_scan_rows: DEFAULT_HEADER_SCAN_ROWS,
            date_system: DateSystem::Excel1900,
        }
    }
}

impl From<&ReconciliationConfig> for IngestOptions {
    fn from(config: &ReconciliationConfig) -> Self {
        Self {
            header_scan_rows: config.header_scan_rows,
            date_system: config.date_system,
        }
    }
}

/// Turns uploaded settlement spreadsheets into per-date aggregates.
///
/// Ingestion is a pure function of the input bytes: nothing is kept between
/// calls, and a rejected statement produces no aggregates at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatementIngestor {
    options: IngestOptions,
}

impl StatementIngestor {
    /// Creates an ingestor with the given options.
    #[must_use]
    pub const fn new(options: IngestOptions) -> Self {
        Self { options }
    }

    /// Returns the ingestor's options.
    #[must_use]
    pub const fn options(&self) -> IngestOptions {
        self.options
    }

    /// Lists the sheets of a workbook in workbook order.
    pub fn sheet_names(bytes: &[u8]) -> Result<Vec<String>, IngestError> {
        let workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
            .map_err(|e| IngestError::Workbook(e.to_string()))?;
        Ok(workbook.sheet_names())
    }

    /// Ingests one sheet of a workbook.
    ///
    /// With no sheet name the first sheet is used.
    ///
    /// # Errors
    ///
    /// Returns `Workbook` if the bytes are not a spreadsheet, `EmptyWorkbook`
    /// or `SheetNotFound` if the sheet cannot be selected, and
    /// `FormatNotRecognized` or `MissingColumn` if the sheet holds no
    /// recognizable statement table.
    pub fn ingest(&self, bytes: &[u8], sheet: Option<&str>) -> Result<StatementImport, IngestError> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
            .map_err(|e| IngestError::Workbook(e.to_string()))?;

        let names = workbook.sheet_names();
        let sheet_name = match sheet {
            Some(requested) => names
                .iter()
                .find(|n| n.as_str() == requested)
                .cloned()
                .ok_or_else(|| IngestError::SheetNotFound(requested.to_string()))?,
            None => names.first().cloned().ok_or(IngestError::EmptyWorkbook)?,
        };

        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| IngestError::Workbook(e.to_string()))?;

        let rows = sheet_rows(&range);
        let mut import = self.ingest_rows(&rows)?;
        import.sheet = sheet_name;

        tracing::info!(
            sheet = %import.sheet,
            header_row = import.header_row,
            rows_read = import.rows_read,
            rows_skipped = import.rows_skipped,
            days = import.aggregates.len(),
            "Statement ingested"
        );

        Ok(import)
    }

    /// Ingests already-decoded rows.
    ///
    /// The returned import has an empty sheet name.
    pub fn ingest_rows(&self, rows: &[Vec<RawCell>]) -> Result<StatementImport, IngestError> {
        let scan = self.options.header_scan_rows.min(rows.len());
        let header_row = rows[..scan]
            .iter()
            .position(|row| is_header_row(row))
            .ok_or(IngestError::FormatNotRecognized)?;

        let columns = ColumnRules::builtin().resolve(&rows[header_row])?;

        let mut daily: BTreeMap<NaiveDate, (Decimal, Decimal)> = BTreeMap::new();
        let mut rows_read = 0;
        let mut rows_skipped = 0;

        for row in &rows[header_row + 1..] {
            if row.iter().all(RawCell::is_blank) {
                continue;
            }
            rows_read += 1;

            let Some((date, amount, fee)) = self.extract(row, columns) else {
                rows_skipped += 1;
                continue;
            };

            let entry = daily.entry(date).or_insert((Decimal::ZERO, Decimal::ZERO));
            entry.0 += amount - fee;
            entry.1 += fee;
        }

        if rows_skipped > 0 {
            tracing::debug!(rows_read, rows_skipped, "Statement rows skipped");
        }

        let aggregates = daily
            .into_iter()
            .map(|(date, (amount, fee))| DailyAggregate { date, amount, fee })
            .collect();

        Ok(StatementImport {
            sheet: String::new(),
            header_row,
            columns,
            rows_read,
            rows_skipped,
            aggregates,
        })
    }

    /// Reads `(date, amount, fee)` from a data row, or `None` if the row
    /// has no usable date or a non-positive amount.
    fn extract(&self, row: &[RawCell], columns: ResolvedColumns) -> Option<(NaiveDate, Decimal, Decimal)> {
        let cell = |idx: usize| row.get(idx).unwrap_or(&RawCell::Empty);

        let date = cell(columns.date).date(self.options.date_system)?;
        let amount = cell(columns.amount).amount();
        if amount <= Decimal::ZERO {
            return None;
        }
        let fee = columns.fee.map_or(Decimal::ZERO, |idx| cell(idx).amount());

        Some((date, amount, fee))
    }
}

/// Expands a worksheet range into rows indexed from the sheet's top-left
/// cell, so row and column indices match what the user sees.
fn sheet_rows(range: &Range<Data>) -> Vec<Vec<RawCell>> {
    let Some((start_row, start_col)) = range.start() else {
        return Vec::new();
    };

    let mut rows: Vec<Vec<RawCell>> = (0..start_row).map(|_| Vec::new()).collect();
    rows.extend(range.rows().map(|cells| {
        let mut row: Vec<RawCell> = (0..start_col).map(|_| RawCell::Empty).collect();
        row.extend(cells.iter().map(RawCell::from));
        row
    }));
    rows
}
