//! Header discovery and column role resolution.
//!
//! Settlement exports differ per provider and per locale, so the data table
//! is located by text markers and its columns are matched against an ordered
//! rule table rather than fixed positions.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::statement::cell::RawCell;
use crate::statement::error::IngestError;

/// Semantic role of a statement column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnRole {
    /// Transaction date.
    Date,
    /// Gross (original) transaction amount.
    Amount,
    /// Provider fee / MDR deducted from the amount.
    Fee,
}

impl ColumnRole {
    /// Returns the string representation of the role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Amount => "amount",
            Self::Fee => "fee",
        }
    }
}

impl fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered `(role, pattern)` rules. Within a role, earlier patterns take
/// precedence over later ones regardless of column position.
const COLUMN_RULES: &[(ColumnRole, &str)] = &[
    (ColumnRole::Date, r"(?i)transaction.*date"),
    (ColumnRole::Date, r"(?i)tanggal.*transaksi"),
    (ColumnRole::Date, r"(?i)date"),
    (ColumnRole::Date, r"(?i)tanggal"),
    (ColumnRole::Amount, r"(?i)original.*amount"),
    (ColumnRole::Amount, r"(?i)nominal"),
    (ColumnRole::Amount, r"(?i)amount"),
    (ColumnRole::Fee, r"(?i)mdr"),
    (ColumnRole::Fee, r"(?i)fee"),
];

/// Lower-case markers a header row must contain (one from each list).
const AMOUNT_MARKERS: &[&str] = &["original amount", "nominal"];
const DATE_MARKERS: &[&str] = &["transaction date", "date", "tanggal"];

static DEFAULT_RULES: LazyLock<ColumnRules> = LazyLock::new(|| {
    ColumnRules::from_table(COLUMN_RULES).expect("built-in column patterns are valid")
});

/// Column indices resolved from a header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolvedColumns {
    /// Index of the transaction date column.
    pub date: usize,
    /// Index of the amount column.
    pub amount: usize,
    /// Index of the fee column, if the statement has one.
    pub fee: Option<usize>,
}

/// Compiled column rule table.
#[derive(Debug)]
pub struct ColumnRules {
    rules: Vec<(ColumnRole, Regex)>,
}

impl ColumnRules {
    /// Compiles a rule table.
    pub fn from_table(table: &[(ColumnRole, &str)]) -> Result<Self, regex::Error> {
        let rules = table
            .iter()
            .map(|(role, pattern)| Ok((*role, Regex::new(pattern)?)))
            .collect::<Result<Vec<_>, regex::Error>>()?;
        Ok(Self { rules })
    }

    /// Returns the built-in rule table.
    #[must_use]
    pub fn builtin() -> &'static Self {
        &DEFAULT_RULES
    }

    /// Finds the column for `role`: the first rule that matches any header
    /// cell wins, and within that rule the leftmost matching cell.
    #[must_use]
    pub fn find(&self, role: ColumnRole, headers: &[String]) -> Option<usize> {
        self.rules
            .iter()
            .filter(|(r, _)| *r == role)
            .find_map(|(_, pattern)| headers.iter().position(|h| pattern.is_match(h)))
    }

    /// Resolves all column roles against a header row.
    pub fn resolve(&self, header: &[RawCell]) -> Result<ResolvedColumns, IngestError> {
        let headers: Vec<String> = header.iter().map(RawCell::text).collect();

        let date = self
            .find(ColumnRole::Date, &headers)
            .ok_or(IngestError::MissingColumn(ColumnRole::Date))?;
        let amount = self
            .find(ColumnRole::Amount, &headers)
            .ok_or(IngestError::MissingColumn(ColumnRole::Amount))?;
        let fee = self.find(ColumnRole::Fee, &headers);

        Ok(ResolvedColumns { date, amount, fee })
    }
}

/// Returns true if the row's joined, lower-cased text carries both an
/// amount marker and a date marker.
#[must_use]
pub fn is_header_row(row: &[RawCell]) -> bool {
    let joined = row
        .iter()
        .map(RawCell::text)
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    AMOUNT_MARKERS.iter().any(|m| joined.contains(m))
        && DATE_MARKERS.iter().any(|m| joined.contains(m))
}
