//! Raw statement cells.

use calamine::Data;
use chrono::NaiveDate;
use rekon_shared::DateSystem;
use rust_decimal::Decimal;

use crate::normalize::{clean_number, date_from_serial, decimal_from_cell_number, normalize_date_text};

/// A spreadsheet cell as delivered by the workbook, before normalization.
///
/// Only native cell types are distinguished; nothing is coerced on read.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    /// No value.
    Empty,
    /// Text, including numbers and dates typed as text.
    Text(String),
    /// Native number.
    Number(f64),
    /// Native date, already resolved against the workbook's epoch.
    Date(NaiveDate),
    /// Native boolean.
    Bool(bool),
}

impl RawCell {
    /// Returns true if the cell carries no visible content.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Returns the cell rendered as text, for header matching.
    #[must_use]
    pub fn text(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Text(s) => s.clone(),
            Self::Number(n) => n.to_string(),
            Self::Date(d) => d.to_string(),
            Self::Bool(b) => b.to_string(),
        }
    }

    /// Reads the cell as an amount; unusable content reads as zero.
    #[must_use]
    pub fn amount(&self) -> Decimal {
        match self {
            Self::Text(s) => clean_number(s),
            Self::Number(n) => decimal_from_cell_number(*n),
            Self::Empty | Self::Date(_) | Self::Bool(_) => Decimal::ZERO,
        }
    }

    /// Reads the cell as a calendar date.
    ///
    /// `system` only applies to plain numbers; native date cells carry
    /// their own epoch.
    #[must_use]
    pub fn date(&self, system: DateSystem) -> Option<NaiveDate> {
        match self {
            Self::Text(s) => normalize_date_text(s),
            Self::Number(n) => date_from_serial(*n, system),
            Self::Date(d) => Some(*d),
            Self::Empty | Self::Bool(_) => None,
        }
    }
}

impl From<&Data> for RawCell {
    fn from(data: &Data) -> Self {
        match data {
            Data::String(s) => Self::Text(s.clone()),
            Data::Float(n) => Self::Number(*n),
            #[allow(clippy::cast_precision_loss)]
            Data::Int(n) => Self::Number(*n as f64),
            Data::Bool(b) => Self::Bool(*b),
            Data::DateTime(dt) if dt.is_datetime() => dt
                .as_datetime()
                .map_or(Self::Empty, |value| Self::Date(value.date())),
            // ISO datetimes (ODS) keep only their date part.
            Data::DateTimeIso(s) => Self::Text(s.split('T').next().unwrap_or_default().to_string()),
            Data::DateTime(_) | Data::DurationIso(_) | Data::Error(_) | Data::Empty => Self::Empty,
        }
    }
}
