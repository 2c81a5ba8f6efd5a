//! Statement ingestion error types.

use thiserror::Error;

use crate::statement::columns::ColumnRole;

/// Errors that reject a whole statement import.
///
/// Row-level problems never surface here: unusable rows are skipped and only
/// counted.
#[derive(Debug, Error)]
pub enum IngestError {
    /// No header row was found within the scan window.
    #[error("Statement format not recognized")]
    FormatNotRecognized,

    /// The header row lacks a column for a required role.
    #[error("Statement has no {0} column")]
    MissingColumn(ColumnRole),

    /// The requested sheet is not in the workbook.
    #[error("Sheet '{0}' not found in workbook")]
    SheetNotFound(String),

    /// The workbook contains no sheets.
    #[error("Workbook contains no sheets")]
    EmptyWorkbook,

    /// The file could not be decoded as a spreadsheet.
    #[error("Unreadable workbook: {0}")]
    Workbook(String),
}

impl IngestError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::FormatNotRecognized | Self::MissingColumn(_) => 422,
            Self::SheetNotFound(_) => 404,
            Self::EmptyWorkbook | Self::Workbook(_) => 400,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::FormatNotRecognized => "FORMAT_NOT_RECOGNIZED",
            Self::MissingColumn(_) => "MISSING_COLUMN",
            Self::SheetNotFound(_) => "SHEET_NOT_FOUND",
            Self::EmptyWorkbook => "EMPTY_WORKBOOK",
            Self::Workbook(_) => "UNREADABLE_WORKBOOK",
        }
    }
}
