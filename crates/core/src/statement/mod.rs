//! Settlement statement ingestion.
//!
//! Provider exports are semi-structured: the data table can sit below a
//! free-text preamble, column names vary by provider and language, and
//! dates arrive either as text or as spreadsheet serials. This module
//! locates the table, resolves column roles, normalizes each row and
//! aggregates net amounts per calendar date.

pub mod cell;
pub mod columns;
pub mod error;
pub mod ingest;
pub mod types;

pub use cell::RawCell;
pub use columns::{ColumnRole, ColumnRules, ResolvedColumns, is_header_row};
pub use error::IngestError;
pub use ingest::{DEFAULT_HEADER_SCAN_ROWS, IngestOptions, StatementIngestor};
pub use types::{DailyAggregate, StatementImport};
