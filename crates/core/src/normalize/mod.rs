//! Value normalization for externally supplied statement cells.
//!
//! Both normalizers are total: they never fail. Unusable input degrades to
//! zero (numbers) or `None` (dates) and the caller decides what to skip.
//!
//! # Modules
//!
//! - `number` - Locale-tolerant amount cleaning
//! - `date` - Text and spreadsheet-serial date conversion

pub mod date;
pub mod number;

#[cfg(test)]
mod number_props;

pub use date::{date_from_serial, normalize_date_text};
pub use number::{clean_number, decimal_from_cell_number};
