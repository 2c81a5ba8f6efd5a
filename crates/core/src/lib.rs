//! Core settlement reconciliation logic for Rekon.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! The accounting store is reached only through the capability traits in
//! [`gateway`].
//!
//! # Modules
//!
//! - `normalize` - Amount and date cleaning for statement cells
//! - `statement` - Settlement spreadsheet ingestion
//! - `matching` - Statement vs. system totals, and writing matches back
//! - `reconciliation` - Record lifecycle state machine
//! - `float` - Transit account balances and settlement
//! - `sync` - System totals refresh ahead of the reconciliation view
//! - `gateway` - Capability traits for the accounting store

pub mod float;
pub mod gateway;
pub mod matching;
pub mod normalize;
pub mod reconciliation;
pub mod statement;
pub mod sync;

#[cfg(test)]
pub(crate) mod testing;
