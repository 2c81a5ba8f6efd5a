//! Matching statement aggregates against system totals.
//!
//! `match_daily` is pure. `apply` is the only step that writes, and it runs
//! strictly sequentially so a failure leaves a well-defined boundary.

pub mod engine;
pub mod types;

#[cfg(test)]
mod engine_props;

pub use engine::MatchEngine;
pub use types::{ApplyFailure, ApplyReport, ApplyScope, MatchResult, MatchSummary};
