//! Refreshing system sales totals before reconciliation records are shown.

pub mod coordinator;
pub mod error;

pub use coordinator::{ReconciliationView, SyncCoordinator, SyncOptions, SyncReport};
pub use error::SyncError;
