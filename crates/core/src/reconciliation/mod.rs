//! Daily reconciliation records and their approval workflow.
//!
//! # Modules
//!
//! - `types` - Record, status and action types
//! - `error` - Workflow error types
//! - `workflow` - Transition validation
//! - `service` - Transitions persisted through the accounting store

pub mod error;
pub mod service;
pub mod types;
pub mod workflow;

#[cfg(test)]
mod workflow_props;

pub use error::ReconError;
pub use service::{ReconciliationService, sort_newest_first};
pub use types::{PaymentMethod, ReconAction, ReconStatus, ReconciliationRecord};
pub use workflow::{INVESTIGATE_MARKER, REJECT_MARKER, ReconWorkflow};
