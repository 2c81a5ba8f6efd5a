//! Transit (float) account balances and their settlement.

pub mod error;
pub mod service;
pub mod types;

pub use error::FloatError;
pub use service::FloatTracker;
pub use types::{SettlementKind, SettlementOutcome, TransitAccountBalance};
