//! Shared types, errors, and configuration for Rekon.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for type-safe entity references
//! - Application-wide error types
//! - Configuration management
//! - Bearer token claims and validation

pub mod auth;
pub mod config;
pub mod error;
pub mod jwt;
pub mod types;

pub use auth::Claims;
pub use config::{AppConfig, DateSystem, ReconciliationConfig};
pub use error::AppError;
pub use jwt::{JwtError, JwtService};
