//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// JWT configuration.
    pub jwt: JwtSettings,
    /// Reconciliation engine tuning.
    #[serde(default)]
    pub reconciliation: ReconciliationConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Upper bound for a single call into the accounting store.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_request_timeout() -> u64 {
    15
}

/// JWT configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtSettings {
    /// Secret key used to verify bearer tokens.
    pub secret: String,
}

/// Spreadsheet epoch used when a statement stores dates as serial numbers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum DateSystem {
    /// Serial 1 = 1900-01-01, including the phantom 1900-02-29.
    #[default]
    #[serde(rename = "1900")]
    Excel1900,
    /// Serial 0 = 1904-01-01 (legacy Mac workbooks).
    #[serde(rename = "1904")]
    Excel1904,
}

/// Reconciliation engine configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ReconciliationConfig {
    /// How many leading rows are searched for the statement header.
    #[serde(default = "default_header_scan_rows")]
    pub header_scan_rows: usize,
    /// Widest date range a single view refresh may cover.
    #[serde(default = "default_max_sync_days")]
    pub max_sync_days: u32,
    /// Day-sync calls allowed in flight at once.
    #[serde(default = "default_sync_concurrency")]
    pub sync_concurrency: usize,
    /// Date serial epoch for numeric date cells.
    #[serde(default)]
    pub date_system: DateSystem,
    /// Largest accepted statement upload.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for ReconciliationConfig {
    fn default() -> Self {
        Self {
            header_scan_rows: default_header_scan_rows(),
            max_sync_days: default_max_sync_days(),
            sync_concurrency: default_sync_concurrency(),
            date_system: DateSystem::default(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

fn default_header_scan_rows() -> usize {
    30
}

fn default_max_sync_days() -> u32 {
    62
}

fn default_sync_concurrency() -> usize {
    8
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("REKON").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
