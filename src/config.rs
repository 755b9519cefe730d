//! Pipeline configuration from environment variables

use crate::summary::RatioPolicy;
use std::env;
use std::path::PathBuf;

#[derive(Debug)]
pub enum ConfigError {
    InvalidValue(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidValue(msg) => write!(f, "Invalid configuration value: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Names of the four extracts the summary is derived from
#[derive(Debug, Clone, PartialEq)]
pub struct SourceTables {
    pub purchases: String,
    pub purchase_prices: String,
    pub sales: String,
    pub vendor_invoice: String,
}

impl Default for SourceTables {
    fn default() -> Self {
        Self {
            purchases: "purchases".to_string(),
            purchase_prices: "purchase_prices".to_string(),
            sales: "sales".to_string(),
            vendor_invoice: "vendor_invoice".to_string(),
        }
    }
}

/// Configuration shared by the ingestion and summary jobs
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Path to the SQLite store
    pub db_path: PathBuf,

    /// Directory scanned for CSV extracts
    pub source_dir: PathBuf,

    /// Per-stage log directory; `None` logs to stderr
    pub log_dir: Option<PathBuf>,

    /// Output table for the vendor summary
    pub summary_table: String,

    pub source_tables: SourceTables,

    /// What to store when a derived ratio divides by zero
    pub ratio_policy: RatioPolicy,

    /// Number of summary rows echoed to the log after each step
    pub preview_rows: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("inventory.db"),
            source_dir: PathBuf::from("Vendor Dataset"),
            log_dir: Some(PathBuf::from("Logs")),
            summary_table: "final_summary_table".to_string(),
            source_tables: SourceTables::default(),
            ratio_policy: RatioPolicy::Propagate,
            preview_rows: 5,
        }
    }
}

impl PipelineConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `INVFLOW_DB_PATH` (default: inventory.db)
    /// - `INVFLOW_SOURCE_DIR` (default: "Vendor Dataset")
    /// - `INVFLOW_LOG_DIR` (default: Logs, empty string = stderr)
    /// - `INVFLOW_SUMMARY_TABLE` (default: final_summary_table)
    /// - `INVFLOW_PURCHASES_TABLE` (default: purchases)
    /// - `INVFLOW_PRICES_TABLE` (default: purchase_prices)
    /// - `INVFLOW_SALES_TABLE` (default: sales)
    /// - `INVFLOW_INVOICE_TABLE` (default: vendor_invoice)
    /// - `INVFLOW_RATIO_POLICY` (default: propagate; `null` stores NULL instead of NaN/inf)
    /// - `INVFLOW_PREVIEW_ROWS` (default: 5)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let string_or = |key: &str, default: String| lookup(key).unwrap_or(default);

        let log_dir = match lookup("INVFLOW_LOG_DIR") {
            Some(dir) if dir.trim().is_empty() => None,
            Some(dir) => Some(PathBuf::from(dir)),
            None => defaults.log_dir,
        };

        let ratio_policy = match lookup("INVFLOW_RATIO_POLICY") {
            Some(raw) => raw.parse().map_err(ConfigError::InvalidValue)?,
            None => defaults.ratio_policy,
        };

        let preview_rows = match lookup("INVFLOW_PREVIEW_ROWS") {
            Some(raw) => raw.trim().parse().map_err(|_| {
                ConfigError::InvalidValue(format!(
                    "INVFLOW_PREVIEW_ROWS must be a non-negative integer, got {:?}",
                    raw
                ))
            })?,
            None => defaults.preview_rows,
        };

        Ok(Self {
            db_path: lookup("INVFLOW_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.db_path),
            source_dir: lookup("INVFLOW_SOURCE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.source_dir),
            log_dir,
            summary_table: string_or("INVFLOW_SUMMARY_TABLE", defaults.summary_table),
            source_tables: SourceTables {
                purchases: string_or("INVFLOW_PURCHASES_TABLE", defaults.source_tables.purchases),
                purchase_prices: string_or(
                    "INVFLOW_PRICES_TABLE",
                    defaults.source_tables.purchase_prices,
                ),
                sales: string_or("INVFLOW_SALES_TABLE", defaults.source_tables.sales),
                vendor_invoice: string_or(
                    "INVFLOW_INVOICE_TABLE",
                    defaults.source_tables.vendor_invoice,
                ),
            },
            ratio_policy,
            preview_rows,
        })
    }
}
