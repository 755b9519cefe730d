//! invflow: vendor/inventory extract ingestion and vendor summary derivation
//!
//! Two batch jobs share one SQLite store:
//! - `invflow-ingest` loads every CSV in the source directory into a table
//!   named after the file (full replace, bad files skipped)
//! - `invflow-summary` joins purchases, prices, sales and freight into
//!   `final_summary_table` with profitability metrics

pub mod config;
pub mod ingestion;
pub mod logging;
pub mod pipeline;
pub mod sqlite_pragma;
pub mod store;
pub mod summary;

pub use config::{ConfigError, PipelineConfig, SourceTables};
pub use ingestion::{load_raw_data, LoadError, LoadReport};
pub use pipeline::{create_vendor_summary, PipelineError, SummaryReport};
pub use store::{Cell, ColumnType, Store, StoreError};
