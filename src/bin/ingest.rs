//! Ingestion job - CSV extracts into the SQLite store
//!
//! Every `.csv` in the source directory becomes a table named after the file,
//! replacing any previous contents. Files that fail to load are logged and
//! skipped.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release --bin invflow-ingest
//! ```
//!
//! ## Environment Variables
//!
//! - INVFLOW_DB_PATH - SQLite store path (default: inventory.db)
//! - INVFLOW_SOURCE_DIR - Directory of CSV extracts (default: "Vendor Dataset")
//! - INVFLOW_LOG_DIR - Log directory, appends to ingestion.log (default: Logs, empty = stderr)
//! - RUST_LOG - Logging level (optional, default: info)

use invflow::logging::{init_logger, Stage};
use invflow::{load_raw_data, PipelineConfig, Store};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let config = PipelineConfig::from_env()?;
    init_logger(Stage::Ingestion, config.log_dir.as_deref())?;

    log::info!("🚀 Starting ingestion job");
    log::info!("   ├─ Source: {}", config.source_dir.display());
    log::info!("   └─ Store: {}", config.db_path.display());

    let mut store = Store::open(&config.db_path).map_err(|e| {
        log::error!("❌ Failed to open store {}: {}", config.db_path.display(), e);
        e
    })?;

    let report = load_raw_data(&mut store, &config.source_dir).map_err(|e| {
        log::error!("❌ Ingestion failed: {}", e);
        e
    })?;

    log::debug!("Load report: {}", serde_json::to_string(&report)?);

    Ok(())
}
