//! Vendor summary job
//!
//! Reads purchases, purchase_prices, sales and vendor_invoice from the store,
//! computes the per-vendor, per-brand summary and replaces
//! `final_summary_table`.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release --bin invflow-summary
//! ```
//!
//! ## Environment Variables
//!
//! - INVFLOW_DB_PATH - SQLite store path (default: inventory.db)
//! - INVFLOW_SUMMARY_TABLE - Output table (default: final_summary_table)
//! - INVFLOW_PURCHASES_TABLE / INVFLOW_PRICES_TABLE / INVFLOW_SALES_TABLE / INVFLOW_INVOICE_TABLE
//!   - Source table names (defaults: purchases, purchase_prices, sales, vendor_invoice)
//! - INVFLOW_RATIO_POLICY - propagate | null (default: propagate)
//! - INVFLOW_PREVIEW_ROWS - Rows echoed to the log (default: 5)
//! - INVFLOW_LOG_DIR - Log directory, appends to summary.log (default: Logs, empty = stderr)
//! - RUST_LOG - Logging level (optional, default: info)

use invflow::logging::{init_logger, Stage};
use invflow::summary::SqliteSummaryPublisher;
use invflow::{create_vendor_summary, PipelineConfig, Store};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let config = PipelineConfig::from_env()?;
    init_logger(Stage::Summary, config.log_dir.as_deref())?;

    log::info!("🚀 Starting vendor summary job");
    log::info!("   ├─ Store: {}", config.db_path.display());
    log::info!("   └─ Output: {}", config.summary_table);

    // Separate read-only handle for the sources, writer handle for the output
    let source = Store::open_query_only(&config.db_path)?;
    let mut publisher =
        SqliteSummaryPublisher::new(Store::open(&config.db_path)?, config.summary_table.clone());

    match create_vendor_summary(&source, &mut publisher, &config) {
        Ok(report) => {
            log::debug!("Summary report: {}", serde_json::to_string(&report)?);
            Ok(())
        }
        Err(e) => {
            log::error!("❌ Vendor summary failed: {}", e);
            Err(e.into())
        }
    }
}
