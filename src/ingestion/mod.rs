//! Raw extract ingestion
//!
//! Scans the source directory and loads every CSV into a store table named
//! after the file. A file that fails to read or parse is logged and skipped;
//! the remaining files still load.

pub mod loader;

pub use loader::{discover_csv_files, load_file, read_csv_table, table_name_for, CsvTable, LoadError};

use crate::store::Store;
use serde::Serialize;
use std::path::Path;
use std::time::Instant;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadedTable {
    pub file: String,
    pub table: String,
    pub rows: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedFile {
    pub file: String,
    pub error: String,
}

/// Outcome of one ingestion run
#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadReport {
    pub loaded: Vec<LoadedTable>,
    pub skipped: Vec<SkippedFile>,
    pub elapsed_secs: f64,
}

impl LoadReport {
    pub fn total_rows(&self) -> usize {
        self.loaded.iter().map(|t| t.rows).sum()
    }
}

/// Load every CSV in `source_dir` into the store (full replace per table)
///
/// Only an unreadable source directory fails the run.
pub fn load_raw_data(store: &mut Store, source_dir: &Path) -> Result<LoadReport, LoadError> {
    let start = Instant::now();
    let files = discover_csv_files(source_dir)?;

    log::info!("🚀 Starting ingestion from {}", source_dir.display());
    log::info!("   └─ {} CSV file(s) found", files.len());

    let mut report = LoadReport::default();

    for path in files {
        let file = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        log::info!("📥 Ingesting {} into the DB...", file);
        let file_start = Instant::now();

        match load_file(store, &path) {
            Ok((table, rows)) => {
                log::info!(
                    "   └─ ✅ {} -> {} ({} rows, {:.2}s)",
                    file,
                    table,
                    rows,
                    file_start.elapsed().as_secs_f64()
                );
                report.loaded.push(LoadedTable { file, table, rows });
            }
            Err(e) => {
                log::error!("❌ Failed to ingest {}: {}", file, e);
                report.skipped.push(SkippedFile {
                    file,
                    error: e.to_string(),
                });
            }
        }
    }

    report.elapsed_secs = start.elapsed().as_secs_f64();

    log::info!("--------Ingestion Complete--------");
    log::info!(
        "   ├─ Loaded: {} table(s), {} rows",
        report.loaded.len(),
        report.total_rows()
    );
    if !report.skipped.is_empty() {
        log::warn!("   ├─ Skipped: {} file(s)", report.skipped.len());
    }
    log::info!("   └─ Total Time Taken: {:.2} minutes", report.elapsed_secs / 60.0);

    Ok(report)
}
