//! Summary sinks
//!
//! The summary job writes through `SummarySink` so the stage can run against
//! an in-memory sink in tests. The SQLite sink fully replaces the table.

use super::types::VendorSummaryRow;
use crate::store::{Store, StoreError};

#[derive(Debug)]
pub enum PublishError {
    Store(StoreError),
}

impl From<StoreError> for PublishError {
    fn from(err: StoreError) -> Self {
        PublishError::Store(err)
    }
}

impl std::fmt::Display for PublishError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PublishError::Store(e) => write!(f, "Publish failed: {}", e),
        }
    }
}

impl std::error::Error for PublishError {}

/// Destination for an enriched vendor summary
pub trait SummarySink {
    /// Replace the published summary with `rows`; returns rows written
    fn publish(&mut self, rows: &[VendorSummaryRow]) -> Result<usize, PublishError>;

    /// Human-readable destination for logging
    fn destination(&self) -> String;
}

/// Writes the summary into a store table (drop, create, insert)
pub struct SqliteSummaryPublisher {
    store: Store,
    table: String,
}

impl SqliteSummaryPublisher {
    pub fn new(store: Store, table: impl Into<String>) -> Self {
        Self {
            store,
            table: table.into(),
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }
}

impl SummarySink for SqliteSummaryPublisher {
    fn publish(&mut self, rows: &[VendorSummaryRow]) -> Result<usize, PublishError> {
        let columns = VendorSummaryRow::column_defs(rows);
        let cells: Vec<_> = rows.iter().map(VendorSummaryRow::to_cells).collect();

        let written = self.store.replace_table(&self.table, &columns, &cells)?;

        log::debug!("✅ Published {} rows to {}", written, self.table);
        Ok(written)
    }

    fn destination(&self) -> String {
        format!("SQLite table {}", self.table)
    }
}

/// Keeps the last published summary in memory
#[derive(Debug, Default)]
pub struct MemorySummarySink {
    pub rows: Vec<VendorSummaryRow>,
    pub publish_count: usize,
}

impl SummarySink for MemorySummarySink {
    fn publish(&mut self, rows: &[VendorSummaryRow]) -> Result<usize, PublishError> {
        self.rows = rows.to_vec();
        self.publish_count += 1;
        Ok(rows.len())
    }

    fn destination(&self) -> String {
        "memory".to_string()
    }
}
