//! # Vendor Summary
//!
//! Derives `final_summary_table` from the ingested extracts.
//!
//! ```text
//! Store (purchases, purchase_prices, sales, vendor_invoice)
//!     ↓
//! SummaryAggregator  (CTE join/aggregate, ORDER BY TotalPurchaseDollars DESC)
//!     ↓ Vec<AggregatedRow>
//! MetricEnricher     (Volume cast, null fill, trim, derived ratios)
//!     ↓ Vec<VendorSummaryRow>
//! SummarySink        (full replace of the output table)
//! ```

pub mod aggregator;
pub mod enricher;
pub mod publisher;
pub mod types;

pub use aggregator::{AggregateError, SummaryAggregator};
pub use enricher::{EnrichedSummary, MetricEnricher, QualityReport, RatioPolicy};
pub use publisher::{MemorySummarySink, PublishError, SqliteSummaryPublisher, SummarySink};
pub use types::{AggregatedRow, VendorSummaryRow, SUMMARY_COLUMNS};
