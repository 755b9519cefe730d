//! Summary job orchestration
//!
//! Aggregate → enrich → publish, each step fully materialized before the
//! next. Any error aborts the run; nothing is published on failure.

use crate::config::PipelineConfig;
use crate::store::Store;
use crate::summary::{
    AggregateError, MetricEnricher, PublishError, QualityReport, SummaryAggregator, SummarySink,
};
use serde::Serialize;
use std::time::Instant;

#[derive(Debug)]
pub enum PipelineError {
    Aggregate(AggregateError),
    Publish(PublishError),
}

impl From<AggregateError> for PipelineError {
    fn from(err: AggregateError) -> Self {
        PipelineError::Aggregate(err)
    }
}

impl From<PublishError> for PipelineError {
    fn from(err: PublishError) -> Self {
        PipelineError::Publish(err)
    }
}

impl std::fmt::Display for PipelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineError::Aggregate(e) => write!(f, "Aggregation failed: {}", e),
            PipelineError::Publish(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for PipelineError {}

/// Outcome of one summary run
#[derive(Debug, Clone, Serialize)]
pub struct SummaryReport {
    pub rows: usize,
    pub destination: String,
    pub quality: QualityReport,
    pub aggregate_secs: f64,
    pub enrich_secs: f64,
    pub publish_secs: f64,
}

/// Log the first `limit` rows as JSON, like a DataFrame head()
fn log_preview<T: Serialize>(label: &str, rows: &[T], limit: usize) {
    if limit == 0 || rows.is_empty() {
        return;
    }

    log::info!("   ├─ {} (first {} of {}):", label, limit.min(rows.len()), rows.len());
    for row in rows.iter().take(limit) {
        match serde_json::to_string(row) {
            Ok(json) => log::info!("   │  {}", json),
            Err(e) => log::warn!("   │  <unserializable row: {}>", e),
        }
    }
}

/// Build the vendor summary from `source` and publish it to `sink`
pub fn create_vendor_summary(
    source: &Store,
    sink: &mut dyn SummarySink,
    config: &PipelineConfig,
) -> Result<SummaryReport, PipelineError> {
    log::info!("🚀 Creating Vendor Summary Table...");

    let step = Instant::now();
    let aggregator = SummaryAggregator::new(config.source_tables.clone());
    let aggregated = aggregator.aggregate(source)?;
    let aggregate_secs = step.elapsed().as_secs_f64();
    log::info!(
        "📊 Aggregated {} purchase groupings in {:.2}s",
        aggregated.len(),
        aggregate_secs
    );
    log_preview("Aggregated", &aggregated, config.preview_rows);

    log::info!("🧹 Cleaning Data (ratio policy: {})...", config.ratio_policy.as_str());
    let step = Instant::now();
    let enriched = MetricEnricher::new(config.ratio_policy).enrich(aggregated);
    let enrich_secs = step.elapsed().as_secs_f64();
    log_preview("Cleaned", &enriched.rows, config.preview_rows);

    let quality = enriched.quality;
    if !quality.is_clean() {
        log::warn!("⚠️  Data quality:");
        log::warn!("   ├─ NULL VendorName: {}", quality.null_vendor_names);
        log::warn!("   ├─ NULL Description: {}", quality.null_descriptions);
        log::warn!("   ├─ Unparseable Volume: {}", quality.unparseable_volumes);
        log::warn!("   └─ Non-finite ratios: {}", quality.non_finite_ratios);
    }

    let destination = sink.destination();
    log::info!("📤 Ingesting data into {}...", destination);
    let step = Instant::now();
    let rows = sink.publish(&enriched.rows)?;
    let publish_secs = step.elapsed().as_secs_f64();

    log::info!("✅ Completed");
    log::info!("   ├─ Rows: {}", rows);
    log::info!(
        "   └─ Timings: aggregate {:.2}s, clean {:.2}s, publish {:.2}s",
        aggregate_secs,
        enrich_secs,
        publish_secs
    );

    Ok(SummaryReport {
        rows,
        destination,
        quality,
        aggregate_secs,
        enrich_secs,
        publish_secs,
    })
}
