//! Metric enrichment: type normalization, null-filling, trimming, derived ratios
//!
//! Steps run in a fixed order because each one consumes the previous result:
//! 1. Volume cast to f64
//! 2. numeric NULLs filled with 0
//! 3. VendorName / Description trimmed
//! 4. GrossProfit, ProfitMargin, StockTurnover, SalesToPurchaseRatio

use super::types::{AggregatedRow, VendorSummaryRow};
use serde::Serialize;
use std::str::FromStr;

/// What to store when a derived ratio divides by zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RatioPolicy {
    /// Keep NaN / ±inf as computed
    Propagate,
    /// Store NULL instead of any non-finite ratio
    Null,
}

impl RatioPolicy {
    pub fn apply(&self, value: f64) -> Option<f64> {
        match self {
            RatioPolicy::Propagate => Some(value),
            RatioPolicy::Null if value.is_finite() => Some(value),
            RatioPolicy::Null => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RatioPolicy::Propagate => "propagate",
            RatioPolicy::Null => "null",
        }
    }
}

impl FromStr for RatioPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "propagate" => Ok(RatioPolicy::Propagate),
            "null" => Ok(RatioPolicy::Null),
            other => Err(format!(
                "ratio policy must be 'propagate' or 'null', got {:?}",
                other
            )),
        }
    }
}

/// Data-quality counters collected while enriching
///
/// Nothing here fails the run; the counts are logged as warnings.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QualityReport {
    pub null_vendor_names: usize,
    pub null_descriptions: usize,
    pub unparseable_volumes: usize,
    pub non_finite_ratios: usize,
}

impl QualityReport {
    pub fn is_clean(&self) -> bool {
        *self == QualityReport::default()
    }
}

#[derive(Debug, Clone)]
pub struct EnrichedSummary {
    pub rows: Vec<VendorSummaryRow>,
    pub quality: QualityReport,
}

pub struct MetricEnricher {
    policy: RatioPolicy,
}

impl MetricEnricher {
    pub fn new(policy: RatioPolicy) -> Self {
        Self { policy }
    }

    pub fn enrich(&self, rows: Vec<AggregatedRow>) -> EnrichedSummary {
        let mut quality = QualityReport::default();
        let rows: Vec<_> = rows
            .into_iter()
            .map(|row| self.enrich_row(row, &mut quality))
            .collect();

        EnrichedSummary { rows, quality }
    }

    fn enrich_row(&self, row: AggregatedRow, quality: &mut QualityReport) -> VendorSummaryRow {
        // 1. Volume as float
        let volume = row.volume.as_f64();
        if volume.is_none() && !row.volume.is_null() {
            log::debug!("Unparseable Volume {:?} for brand {}", row.volume, row.brand);
            quality.unparseable_volumes += 1;
        }

        // 2. Numeric nulls -> 0; text nulls are counted, not zero-filled
        let fill = |value: Option<f64>| value.unwrap_or(0.0);
        if row.vendor_name.is_none() {
            quality.null_vendor_names += 1;
        }
        if row.description.is_none() {
            quality.null_descriptions += 1;
        }

        // 3. Trim text columns
        let vendor_name = row.vendor_name.as_deref().unwrap_or_default().trim().to_string();
        let description = row.description.as_deref().unwrap_or_default().trim().to_string();

        let total_purchase_quantity = fill(row.total_purchase_quantity);
        let total_purchase_dollars = fill(row.total_purchase_dollars);
        let total_sales_quantity = fill(row.total_sales_quantity);
        let total_sales_dollars = fill(row.total_sales_dollars);

        // 4. Derived metrics
        let gross_profit = total_sales_dollars - total_purchase_dollars;
        let profit_margin = self.ratio(gross_profit / total_sales_dollars * 100.0, quality);
        let stock_turnover = self.ratio(total_sales_quantity / total_purchase_quantity, quality);
        let sales_to_purchase_ratio =
            self.ratio(total_sales_dollars / total_purchase_dollars, quality);

        VendorSummaryRow {
            vendor_number: row.vendor_number,
            vendor_name,
            brand: row.brand,
            description,
            actual_price: fill(row.actual_price),
            purchase_price: fill(row.purchase_price),
            volume: fill(volume),
            total_purchase_quantity,
            total_purchase_dollars,
            total_sales_price: fill(row.total_sales_price),
            total_sales_quantity,
            total_sales_dollars,
            total_excise_tax: fill(row.total_excise_tax),
            freight_cost: fill(row.freight_cost),
            gross_profit,
            profit_margin,
            stock_turnover,
            sales_to_purchase_ratio,
        }
    }

    fn ratio(&self, value: f64, quality: &mut QualityReport) -> Option<f64> {
        if !value.is_finite() {
            quality.non_finite_ratios += 1;
        }
        self.policy.apply(value)
    }
}
