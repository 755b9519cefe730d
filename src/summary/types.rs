//! Row types flowing through the summary stage

use crate::store::{Cell, ColumnDef, ColumnType};
use serde::Serialize;

/// One (vendor, brand) purchase grouping as returned by the join query
///
/// Sales and freight fields are `None` when the outer join found no match.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AggregatedRow {
    pub vendor_number: Cell,
    pub vendor_name: Option<String>,
    pub brand: Cell,
    pub description: Option<String>,
    pub actual_price: Option<f64>,
    pub purchase_price: Option<f64>,
    /// Raw price-reference volume, frequently stored as text
    pub volume: Cell,
    pub total_purchase_quantity: Option<f64>,
    pub total_purchase_dollars: Option<f64>,
    pub total_sales_price: Option<f64>,
    pub total_sales_quantity: Option<f64>,
    pub total_sales_dollars: Option<f64>,
    pub total_excise_tax: Option<f64>,
    pub freight_cost: Option<f64>,
}

/// A row of `final_summary_table`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct VendorSummaryRow {
    pub vendor_number: Cell,
    pub vendor_name: String,
    pub brand: Cell,
    pub description: String,
    pub actual_price: f64,
    pub purchase_price: f64,
    /// 0 when the reference Volume was missing or not numeric (counted in `QualityReport`)
    pub volume: f64,
    pub total_purchase_quantity: f64,
    pub total_purchase_dollars: f64,
    pub total_sales_price: f64,
    pub total_sales_quantity: f64,
    pub total_sales_dollars: f64,
    pub total_excise_tax: f64,
    pub freight_cost: f64,
    pub gross_profit: f64,
    pub profit_margin: Option<f64>,
    pub stock_turnover: Option<f64>,
    pub sales_to_purchase_ratio: Option<f64>,
}

/// Output column names, in table order
pub const SUMMARY_COLUMNS: [&str; 18] = [
    "VendorNumber",
    "VendorName",
    "Brand",
    "Description",
    "ActualPrice",
    "PurchasePrice",
    "Volume",
    "TotalPurchaseQuantity",
    "TotalPurchaseDollars",
    "TotalSalesPrice",
    "TotalSalesQuantity",
    "TotalSalesDollars",
    "TotalExciseTax",
    "FreightCost",
    "GrossProfit",
    "ProfitMargin",
    "StockTurnover",
    "SalesToPurchaseRatio",
];

impl VendorSummaryRow {
    /// Column definitions for a batch of rows
    ///
    /// Key columns take whatever type the source extracts used (vendor and
    /// brand numbers are usually integers); everything else is fixed.
    pub fn column_defs(rows: &[VendorSummaryRow]) -> Vec<ColumnDef> {
        let vendor_type = ColumnType::of_cells(rows.iter().map(|r| &r.vendor_number));
        let brand_type = ColumnType::of_cells(rows.iter().map(|r| &r.brand));

        SUMMARY_COLUMNS
            .iter()
            .map(|&name| {
                let column_type = match name {
                    "VendorNumber" => vendor_type,
                    "Brand" => brand_type,
                    "VendorName" | "Description" => ColumnType::Text,
                    _ => ColumnType::Real,
                };
                ColumnDef::new(name, column_type)
            })
            .collect()
    }

    /// Values in `SUMMARY_COLUMNS` order
    pub fn to_cells(&self) -> Vec<Cell> {
        let ratio = |value: Option<f64>| value.map(Cell::Real).unwrap_or(Cell::Null);

        vec![
            self.vendor_number.clone(),
            Cell::Text(self.vendor_name.clone()),
            self.brand.clone(),
            Cell::Text(self.description.clone()),
            Cell::Real(self.actual_price),
            Cell::Real(self.purchase_price),
            Cell::Real(self.volume),
            Cell::Real(self.total_purchase_quantity),
            Cell::Real(self.total_purchase_dollars),
            Cell::Real(self.total_sales_price),
            Cell::Real(self.total_sales_quantity),
            Cell::Real(self.total_sales_dollars),
            Cell::Real(self.total_excise_tax),
            Cell::Real(self.freight_cost),
            Cell::Real(self.gross_profit),
            ratio(self.profit_margin),
            ratio(self.stock_turnover),
            ratio(self.sales_to_purchase_ratio),
        ]
    }
}
