//! Multi-source join/aggregation producing one row per (vendor, brand) purchase line
//!
//! ```text
//! vendor_invoice ──► FreightSummary  (SUM Freight BY VendorNumber)
//! purchases ⋈ purchase_prices ──► PurchaseSummary  (PurchasePrice > 0)
//! sales ──► SalesSummary  (SalesPrice > 0, BY VendorNo, Brand)
//!
//! PurchaseSummary ⟕ SalesSummary ⟕ FreightSummary
//!     ORDER BY TotalPurchaseDollars DESC
//! ```

use super::types::AggregatedRow;
use crate::config::SourceTables;
use crate::store::{quote_identifier, Cell, Store, StoreError};
use rusqlite::Row;

#[derive(Debug)]
pub enum AggregateError {
    MissingTable(String),
    Schema { table: String, column: String },
    Store(StoreError),
    Database(rusqlite::Error),
}

impl From<StoreError> for AggregateError {
    fn from(err: StoreError) -> Self {
        AggregateError::Store(err)
    }
}

impl From<rusqlite::Error> for AggregateError {
    fn from(err: rusqlite::Error) -> Self {
        AggregateError::Database(err)
    }
}

impl std::fmt::Display for AggregateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AggregateError::MissingTable(table) => write!(f, "Missing source table: {}", table),
            AggregateError::Schema { table, column } => {
                write!(f, "Schema error: table {} has no column {}", table, column)
            }
            AggregateError::Store(e) => write!(f, "Store error: {}", e),
            AggregateError::Database(e) => write!(f, "Database error: {}", e),
        }
    }
}

impl std::error::Error for AggregateError {}

const PURCHASE_COLUMNS: &[&str] = &[
    "VendorNumber",
    "VendorName",
    "Brand",
    "Description",
    "PurchasePrice",
    "Quantity",
    "Dollars",
];
const PRICE_COLUMNS: &[&str] = &["Brand", "Price", "Volume"];
const SALES_COLUMNS: &[&str] = &[
    "VendorNo",
    "Brand",
    "SalesPrice",
    "SalesQuantity",
    "SalesDollars",
    "ExciseTax",
];
const INVOICE_COLUMNS: &[&str] = &["VendorNumber", "Freight"];

/// Builds the vendor summary from the four source extracts
pub struct SummaryAggregator {
    tables: SourceTables,
}

impl SummaryAggregator {
    pub fn new(tables: SourceTables) -> Self {
        Self { tables }
    }

    /// Source tables paired with the columns the query reads from them
    fn requirements(&self) -> [(&str, &'static [&'static str]); 4] {
        [
            (self.tables.purchases.as_str(), PURCHASE_COLUMNS),
            (self.tables.purchase_prices.as_str(), PRICE_COLUMNS),
            (self.tables.sales.as_str(), SALES_COLUMNS),
            (self.tables.vendor_invoice.as_str(), INVOICE_COLUMNS),
        ]
    }

    /// Verify every source table and required column exists
    ///
    /// Column names compare case-insensitively, as SQLite resolves them.
    pub fn check_sources(&self, store: &Store) -> Result<(), AggregateError> {
        for (table, required) in self.requirements() {
            if !store.table_exists(table)? {
                return Err(AggregateError::MissingTable(table.to_string()));
            }

            let columns = store.table_columns(table)?;
            for column in required {
                if !columns.iter().any(|c| c.eq_ignore_ascii_case(column)) {
                    return Err(AggregateError::Schema {
                        table: table.to_string(),
                        column: column.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    /// The join/aggregate query with this aggregator's table names
    pub fn build_query(&self) -> Result<String, AggregateError> {
        let purchases = quote_identifier(&self.tables.purchases)?;
        let prices = quote_identifier(&self.tables.purchase_prices)?;
        let sales = quote_identifier(&self.tables.sales)?;
        let invoices = quote_identifier(&self.tables.vendor_invoice)?;

        Ok(format!(
            r#"
            WITH
            FreightSummary AS (
                SELECT
                    VendorNumber,
                    SUM(Freight) AS FreightCost
                FROM {invoices}
                GROUP BY VendorNumber
            ),

            PurchaseSummary AS (
                SELECT
                    p.VendorNumber,
                    p.VendorName,
                    p.Brand,
                    p.Description,
                    pp.Price AS ActualPrice,
                    p.PurchasePrice,
                    pp.Volume,
                    SUM(p.Quantity) AS TotalPurchaseQuantity,
                    SUM(p.Dollars) AS TotalPurchaseDollars
                FROM {purchases} p
                JOIN {prices} pp
                    ON p.Brand = pp.Brand
                WHERE p.PurchasePrice > 0
                GROUP BY
                    p.VendorNumber,
                    p.VendorName,
                    p.Brand,
                    p.Description,
                    pp.Price,
                    p.PurchasePrice,
                    pp.Volume
            ),

            SalesSummary AS (
                SELECT
                    VendorNo,
                    Brand,
                    SUM(SalesPrice) AS TotalSalesPrice,
                    SUM(SalesQuantity) AS TotalSalesQuantity,
                    SUM(SalesDollars) AS TotalSalesDollars,
                    SUM(ExciseTax) AS TotalExciseTax
                FROM {sales}
                WHERE SalesPrice > 0
                GROUP BY VendorNo, Brand
            )

            SELECT
                ps.VendorNumber,
                CAST(ps.VendorName AS TEXT),
                ps.Brand,
                CAST(ps.Description AS TEXT),
                ps.ActualPrice,
                ps.PurchasePrice,
                ps.Volume,
                ps.TotalPurchaseQuantity,
                ps.TotalPurchaseDollars,
                ss.TotalSalesPrice,
                ss.TotalSalesQuantity,
                ss.TotalSalesDollars,
                ss.TotalExciseTax,
                fs.FreightCost
            FROM PurchaseSummary ps
            LEFT JOIN SalesSummary ss
                ON ps.VendorNumber = ss.VendorNo AND ps.Brand = ss.Brand
            LEFT JOIN FreightSummary fs
                ON ps.VendorNumber = fs.VendorNumber
            ORDER BY
                ps.TotalPurchaseDollars DESC,
                ps.VendorNumber,
                ps.Brand,
                ps.Description,
                ps.PurchasePrice
            "#
        ))
    }

    /// Run the join/aggregation; all-or-nothing
    pub fn aggregate(&self, store: &Store) -> Result<Vec<AggregatedRow>, AggregateError> {
        self.check_sources(store)?;

        let sql = self.build_query()?;
        let mut stmt = store.connection().prepare(&sql)?;
        let rows = stmt
            .query_map([], map_row)?
            .collect::<Result<Vec<_>, _>>()?;

        log::debug!("📊 Aggregated {} purchase groupings", rows.len());
        Ok(rows)
    }
}

/// Numeric column read leniently: text that parses is a number, other text is NULL
fn numeric(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<f64>> {
    Ok(row.get::<_, Cell>(idx)?.as_f64())
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<AggregatedRow> {
    Ok(AggregatedRow {
        vendor_number: row.get(0)?,
        vendor_name: row.get(1)?,
        brand: row.get(2)?,
        description: row.get(3)?,
        actual_price: numeric(row, 4)?,
        purchase_price: numeric(row, 5)?,
        volume: row.get(6)?,
        total_purchase_quantity: numeric(row, 7)?,
        total_purchase_dollars: numeric(row, 8)?,
        total_sales_price: numeric(row, 9)?,
        total_sales_quantity: numeric(row, 10)?,
        total_sales_dollars: numeric(row, 11)?,
        total_excise_tax: numeric(row, 12)?,
        freight_cost: numeric(row, 13)?,
    })
}
