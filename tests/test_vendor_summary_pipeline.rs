//! End-to-end tests: CSV extracts → store → final_summary_table
//!
//! Each test writes a small "Vendor Dataset" directory, runs ingestion into a
//! temporary SQLite file, then runs the summary job the way the binary does
//! (read-only source handle, separate publisher handle).

use invflow::summary::SqliteSummaryPublisher;
use invflow::{create_vendor_summary, load_raw_data, PipelineConfig, Store};
use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

const PURCHASES: &str = "\
VendorNumber,VendorName,Brand,Description,PurchasePrice,Quantity,Dollars
V1,Acme  ,BrandX, House Vodka,5.00,10,50
V2,Blue Ridge,BrandY,Bourbon,20.00,3,60
V2,Blue Ridge,BrandY,Bourbon,20.00,2,40
V2,Blue Ridge,BrandY,Bourbon,0,99,0
V3,Coastal,BrandZ,Gin,7.50,4,30
V4,Delta,BrandQ,Unpriced Rum,9.00,1,9
";

const PRICES: &str = "\
Brand,Price,Volume
BrandX,8.00,750
BrandY,29.99,1000
BrandZ,11.00,375
";

const SALES: &str = "\
VendorNo,Brand,SalesPrice,SalesQuantity,SalesDollars,ExciseTax
V1,BrandX,8.00,4,32,1.5
V1,BrandX,8.00,2,16,0.5
V2,BrandY,29.99,1,29.99,0.8
V2,BrandY,0,40,0,3
";

const INVOICES: &str = "\
VendorNumber,Freight
V1,3
V2,1.25
V2,0.75
";

struct Fixture {
    _dir: TempDir,
    source_dir: PathBuf,
    db_path: PathBuf,
    config: PipelineConfig,
}

fn fixture() -> Fixture {
    let dir = tempdir().unwrap();
    let source_dir = dir.path().join("Vendor Dataset");
    fs::create_dir(&source_dir).unwrap();

    for (name, contents) in [
        ("purchases.csv", PURCHASES),
        ("purchase_prices.csv", PRICES),
        ("sales.csv", SALES),
        ("vendor_invoice.csv", INVOICES),
    ] {
        fs::write(source_dir.join(name), contents).unwrap();
    }

    let db_path = dir.path().join("inventory.db");
    let config = PipelineConfig {
        db_path: db_path.clone(),
        source_dir: source_dir.clone(),
        log_dir: None,
        ..PipelineConfig::default()
    };

    Fixture {
        _dir: dir,
        source_dir,
        db_path,
        config,
    }
}

fn ingest(db_path: &Path, source_dir: &Path) {
    let mut store = Store::open(db_path).unwrap();
    let report = load_raw_data(&mut store, source_dir).unwrap();
    assert!(report.skipped.is_empty(), "unexpected skips: {:?}", report.skipped);
}

fn summarize(fx: &Fixture) -> usize {
    let source = Store::open_query_only(&fx.db_path).unwrap();
    let mut publisher =
        SqliteSummaryPublisher::new(Store::open(&fx.db_path).unwrap(), "final_summary_table");
    create_vendor_summary(&source, &mut publisher, &fx.config)
        .unwrap()
        .rows
}

#[derive(Debug, PartialEq)]
struct SummaryRow {
    vendor: String,
    vendor_name: String,
    brand: String,
    description: String,
    purchase_dollars: f64,
    purchase_quantity: f64,
    sales_quantity: f64,
    sales_dollars: f64,
    excise_tax: f64,
    freight: f64,
    gross_profit: f64,
    profit_margin: Option<f64>,
    stock_turnover: Option<f64>,
    sales_to_purchase: Option<f64>,
}

fn read_summary(db_path: &Path) -> Vec<SummaryRow> {
    let conn = Connection::open(db_path).unwrap();
    let mut stmt = conn
        .prepare(
            "SELECT VendorNumber, VendorName, Brand, Description, TotalPurchaseDollars,
                    TotalPurchaseQuantity, TotalSalesQuantity, TotalSalesDollars,
                    TotalExciseTax, FreightCost, GrossProfit, ProfitMargin,
                    StockTurnover, SalesToPurchaseRatio
             FROM final_summary_table
             ORDER BY rowid",
        )
        .unwrap();

    let rows = stmt
        .query_map([], |row| {
            Ok(SummaryRow {
                vendor: row.get(0)?,
                vendor_name: row.get(1)?,
                brand: row.get(2)?,
                description: row.get(3)?,
                purchase_dollars: row.get(4)?,
                purchase_quantity: row.get(5)?,
                sales_quantity: row.get(6)?,
                sales_dollars: row.get(7)?,
                excise_tax: row.get(8)?,
                freight: row.get(9)?,
                gross_profit: row.get(10)?,
                profit_margin: row.get(11)?,
                stock_turnover: row.get(12)?,
                sales_to_purchase: row.get(13)?,
            })
        })
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    rows
}

#[test]
fn test_reference_example_row() {
    let fx = fixture();
    ingest(&fx.db_path, &fx.source_dir);
    summarize(&fx);

    let rows = read_summary(&fx.db_path);
    let v1 = rows.iter().find(|r| r.vendor == "V1").unwrap();

    assert_eq!(v1.brand, "BrandX");
    assert_eq!(v1.vendor_name, "Acme");
    assert_eq!(v1.description, "House Vodka");
    assert_eq!(v1.purchase_quantity, 10.0);
    assert_eq!(v1.purchase_dollars, 50.0);
    assert_eq!(v1.sales_quantity, 6.0);
    assert_eq!(v1.sales_dollars, 48.0);
    assert_eq!(v1.excise_tax, 2.0);
    assert_eq!(v1.freight, 3.0);
    assert_eq!(v1.gross_profit, -2.0);
    assert!((v1.profit_margin.unwrap() + 4.166_666_666).abs() < 1e-6);
    assert_eq!(v1.stock_turnover, Some(0.6));
    assert_eq!(v1.sales_to_purchase, Some(0.96));
}

#[test]
fn test_grain_and_filters() {
    let fx = fixture();
    ingest(&fx.db_path, &fx.source_dir);
    let written = summarize(&fx);

    let rows = read_summary(&fx.db_path);
    assert_eq!(written, rows.len());

    // V4's brand has no price reference entry: no row
    let keys: Vec<_> = rows.iter().map(|r| (r.vendor.as_str(), r.brand.as_str())).collect();
    assert_eq!(keys, vec![("V2", "BrandY"), ("V1", "BrandX"), ("V3", "BrandZ")]);

    // Zero-priced purchase and sale lines never reach the sums
    let v2 = &rows[0];
    assert_eq!(v2.purchase_quantity, 5.0);
    assert_eq!(v2.purchase_dollars, 100.0);
    assert_eq!(v2.sales_quantity, 1.0);
    assert_eq!(v2.excise_tax, 0.8);
    assert_eq!(v2.freight, 2.0);
}

#[test]
fn test_outer_join_gaps_zero_filled() {
    let fx = fixture();
    ingest(&fx.db_path, &fx.source_dir);
    summarize(&fx);

    let rows = read_summary(&fx.db_path);
    let v3 = rows.iter().find(|r| r.vendor == "V3").unwrap();

    assert_eq!(v3.sales_quantity, 0.0);
    assert_eq!(v3.sales_dollars, 0.0);
    assert_eq!(v3.excise_tax, 0.0);
    assert_eq!(v3.freight, 0.0);
    assert_eq!(v3.gross_profit, -30.0);
    assert_eq!(v3.stock_turnover, Some(0.0));
    // -30 / 0 * 100 under the default propagate policy
    assert_eq!(v3.profit_margin, Some(f64::NEG_INFINITY));
}

#[test]
fn test_ordered_by_purchase_dollars() {
    let fx = fixture();
    ingest(&fx.db_path, &fx.source_dir);
    summarize(&fx);

    let dollars: Vec<_> = read_summary(&fx.db_path)
        .iter()
        .map(|r| r.purchase_dollars)
        .collect();
    let mut sorted = dollars.clone();
    sorted.sort_by(|a, b| b.partial_cmp(a).unwrap());

    assert_eq!(dollars, sorted);
}

#[test]
fn test_rerun_is_idempotent() {
    let fx = fixture();
    ingest(&fx.db_path, &fx.source_dir);
    summarize(&fx);
    let first = read_summary(&fx.db_path);

    ingest(&fx.db_path, &fx.source_dir);
    summarize(&fx);
    let second = read_summary(&fx.db_path);

    assert_eq!(first, second);
}

#[test]
fn test_missing_source_table_fails_without_output() {
    let fx = fixture();
    fs::remove_file(fx.source_dir.join("vendor_invoice.csv")).unwrap();
    ingest(&fx.db_path, &fx.source_dir);

    let source = Store::open_query_only(&fx.db_path).unwrap();
    let mut publisher =
        SqliteSummaryPublisher::new(Store::open(&fx.db_path).unwrap(), "final_summary_table");
    let result = create_vendor_summary(&source, &mut publisher, &fx.config);

    let err = result.unwrap_err();
    assert!(err.to_string().contains("vendor_invoice"));
    assert!(!publisher.store().table_exists("final_summary_table").unwrap());
}
