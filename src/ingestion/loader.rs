//! CSV extract parsing and table replacement

use crate::store::{Cell, ColumnDef, ColumnType, Store, StoreError};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum LoadError {
    Io(std::io::Error),
    Csv(csv::Error),
    Store(StoreError),
    EmptyHeader(PathBuf),
}

impl From<std::io::Error> for LoadError {
    fn from(err: std::io::Error) -> Self {
        LoadError::Io(err)
    }
}

impl From<csv::Error> for LoadError {
    fn from(err: csv::Error) -> Self {
        LoadError::Csv(err)
    }
}

impl From<StoreError> for LoadError {
    fn from(err: StoreError) -> Self {
        LoadError::Store(err)
    }
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::Io(e) => write!(f, "IO error: {}", e),
            LoadError::Csv(e) => write!(f, "CSV error: {}", e),
            LoadError::Store(e) => write!(f, "Store error: {}", e),
            LoadError::EmptyHeader(path) => {
                write!(f, "No header row in {}", path.display())
            }
        }
    }
}

impl std::error::Error for LoadError {}

/// A parsed extract ready to be written to the store
#[derive(Debug, Clone)]
pub struct CsvTable {
    pub name: String,
    pub columns: Vec<ColumnDef>,
    pub rows: Vec<Vec<Cell>>,
}

/// List `.csv` files in `dir`, sorted by file name
///
/// The extension check ignores case. Subdirectories are not descended into.
pub fn discover_csv_files(dir: &Path) -> Result<Vec<PathBuf>, LoadError> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext.eq_ignore_ascii_case("csv"))
                .unwrap_or(false)
        })
        .collect();

    files.sort_by_key(|path| path.file_name().map(|name| name.to_os_string()));
    Ok(files)
}

/// Table name for an extract: its base name without extension
pub fn table_name_for(path: &Path) -> Option<String> {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.trim().is_empty())
}

/// Parse a CSV extract with a header row
///
/// Every row must have as many fields as the header. Column types are
/// inferred from the data after the whole file is read.
pub fn read_csv_table(path: &Path) -> Result<CsvTable, LoadError> {
    let name = table_name_for(path).ok_or_else(|| LoadError::EmptyHeader(path.to_path_buf()))?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_path(path)?;

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .enumerate()
        .map(|(idx, header)| {
            // Excel exports prefix the first header with a BOM
            if idx == 0 {
                header.trim_start_matches('\u{feff}').to_string()
            } else {
                header.to_string()
            }
        })
        .collect();

    if headers.is_empty() {
        return Err(LoadError::EmptyHeader(path.to_path_buf()));
    }
    let headers = normalize_headers(headers);

    let mut raw_rows: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record = record?;
        raw_rows.push(record.iter().map(str::to_string).collect());
    }

    let columns: Vec<ColumnDef> = headers
        .into_iter()
        .enumerate()
        .map(|(idx, header)| {
            let column_type = ColumnType::infer(raw_rows.iter().map(|row| row[idx].as_str()));
            ColumnDef::new(header, column_type)
        })
        .collect();

    let rows: Vec<Vec<Cell>> = raw_rows
        .iter()
        .map(|row| {
            row.iter()
                .zip(&columns)
                .map(|(raw, column)| Cell::parse(raw, column.column_type))
                .collect::<Vec<_>>()
        })
        .collect();

    Ok(CsvTable {
        name,
        columns,
        rows,
    })
}

/// Make header names usable as column names
///
/// A blank header becomes `Unnamed: <idx>`. A repeated header gets `.1`,
/// `.2`, ... appended until unique. SQLite column names ignore ASCII case, so
/// uniqueness is checked case-insensitively.
pub fn normalize_headers(headers: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::with_capacity(headers.len());

    headers
        .into_iter()
        .enumerate()
        .map(|(idx, header)| {
            let base = if header.trim().is_empty() {
                format!("Unnamed: {}", idx)
            } else {
                header
            };

            let mut name = base.clone();
            let mut suffix = 0;
            while seen.contains(&name.to_ascii_lowercase()) {
                suffix += 1;
                name = format!("{}.{}", base, suffix);
            }
            seen.insert(name.to_ascii_lowercase());
            name
        })
        .collect()
}

/// Parse one extract and fully replace its table; returns (table, rows written)
pub fn load_file(store: &mut Store, path: &Path) -> Result<(String, usize), LoadError> {
    let table = read_csv_table(path)?;
    let written = store.replace_table(&table.name, &table.columns, &table.rows)?;
    Ok((table.name, written))
}
