//! SQLite-backed tabular store
//!
//! One table per ingested extract plus the published summary table. The store
//! has no logic of its own: tables are created or fully replaced by name and
//! read back by the summary stage.

pub mod cell;

pub use cell::{Cell, ColumnType};

use crate::sqlite_pragma::apply_optimized_pragmas;
use rusqlite::{params_from_iter, Connection, OpenFlags};
use std::path::Path;

#[derive(Debug)]
pub enum StoreError {
    Database(rusqlite::Error),
    Io(std::io::Error),
    InvalidIdentifier(String),
    RowWidth {
        table: String,
        expected: usize,
        found: usize,
    },
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Database(err)
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io(err)
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Database(e) => write!(f, "Database error: {}", e),
            StoreError::Io(e) => write!(f, "IO error: {}", e),
            StoreError::InvalidIdentifier(name) => write!(f, "Invalid identifier: {:?}", name),
            StoreError::RowWidth {
                table,
                expected,
                found,
            } => write!(
                f,
                "Row width mismatch for {}: expected {} values, found {}",
                table, expected, found
            ),
        }
    }
}

impl std::error::Error for StoreError {}

/// Column definition used when (re)creating a table
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    pub name: String,
    pub column_type: ColumnType,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }
}

/// Quote a table or column name for interpolation into SQL
///
/// Embedded double quotes are doubled. Empty names are rejected since SQLite
/// would accept `""` as a real (and confusing) identifier.
pub fn quote_identifier(name: &str) -> Result<String, StoreError> {
    if name.trim().is_empty() {
        return Err(StoreError::InvalidIdentifier(name.to_string()));
    }
    Ok(format!("\"{}\"", name.replace('"', "\"\"")))
}

pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open (or create) the SQLite store at `db_path`
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let db_path = db_path.as_ref();

        // Ensure parent directory exists
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(db_path)?;
        apply_optimized_pragmas(&conn)?;

        log::debug!("🗄️  Store opened: {}", db_path.display());

        Ok(Self { conn })
    }

    /// Open the store for reading only
    ///
    /// Writes through this handle fail, so the summary query can never touch
    /// the source tables.
    ///
    /// The store must already exist: no directory or file is created.
    pub fn open_query_only(db_path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let db_path = db_path.as_ref();

        // No SQLITE_OPEN_CREATE: a missing file fails with CANTOPEN
        let conn = Connection::open_with_flags(
            db_path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        apply_optimized_pragmas(&conn)?;

        // Must come after the PRAGMAs, WAL switch is a write
        conn.execute_batch("PRAGMA query_only = ON")?;

        log::debug!("🗄️  Store opened read-only: {}", db_path.display());

        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        apply_optimized_pragmas(&conn)?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Check whether a table (or view) exists, ignoring case like SQLite does
    pub fn table_exists(&self, name: &str) -> Result<bool, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT 1 FROM sqlite_master
             WHERE type IN ('table', 'view') AND name = ?1 COLLATE NOCASE",
        )?;
        Ok(stmt.exists([name])?)
    }

    /// Column names of a table in declaration order (empty if absent)
    pub fn table_columns(&self, name: &str) -> Result<Vec<String>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM pragma_table_info(?1) ORDER BY cid")?;
        let columns = stmt
            .query_map([name], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(columns)
    }

    /// Drop and recreate `name`, then insert every row in one transaction
    ///
    /// Returns the number of rows written. Prior contents are gone even if
    /// the new row set is empty.
    pub fn replace_table(
        &mut self,
        name: &str,
        columns: &[ColumnDef],
        rows: &[Vec<Cell>],
    ) -> Result<usize, StoreError> {
        let table = quote_identifier(name)?;
        let column_sql = columns
            .iter()
            .map(|c| -> Result<String, StoreError> {
                Ok(format!("{} {}", quote_identifier(&c.name)?, c.column_type.as_sql()))
            })
            .collect::<Result<Vec<_>, _>>()?
            .join(", ");
        let placeholders = (1..=columns.len())
            .map(|i| format!("?{}", i))
            .collect::<Vec<_>>()
            .join(", ");

        let tx = self.conn.transaction()?;
        tx.execute(&format!("DROP TABLE IF EXISTS {}", table), [])?;
        tx.execute(&format!("CREATE TABLE {} ({})", table, column_sql), [])?;

        {
            let mut insert =
                tx.prepare(&format!("INSERT INTO {} VALUES ({})", table, placeholders))?;
            for row in rows {
                if row.len() != columns.len() {
                    return Err(StoreError::RowWidth {
                        table: name.to_string(),
                        expected: columns.len(),
                        found: row.len(),
                    });
                }
                insert.execute(params_from_iter(row.iter()))?;
            }
        }

        tx.commit()?;

        log::debug!("✅ Replaced table {} ({} rows)", name, rows.len());
        Ok(rows.len())
    }

    pub fn row_count(&self, name: &str) -> Result<i64, StoreError> {
        let table = quote_identifier(name)?;
        let count = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample_columns() -> Vec<ColumnDef> {
        vec![
            ColumnDef::new("Brand", ColumnType::Integer),
            ColumnDef::new("Price", ColumnType::Real),
            ColumnDef::new("Volume", ColumnType::Text),
        ]
    }

    #[test]
    fn test_replace_table_creates_and_inserts() {
        let mut store = Store::open_in_memory().unwrap();
        let rows = vec![
            vec![Cell::Integer(58), Cell::Real(12.99), Cell::Text("750".into())],
            vec![Cell::Integer(60), Cell::Null, Cell::Text("1000".into())],
        ];

        let written = store.replace_table("purchase_prices", &sample_columns(), &rows).unwrap();

        assert_eq!(written, 2);
        assert!(store.table_exists("purchase_prices").unwrap());
        assert_eq!(store.row_count("purchase_prices").unwrap(), 2);
        assert_eq!(
            store.table_columns("purchase_prices").unwrap(),
            vec!["Brand", "Price", "Volume"]
        );
    }

    #[test]
    fn test_replace_table_discards_previous_rows() {
        let mut store = Store::open_in_memory().unwrap();
        let first = vec![
            vec![Cell::Integer(1), Cell::Real(1.0), Cell::Null],
            vec![Cell::Integer(2), Cell::Real(2.0), Cell::Null],
        ];
        store.replace_table("t", &sample_columns(), &first).unwrap();

        // Different shape entirely: the old schema must not survive
        let columns = vec![ColumnDef::new("Only", ColumnType::Text)];
        store
            .replace_table("t", &columns, &[vec![Cell::Text("x".into())]])
            .unwrap();

        assert_eq!(store.row_count("t").unwrap(), 1);
        assert_eq!(store.table_columns("t").unwrap(), vec!["Only"]);
    }

    #[test]
    fn test_row_width_mismatch_rolls_back() {
        let mut store = Store::open_in_memory().unwrap();
        store
            .replace_table("t", &sample_columns(), &[vec![Cell::Integer(1), Cell::Null, Cell::Null]])
            .unwrap();

        let result = store.replace_table("t", &sample_columns(), &[vec![Cell::Integer(9)]]);
        assert!(matches!(result, Err(StoreError::RowWidth { expected: 3, found: 1, .. })));

        // Transaction dropped without commit: previous table intact
        assert_eq!(store.row_count("t").unwrap(), 1);
    }

    #[test]
    fn test_table_exists_ignores_case() {
        let mut store = Store::open_in_memory().unwrap();
        store.replace_table("Sales", &sample_columns(), &[]).unwrap();

        assert!(store.table_exists("sales").unwrap());
        assert!(!store.table_exists("vendor_invoice").unwrap());
        assert!(store.table_columns("vendor_invoice").unwrap().is_empty());
    }

    #[test]
    fn test_quote_identifier() {
        assert_eq!(quote_identifier("sales").unwrap(), "\"sales\"");
        assert_eq!(quote_identifier("we\"ird").unwrap(), "\"we\"\"ird\"");
        assert!(matches!(
            quote_identifier("  "),
            Err(StoreError::InvalidIdentifier(_))
        ));
    }

    #[test]
    fn test_query_only_rejects_writes() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("inventory.db");
        {
            let mut store = Store::open(&db_path).unwrap();
            store.replace_table("t", &sample_columns(), &[]).unwrap();
        }

        let mut reader = Store::open_query_only(&db_path).unwrap();

        assert!(reader.table_exists("t").unwrap());
        assert!(reader.replace_table("t", &sample_columns(), &[]).is_err());
    }

    #[test]
    fn test_query_only_requires_existing_store() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("missing").join("inventory.db");

        let result = Store::open_query_only(&db_path);

        assert!(matches!(result, Err(StoreError::Database(_))));
        assert!(!db_path.exists());
        assert!(!dir.path().join("missing").exists());

        let db_path = dir.path().join("inventory.db");
        assert!(Store::open_query_only(&db_path).is_err());
        assert!(!db_path.exists());
    }

    #[test]
    fn test_open_creates_parent_directory() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("nested").join("inventory.db");

        let store = Store::open(&db_path).unwrap();

        assert!(db_path.exists());
        assert!(!store.table_exists("purchases").unwrap());
    }
}
