//! Dynamically typed cell values moved between CSV extracts and SQLite tables

use rusqlite::types::{FromSql, FromSqlResult, ToSql, ToSqlOutput, Value, ValueRef};
use serde::Serialize;
use std::fmt;

/// A single stored value
///
/// Mirrors SQLite's storage classes. Blobs are read back as lossy text since
/// none of the ingested extracts carry binary data.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl Cell {
    /// Parse a raw CSV field according to the column's inferred type
    ///
    /// Empty fields are NULL regardless of type. Numeric parsing ignores
    /// surrounding whitespace; text keeps the raw field untouched.
    pub fn parse(raw: &str, column_type: ColumnType) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Cell::Null;
        }

        match column_type {
            ColumnType::Integer => trimmed
                .parse()
                .map(Cell::Integer)
                .unwrap_or_else(|_| Cell::Text(raw.to_string())),
            ColumnType::Real => trimmed
                .parse()
                .map(Cell::Real)
                .unwrap_or_else(|_| Cell::Text(raw.to_string())),
            ColumnType::Text => Cell::Text(raw.to_string()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    /// Numeric view of the cell
    ///
    /// Text is parsed after trimming; anything unparseable is `None`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Null => None,
            Cell::Integer(i) => Some(*i as f64),
            Cell::Real(f) => Some(*f),
            Cell::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => write!(f, "NULL"),
            Cell::Integer(i) => write!(f, "{}", i),
            Cell::Real(r) => write!(f, "{}", r),
            Cell::Text(s) => write!(f, "{}", s),
        }
    }
}

impl ToSql for Cell {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Cell::Null => ToSqlOutput::Owned(Value::Null),
            Cell::Integer(i) => ToSqlOutput::Owned(Value::Integer(*i)),
            Cell::Real(f) => ToSqlOutput::Owned(Value::Real(*f)),
            Cell::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
        })
    }
}

impl FromSql for Cell {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        Ok(match value {
            ValueRef::Null => Cell::Null,
            ValueRef::Integer(i) => Cell::Integer(i),
            ValueRef::Real(f) => Cell::Real(f),
            ValueRef::Text(t) | ValueRef::Blob(t) => {
                Cell::Text(String::from_utf8_lossy(t).into_owned())
            }
        })
    }
}

/// Declared storage type of a loaded column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ColumnType {
    Integer,
    Real,
    Text,
}

impl ColumnType {
    /// Infer the narrowest type that fits every non-empty value
    ///
    /// A column with no non-empty values is TEXT.
    pub fn infer<'a, I>(values: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut inferred: Option<ColumnType> = None;

        for value in values {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }

            let fits = if value.parse::<i64>().is_ok() {
                ColumnType::Integer
            } else if value.parse::<f64>().is_ok() {
                ColumnType::Real
            } else {
                return ColumnType::Text;
            };

            inferred = Some(match (inferred, fits) {
                (Some(ColumnType::Real), _) | (_, ColumnType::Real) => ColumnType::Real,
                _ => ColumnType::Integer,
            });
        }

        inferred.unwrap_or(ColumnType::Text)
    }

    /// Storage type for a column of already-typed cells (NULLs ignored)
    pub fn of_cells<'a, I>(cells: I) -> Self
    where
        I: IntoIterator<Item = &'a Cell>,
    {
        let mut inferred: Option<ColumnType> = None;

        for cell in cells {
            let fits = match cell {
                Cell::Null => continue,
                Cell::Integer(_) => ColumnType::Integer,
                Cell::Real(_) => ColumnType::Real,
                Cell::Text(_) => return ColumnType::Text,
            };
            inferred = Some(match (inferred, fits) {
                (Some(ColumnType::Real), _) | (_, ColumnType::Real) => ColumnType::Real,
                _ => ColumnType::Integer,
            });
        }

        inferred.unwrap_or(ColumnType::Text)
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            ColumnType::Integer => "INTEGER",
            ColumnType::Real => "REAL",
            ColumnType::Text => "TEXT",
        }
    }
}
