//! SQLite PRAGMA setup shared by every store connection

use rusqlite::Connection;

/// Apply the connection PRAGMAs used by the batch jobs
///
/// - `journal_mode = WAL` so a reporting reader can query while a job writes
/// - `synchronous = NORMAL` (safe with WAL)
/// - `temp_store = MEMORY` for the GROUP BY / ORDER BY sorters
///
/// In-memory databases silently keep `journal_mode = memory`.
pub fn apply_optimized_pragmas(conn: &Connection) -> Result<(), rusqlite::Error> {
    // journal_mode returns a row, pragma_update ignores it
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    conn.pragma_update(None, "temp_store", "MEMORY")?;
    Ok(())
}
