// ==========================================
// Logistics Sync - SQLite connection init
// ==========================================
// Goals:
// - One place for Connection::open PRAGMA behaviour, so no
//   module ends up with foreign keys off while others have
//   them on
// - One busy_timeout for all connections
// ==========================================

use rusqlite::Connection;
use std::time::Duration;

/// Default busy_timeout (milliseconds)
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Apply the unified PRAGMA set to a connection.
///
/// foreign_keys and busy_timeout are per-connection settings
/// and must be applied to every connection separately.
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// Open a SQLite connection with the unified configuration.
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// Create the store tables if they do not exist yet.
///
/// sync_record is the single reconciled table: all six record
/// kinds share it, discriminated by the kind column, with the
/// joined business key unique per kind.
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS sync_record (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            kind            TEXT NOT NULL,
            business_key    TEXT NOT NULL,
            doc_date        TEXT,
            compare_value   TEXT,
            payload         TEXT NOT NULL,
            created_at      TEXT NOT NULL,
            updated_at      TEXT NOT NULL,
            UNIQUE (kind, business_key)
        );

        CREATE INDEX IF NOT EXISTS idx_sync_record_kind_date
            ON sync_record (kind, doc_date);

        CREATE TABLE IF NOT EXISTS counterparty (
            tin             TEXT PRIMARY KEY,
            name            TEXT
        );

        CREATE TABLE IF NOT EXISTS import_meta (
            kind            TEXT PRIMARY KEY,
            last_run_at     TEXT NOT NULL,
            created         INTEGER NOT NULL DEFAULT 0,
            updated         INTEGER NOT NULL DEFAULT 0,
            deleted         INTEGER NOT NULL DEFAULT 0,
            skipped         INTEGER NOT NULL DEFAULT 0,
            errors          INTEGER NOT NULL DEFAULT 0
        );
        "#,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap();

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name IN ('sync_record','counterparty','import_meta')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 3);
    }
}
