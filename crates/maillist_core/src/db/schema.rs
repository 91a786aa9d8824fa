//! Subscriber table definition and idempotent initialization.
//!
//! # Invariants
//! - `confirmed_at` is nullable unix seconds; `NULL` means never confirmed.
//! - `id` uses `AUTOINCREMENT` so identifiers are never reused.
//! - Only the "table already exists" failure is tolerated.

use crate::db::{DbError, DbResult};
use log::{debug, error, info};
use rusqlite::{ffi, Connection};

/// Name of the single table owned by the store.
pub const EMAILS_TABLE: &str = "emails";

const EMAILS_TABLE_SQL: &str = include_str!("emails.sql");

/// Ensures the `emails` table exists on `conn`.
///
/// Safe to call on every startup. Returns `DbError::Schema` for any failure
/// other than the table already existing; the caller decides whether that
/// is fatal.
pub fn initialize_schema(conn: &Connection) -> DbResult<()> {
    match conn.execute_batch(EMAILS_TABLE_SQL) {
        Ok(()) => {
            info!("event=schema_init module=db status=ok table={EMAILS_TABLE} action=created");
            Ok(())
        }
        Err(err) if is_table_exists_error(&err) => {
            debug!("event=schema_init module=db status=ok table={EMAILS_TABLE} action=exists");
            Ok(())
        }
        Err(err) => {
            error!(
                "event=schema_init module=db status=error table={EMAILS_TABLE} error={err}"
            );
            Err(DbError::Schema(err))
        }
    }
}

// Why: prepare-time failures come back as `SqlInputError` when rusqlite is
// built against a modern SQLite (the bundled one), and as `SqliteFailure`
// otherwise; "already exists" is a prepare-time failure, so match both.
fn is_table_exists_error(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(failure, Some(message)) => {
            is_already_exists(failure, message)
        }
        rusqlite::Error::SqlInputError { error, msg, .. } => is_already_exists(error, msg),
        _ => false,
    }
}

fn is_already_exists(failure: &ffi::Error, message: &str) -> bool {
    failure.extended_code == ffi::SQLITE_ERROR && message.contains("already exists")
}
