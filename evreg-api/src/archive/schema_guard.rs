//! Forward-only creation and extension of the archive tables.
//!
//! Archive tables are created at runtime rather than by migrations because
//! databases in the field may already carry an older archive layout. Each
//! table has a fixed base column set plus additive columns that older layouts
//! lack; additive columns are applied one by one with `ALTER TABLE .. ADD
//! COLUMN`, and an "already there" failure counts as success. Nothing is ever
//! dropped or renamed.

use diesel::prelude::*;
use diesel::result::Error as DieselError;

use super::error::ArchiveError;

/// Shape of one archive table.
#[derive(Debug, Clone, Copy)]
pub struct ArchiveTableSpec {
    pub table: &'static str,
    /// Column list for `CREATE TABLE`, without the additive columns.
    pub base_columns: &'static str,
    /// Column holding the id the row had while live.
    pub original_id_column: &'static str,
    /// `(name, definition)` pairs added to tables that predate them.
    pub additive_columns: &'static [(&'static str, &'static str)],
}

pub const ARCHIVED_USERS: ArchiveTableSpec = ArchiveTableSpec {
    table: "archived_users",
    base_columns: "archive_id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
        original_user_id INTEGER NOT NULL,
        name TEXT NOT NULL,
        email TEXT NOT NULL,
        role TEXT NOT NULL,
        company TEXT,
        phone TEXT,
        bio TEXT,
        created_at_original TIMESTAMP NOT NULL,
        deleted_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
        deleted_by INTEGER",
    original_id_column: "original_user_id",
    additive_columns: &[
        ("password_hash", "TEXT"),
        ("deletion_source", "TEXT NOT NULL DEFAULT 'legacy'"),
    ],
};

pub const ARCHIVED_REGISTRATIONS: ArchiveTableSpec = ArchiveTableSpec {
    table: "archived_registrations",
    base_columns: "archive_id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
        original_registration_id INTEGER NOT NULL,
        event_id INTEGER NOT NULL,
        user_id INTEGER NOT NULL,
        status TEXT NOT NULL,
        registered_at TIMESTAMP NOT NULL,
        user_name TEXT NOT NULL,
        user_email TEXT NOT NULL,
        event_title TEXT NOT NULL,
        event_date DATE NOT NULL,
        deleted_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
        deleted_by INTEGER",
    original_id_column: "original_registration_id",
    additive_columns: &[
        ("event_time", "TEXT"),
        ("event_location", "TEXT"),
        ("deletion_source", "TEXT NOT NULL DEFAULT 'legacy'"),
    ],
};

fn is_duplicate_column(err: &DieselError) -> bool {
    match err {
        DieselError::DatabaseError(_, info) => {
            info.message().contains("duplicate column name")
        }
        _ => false,
    }
}

/// Adds `column` to `table` unless it is already present.
pub fn ensure_column(
    conn: &mut SqliteConnection,
    table: &'static str,
    column: &'static str,
    definition: &str,
) -> Result<(), ArchiveError> {
    let sql = format!("ALTER TABLE {} ADD COLUMN {} {}", table, column, definition);
    match diesel::sql_query(sql).execute(conn) {
        Ok(_) => {
            info!("[archive-schema] added {}.{}", table, column);
            Ok(())
        }
        Err(e) if is_duplicate_column(&e) => Ok(()),
        Err(source) => Err(ArchiveError::SchemaGuard {
            table,
            column,
            source,
        }),
    }
}

/// Creates the table and its indexes if missing, then applies the additive
/// columns.
pub fn ensure_archive_table(conn: &mut SqliteConnection, spec: &ArchiveTableSpec) -> Result<(), ArchiveError> {
    let statements = [
        format!("CREATE TABLE IF NOT EXISTS {} ({})", spec.table, spec.base_columns),
        format!(
            "CREATE INDEX IF NOT EXISTS idx_{t}_deleted_at ON {t} (deleted_at)",
            t = spec.table
        ),
        format!(
            "CREATE INDEX IF NOT EXISTS idx_{t}_{c} ON {t} ({c})",
            t = spec.table,
            c = spec.original_id_column
        ),
    ];
    for sql in statements {
        diesel::sql_query(sql)
            .execute(conn)
            .map_err(|source| ArchiveError::SchemaGuard {
                table: spec.table,
                column: "*",
                source,
            })?;
    }

    for (column, definition) in spec.additive_columns {
        ensure_column(conn, spec.table, column, definition)?;
    }
    Ok(())
}

/// Brings both archive tables up to date.
pub fn ensure_archive_tables(conn: &mut SqliteConnection) -> Result<(), ArchiveError> {
    ensure_archive_table(conn, &ARCHIVED_USERS)?;
    ensure_archive_table(conn, &ARCHIVED_REGISTRATIONS)
}
