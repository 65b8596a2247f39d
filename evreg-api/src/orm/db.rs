use diesel::connection::SimpleConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use rocket::fairing::AdHoc;
use rocket_sync_db_pools::{database, diesel};

use crate::archive::schema_guard::ensure_archive_tables;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Pooled SQLite connection. The pool runs `PRAGMA busy_timeout = 1000;
/// PRAGMA foreign_keys = ON` on every connection it hands out.
#[database("sqlite_db")]
pub struct DbConn(diesel::SqliteConnection);

/// Enables foreign key support for SQLite connections.
///
/// This executes the `PRAGMA foreign_keys = ON` command on the provided
/// connection. Foreign keys are disabled by default in SQLite for backwards
/// compatibility.
///
/// # Panics
/// Panics if the PRAGMA command fails to execute
pub fn set_foreign_keys(conn: &mut diesel::SqliteConnection) {
    conn.batch_execute("PRAGMA foreign_keys = ON")
        .expect("Failed to enable foreign keys");
}

/// Runs all pending database migrations on the provided connection.
///
/// # Panics
/// Panics if any migration fails to run
pub fn run_pending_migrations(conn: &mut diesel::SqliteConnection) {
    conn.run_pending_migrations(MIGRATIONS)
        .expect("Failed to run pending migrations");
}

/// Creates a Rocket fairing that runs database migrations on ignition.
pub fn run_migrations_fairing() -> AdHoc {
    AdHoc::on_ignite("Diesel Migrations", |rocket| async {
        let conn = DbConn::get_one(&rocket).await.expect("database connection for migration");
        conn.run(|c| {
            run_pending_migrations(c);
        })
        .await;
        rocket
    })
}

/// Creates a Rocket fairing that brings the archive tables up to date at
/// ignition. Ignition fails if the guard hits anything other than a
/// duplicate column.
pub fn archive_schema_fairing() -> AdHoc {
    AdHoc::try_on_ignite("Archive Schema Guard", |rocket| async {
        let conn = match DbConn::get_one(&rocket).await {
            Some(conn) => conn,
            None => {
                error!("[archive-schema] Could not get DB connection.");
                return Err(rocket);
            }
        };
        match conn.run(|c| ensure_archive_tables(c)).await {
            Ok(()) => Ok(rocket),
            Err(e) => {
                error!("[archive-schema] {}", e);
                Err(rocket)
            }
        }
    })
}
