use diesel::{connection::SimpleConnection, prelude::*, sqlite::SqliteConnection};
use dotenvy::dotenv;
use evreg_api::{
    archive::{Actor, schema_guard::ensure_archive_tables},
    models::{NewUser, roles},
    orm::{
        login::try_hash_password,
        run_pending_migrations, set_foreign_keys,
        user::{get_user_by_email, insert_user},
    },
};
use regex::Regex;

/// Milliseconds a write waits on a locked database; same as the server pool.
const BUSY_TIMEOUT_MS: u32 = 1000;

pub fn establish_connection() -> Result<SqliteConnection, Box<dyn std::error::Error>> {
    dotenv().ok();
    let database_url = std::env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set")?;
    connect(&database_url)
}

/// Opens `database_url` with the server's connection settings, then brings
/// the schema up to date.
pub fn connect(database_url: &str) -> Result<SqliteConnection, Box<dyn std::error::Error>> {
    let mut conn = SqliteConnection::establish(database_url)?;
    conn.batch_execute(&format!("PRAGMA busy_timeout = {};", BUSY_TIMEOUT_MS))?;
    set_foreign_keys(&mut conn);
    run_pending_migrations(&mut conn);
    ensure_archive_tables(&mut conn)?;
    Ok(conn)
}

/// Get or create an admin user for the current system user.
/// Bulk operations run from the CLI are attributed to this user in the audit log.
pub fn get_or_create_admin_user(conn: &mut SqliteConnection) -> Result<Actor, Box<dyn std::error::Error>> {
    let username = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "admin".to_string());

    let email = format!("{}@localhost", username);

    if let Some(existing_user) = get_user_by_email(conn, &email)? {
        return Ok(Actor {
            id: existing_user.id,
            role: existing_user.role,
        });
    }

    // Never used for login
    let password_hash =
        try_hash_password("unused-password").map_err(|e| format!("Failed to hash password: {}", e))?;

    let created_user = insert_user(
        conn,
        NewUser {
            name: format!("{} (cli)", username),
            email: email.clone(),
            password_hash,
            role: roles::ADMIN.to_string(),
            company: None,
            phone: None,
            bio: None,
        },
    )?;

    println!("Created admin user: {} (ID: {})", email, created_user.id);

    Ok(Actor {
        id: created_user.id,
        role: created_user.role,
    })
}

/// Builds a matcher for `ls`-style filters: a regex by default, a plain
/// substring when `fixed_string` is set.
pub fn build_matcher(
    search_term: Option<String>,
    fixed_string: bool,
) -> Result<Box<dyn Fn(&str) -> bool>, Box<dyn std::error::Error>> {
    match search_term {
        None => Ok(Box::new(|_| true)),
        Some(term) if fixed_string => Ok(Box::new(move |s: &str| s.contains(&term))),
        Some(term) => {
            let regex =
                Regex::new(&term).map_err(|e| format!("Invalid regex pattern '{}': {}", term, e))?;
            Ok(Box::new(move |s: &str| regex.is_match(s)))
        }
    }
}
