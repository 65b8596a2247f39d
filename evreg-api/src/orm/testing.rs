use chrono::NaiveDate;
use diesel::connection::SimpleConnection;
use diesel::sqlite::SqliteConnection;
use rocket::figment::{
    util::map,
    value::{Map, Value},
};
use rocket::{Build, Rocket, fairing::AdHoc};
use rocket_sync_db_pools::diesel;

use super::db::{
    DbConn, archive_schema_fairing, run_migrations_fairing, run_pending_migrations,
    set_foreign_keys,
};
use crate::admin_init_fairing::admin_init_fairing;
use crate::models::{Event, NewEvent, NewRegistration, NewUser, Registration, User, roles};
use crate::orm::event::insert_event;
use crate::orm::login::hash_password;
use crate::orm::registration::insert_registration;
use crate::orm::user::insert_user;

/// Password given to every fixture user.
pub const FIXTURE_PASSWORD: &str = "fixturepass";

/// Configures SQLite with performance-optimized settings for testing.
///
/// Only `synchronous = OFF` is set. The rollback journal stays enabled because
/// the bulk archive operations depend on `ROLLBACK` working.
///
/// # Panics
/// Panics if the PRAGMA command fails to execute
fn set_sqlite_test_pragmas(conn: &mut diesel::SqliteConnection) {
    conn.batch_execute("PRAGMA synchronous = OFF;")
        .expect("Failed to set SQLite PRAGMAs");
}

fn set_sqlite_test_pragmas_fairing() -> AdHoc {
    AdHoc::on_ignite("Set SQLite Test Pragmas", |rocket| async {
        let conn = DbConn::get_one(&rocket)
            .await
            .expect("database connection for test pragmas");
        conn.run(|c| {
            set_sqlite_test_pragmas(c);
        })
        .await;
        rocket
    })
}

/// Creates and configures a Rocket instance for testing with an in-memory SQLite database.
///
/// The returned Rocket instance will have:
/// - A unique shared-cache in-memory SQLite database
/// - Database connection pool attached
/// - Testing pragmas set
/// - All migrations run and archive tables ensured
/// - Admin initialization completed
/// - API routes mounted
pub fn test_rocket() -> Rocket<Build> {
    use uuid::Uuid;

    let unique_db_name = format!("file:test_db_{}?mode=memory&cache=shared", Uuid::new_v4());

    let db_config: Map<_, Value> = map! {
        "url" => unique_db_name.into(),  // Unique shared in-memory DB per test
        "pool_size" => 5.into(),
        "timeout" => 5.into(),
    };

    let figment = rocket::Config::figment()
        .merge(("databases", map!["sqlite_db" => db_config]));

    let rocket = rocket::custom(figment)
        .attach(DbConn::fairing())
        .attach(set_sqlite_test_pragmas_fairing())
        .attach(run_migrations_fairing())
        .attach(archive_schema_fairing())
        .attach(admin_init_fairing());
    crate::mount_api_routes(rocket)
}

/// Creates a synchronous in-memory SQLite database connection for unit tests.
///
/// Runs all embedded Diesel migrations and enables foreign key support.
/// Archive tables are not created here; the archive engine creates them on
/// first use. Each call returns a new, independent in-memory database.
pub fn setup_test_db() -> SqliteConnection {
    use diesel::Connection;

    let mut conn = SqliteConnection::establish(":memory:")
        .expect("Failed to create in-memory SQLite database");
    set_foreign_keys(&mut conn);
    run_pending_migrations(&mut conn);
    conn
}

/// The standard rows most archive tests start from.
#[derive(Debug, Clone)]
pub struct Fixture {
    pub alice: User,
    pub bob: User,
    pub carol: User,
    pub meetup: Event,
    pub launch: Event,
    /// alice@meetup, bob@meetup, alice@launch, bob@launch, in that order.
    pub registrations: Vec<Registration>,
}

/// Seeds three users, two events and four registrations.
pub fn seed_fixture(conn: &mut SqliteConnection) -> Result<Fixture, diesel::result::Error> {
    let alice = insert_fixture_user(conn, "Alice Example", "alice@example.com", roles::ATTENDEE)?;
    let bob = insert_fixture_user(conn, "Bob Example", "bob@example.com", roles::ATTENDEE)?;
    let carol = insert_fixture_user(conn, "Carol Organizer", "carol@example.com", roles::ORGANIZER)?;

    let meetup = insert_event(
        conn,
        NewEvent {
            title: "Rust Meetup".to_string(),
            description: Some("Monthly meetup".to_string()),
            event_date: NaiveDate::from_ymd_opt(2025, 3, 14).unwrap_or_default(),
            event_time: Some("18:30".to_string()),
            location: Some("Room 101".to_string()),
            capacity: Some(40),
        },
    )?;
    let launch = insert_event(
        conn,
        NewEvent {
            title: "Launch Party".to_string(),
            description: None,
            event_date: NaiveDate::from_ymd_opt(2025, 4, 1).unwrap_or_default(),
            event_time: None,
            location: Some("Rooftop".to_string()),
            capacity: None,
        },
    )?;

    let mut registrations = Vec::new();
    for (event, user) in [(&meetup, &alice), (&meetup, &bob), (&launch, &alice), (&launch, &bob)] {
        registrations.push(insert_registration(
            conn,
            NewRegistration {
                event_id: event.id,
                user_id: user.id,
                status: "registered".to_string(),
            },
        )?);
    }

    Ok(Fixture {
        alice,
        bob,
        carol,
        meetup,
        launch,
        registrations,
    })
}

fn insert_fixture_user(
    conn: &mut SqliteConnection,
    name: &str,
    email: &str,
    role: &str,
) -> Result<User, diesel::result::Error> {
    insert_user(
        conn,
        NewUser {
            name: name.to_string(),
            email: email.to_string(),
            password_hash: hash_password(FIXTURE_PASSWORD),
            role: role.to_string(),
            company: Some("Example Co".to_string()),
            phone: None,
            bio: None,
        },
    )
}
