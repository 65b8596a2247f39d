use crate::schema::users;
use chrono::NaiveDateTime;
use diesel::{Identifiable, Insertable, Queryable, QueryableByName, Selectable};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Deserialize, Queryable, Selectable, Identifiable, QueryableByName, Debug, Clone, Serialize, TS)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[ts(export)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String, // Unique, case-insensitive
    pub password_hash: String,
    pub role: String,
    pub company: Option<String>,
    pub phone: Option<String>,
    pub bio: Option<String>,
    #[ts(type = "string")]
    pub created_at: NaiveDateTime,
    pub password_reset_required: bool,
}

/// Insertable user for the normal creation flow; `id` and `created_at`
/// come from the database.
#[derive(Insertable, Deserialize, Debug)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub company: Option<String>,
    pub phone: Option<String>,
    pub bio: Option<String>,
}

/// Insertable user that carries every column, used when a user is
/// reinstated from the archive with its original id and timestamps.
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = users)]
#[diesel(treat_none_as_default_value = false)]
pub struct RestoredUser {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub company: Option<String>,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub created_at: NaiveDateTime,
    pub password_reset_required: bool,
}

/// Roles a user can hold.
pub mod roles {
    pub const ADMIN: &str = "admin";
    pub const ORGANIZER: &str = "organizer";
    pub const ATTENDEE: &str = "attendee";
}
