use crate::schema::registrations;
use chrono::NaiveDateTime;
use diesel::{Identifiable, Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[diesel(table_name = registrations)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[ts(export)]
pub struct Registration {
    pub id: i32,
    pub event_id: i32,
    pub user_id: i32,
    pub status: String,
    #[ts(type = "string")]
    pub registered_at: NaiveDateTime,
}

#[derive(Insertable, Deserialize, Debug)]
#[diesel(table_name = registrations)]
pub struct NewRegistration {
    pub event_id: i32,
    pub user_id: i32,
    pub status: String,
}

/// Insertable registration carrying its original id and timestamp, used
/// when reinstating an archived registration.
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = registrations)]
pub struct RestoredRegistration {
    pub id: i32,
    pub event_id: i32,
    pub user_id: i32,
    pub status: String,
    pub registered_at: NaiveDateTime,
}
