use crate::schema::events;
use chrono::{NaiveDate, NaiveDateTime};
use diesel::{Identifiable, Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// An event. Events are soft-deleted in place: `deleted_at` is set instead
/// of moving the row to an archive table.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone, Serialize, Deserialize, TS)]
#[diesel(table_name = events)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[ts(export)]
pub struct Event {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    #[ts(type = "string")]
    pub event_date: NaiveDate,
    pub event_time: Option<String>,
    pub location: Option<String>,
    pub capacity: Option<i32>,
    #[ts(type = "string")]
    pub created_at: NaiveDateTime,
    #[ts(type = "string | null")]
    pub deleted_at: Option<NaiveDateTime>,
    pub deleted_by: Option<i32>,
}

impl Event {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

#[derive(Insertable, Deserialize, Debug)]
#[diesel(table_name = events)]
pub struct NewEvent {
    pub title: String,
    pub description: Option<String>,
    pub event_date: NaiveDate,
    pub event_time: Option<String>,
    pub location: Option<String>,
    pub capacity: Option<i32>,
}
