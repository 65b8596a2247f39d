use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// An archived registration. The `user_*` and `event_*` fields are a
/// snapshot taken when the row was archived so it stays displayable after
/// the user or event is purged.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Serialize, Deserialize, TS)]
#[diesel(table_name = crate::schema::archived_registrations)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[ts(export)]
pub struct ArchivedRegistration {
    pub archive_id: i32,
    pub original_registration_id: i32,
    pub event_id: i32,
    pub user_id: i32,
    pub status: String,
    #[ts(type = "string")]
    pub registered_at: NaiveDateTime,
    pub user_name: String,
    pub user_email: String,
    pub event_title: String,
    #[ts(type = "string")]
    pub event_date: NaiveDate,
    pub event_time: Option<String>,
    pub event_location: Option<String>,
    #[ts(type = "string")]
    pub deleted_at: NaiveDateTime,
    pub deleted_by: Option<i32>,
    pub deletion_source: String,
}

#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = crate::schema::archived_registrations)]
#[diesel(treat_none_as_default_value = false)]
pub struct NewArchivedRegistration {
    pub original_registration_id: i32,
    pub event_id: i32,
    pub user_id: i32,
    pub status: String,
    pub registered_at: NaiveDateTime,
    pub user_name: String,
    pub user_email: String,
    pub event_title: String,
    pub event_date: NaiveDate,
    pub event_time: Option<String>,
    pub event_location: Option<String>,
    pub deleted_at: NaiveDateTime,
    pub deleted_by: Option<i32>,
    pub deletion_source: String,
}

/// A live registration joined with its user and event, as captured at
/// archive time.
#[derive(Debug, Clone, Queryable)]
pub struct RegistrationSnapshot {
    pub id: i32,
    pub event_id: i32,
    pub user_id: i32,
    pub status: String,
    pub registered_at: NaiveDateTime,
    pub user_name: String,
    pub user_email: String,
    pub event_title: String,
    pub event_date: NaiveDate,
    pub event_time: Option<String>,
    pub event_location: Option<String>,
}

impl RegistrationSnapshot {
    pub fn into_archived(
        self,
        deleted_at: NaiveDateTime,
        deleted_by: Option<i32>,
        deletion_source: &str,
    ) -> NewArchivedRegistration {
        NewArchivedRegistration {
            original_registration_id: self.id,
            event_id: self.event_id,
            user_id: self.user_id,
            status: self.status,
            registered_at: self.registered_at,
            user_name: self.user_name,
            user_email: self.user_email,
            event_title: self.event_title,
            event_date: self.event_date,
            event_time: self.event_time,
            event_location: self.event_location,
            deleted_at,
            deleted_by,
            deletion_source: deletion_source.to_string(),
        }
    }
}
