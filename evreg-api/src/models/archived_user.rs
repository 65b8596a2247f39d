use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Serialize, Deserialize, TS)]
#[diesel(table_name = crate::schema::archived_users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[ts(export)]
pub struct ArchivedUser {
    pub archive_id: i32,
    pub original_user_id: i32,
    pub name: String,
    pub email: String,
    // Legacy archive rows predate credential capture and carry no hash.
    #[serde(skip_serializing)]
    #[ts(skip)]
    pub password_hash: Option<String>,
    pub role: String,
    pub company: Option<String>,
    pub phone: Option<String>,
    pub bio: Option<String>,
    #[ts(type = "string")]
    pub created_at_original: NaiveDateTime,
    #[ts(type = "string")]
    pub deleted_at: NaiveDateTime,
    pub deleted_by: Option<i32>,
    pub deletion_source: String,
}

#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = crate::schema::archived_users)]
#[diesel(treat_none_as_default_value = false)]
pub struct NewArchivedUser {
    pub original_user_id: i32,
    pub name: String,
    pub email: String,
    pub password_hash: Option<String>,
    pub role: String,
    pub company: Option<String>,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub created_at_original: NaiveDateTime,
    pub deleted_at: NaiveDateTime,
    pub deleted_by: Option<i32>,
    pub deletion_source: String,
}
