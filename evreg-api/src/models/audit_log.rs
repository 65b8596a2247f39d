use crate::schema::audit_logs;
use chrono::NaiveDateTime;
use diesel::{Identifiable, Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};

#[derive(Queryable, Selectable, Identifiable, Debug, Serialize, Deserialize)]
#[diesel(table_name = audit_logs)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AuditLog {
    pub id: i32,
    pub actor_id: i32,
    pub actor_role: String,
    pub action: String,   // e.g. 'user.bulk_delete', 'registration.bulk_restore'
    pub entity_type: String,
    pub entity_id: Option<i32>,
    pub details: String,  // JSON document
    pub created_at: NaiveDateTime,
}

#[derive(Insertable, Debug, Clone, Deserialize)]
#[diesel(table_name = audit_logs)]
pub struct NewAuditLog {
    pub actor_id: i32,
    pub actor_role: String,
    pub action: String,
    pub entity_type: String,
    pub entity_id: Option<i32>,
    pub details: String,
}
