use diesel::prelude::*;

use crate::models::{AuditLog, NewAuditLog};
use crate::schema::audit_logs;

pub fn insert_audit_log(conn: &mut SqliteConnection, entry: &NewAuditLog) -> Result<usize, diesel::result::Error> {
    diesel::insert_into(audit_logs::table).values(entry).execute(conn)
}

/// Lists audit entries for one action, oldest first.
pub fn list_audit_logs_for_action(
    conn: &mut SqliteConnection,
    action_name: &str,
) -> Result<Vec<AuditLog>, diesel::result::Error> {
    audit_logs::table
        .filter(audit_logs::action.eq(action_name))
        .order(audit_logs::id.asc())
        .select(AuditLog::as_select())
        .load(conn)
}

/// Lists every audit entry, oldest first.
pub fn list_audit_logs(conn: &mut SqliteConnection) -> Result<Vec<AuditLog>, diesel::result::Error> {
    audit_logs::table
        .order(audit_logs::id.asc())
        .select(AuditLog::as_select())
        .load(conn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orm::testing::setup_test_db;

    #[test]
    fn test_insert_and_filter() {
        let mut conn = setup_test_db();

        for action in ["user.bulk_delete", "event.bulk_delete", "user.bulk_delete"] {
            insert_audit_log(
                &mut conn,
                &NewAuditLog {
                    actor_id: 1,
                    actor_role: "admin".to_string(),
                    action: action.to_string(),
                    entity_type: "user".to_string(),
                    entity_id: None,
                    details: "{}".to_string(),
                },
            )
            .unwrap();
        }

        assert_eq!(list_audit_logs(&mut conn).unwrap().len(), 3);
        let deletes = list_audit_logs_for_action(&mut conn, "user.bulk_delete").unwrap();
        assert_eq!(deletes.len(), 2);
        assert!(deletes.iter().all(|e| e.entity_id.is_none()));
        assert!(deletes[0].id < deletes[1].id);
    }
}
