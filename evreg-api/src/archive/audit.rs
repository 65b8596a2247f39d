use diesel::prelude::*;
use serde_json::Value;

use super::service::Actor;
use crate::models::NewAuditLog;
use crate::orm::audit_log::insert_audit_log;

/// Writes one audit entry for a committed bulk call.
pub fn record_bulk_action(
    conn: &mut SqliteConnection,
    actor: &Actor,
    action: &str,
    entity_type: &str,
    details: &Value,
) -> Result<(), diesel::result::Error> {
    insert_audit_log(
        conn,
        &NewAuditLog {
            actor_id: actor.id,
            actor_role: actor.role.clone(),
            action: action.to_string(),
            entity_type: entity_type.to_string(),
            entity_id: None,
            details: details.to_string(),
        },
    )?;
    Ok(())
}

/// Like [`record_bulk_action`], but a failure is only logged. Must be called
/// after the bulk transaction has committed.
pub fn notify(conn: &mut SqliteConnection, actor: &Actor, action: &str, entity_type: &str, details: Value) {
    if let Err(e) = record_bulk_action(conn, actor, action, entity_type, &details) {
        warn!("Audit write for {} by user {} failed: {}", action, actor.id, e);
    }
}
