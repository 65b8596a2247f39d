//! Entry points for bulk archive, restore and purge.
//!
//! Each call validates its ids, runs the work in a single `BEGIN IMMEDIATE`
//! transaction, and records one audit entry after the commit.

use std::fmt;
use std::str::FromStr;

use diesel::prelude::*;
use rocket::request::FromParam;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use ts_rs::TS;

use super::archiver::{archive_registrations, archive_users, soft_delete_events};
use super::audit;
use super::error::ArchiveError;
use super::purge::{purge_archived_registrations, purge_archived_users, purge_events};
use super::report::{ArchiveSummary, PurgeSummary, RestoreReport};
use super::restorer::{restore_events, restore_registrations, restore_users};
use super::schema_guard::ensure_archive_tables;
use crate::models::{ArchivedRegistration, ArchivedUser};
use crate::orm::archived_registration::list_archived_registrations;
use crate::orm::archived_user::list_archived_users;
use crate::orm::registration::RegistrationSelector;

/// The kinds of rows the bulk operations act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum EntityFamily {
    Users,
    Events,
    Registrations,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BulkOp {
    Archive,
    Restore,
    Purge,
}

impl EntityFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityFamily::Users => "users",
            EntityFamily::Events => "events",
            EntityFamily::Registrations => "registrations",
        }
    }

    /// Singular name used as the audit `entity_type`.
    pub fn entity_type(&self) -> &'static str {
        match self {
            EntityFamily::Users => "user",
            EntityFamily::Events => "event",
            EntityFamily::Registrations => "registration",
        }
    }

    fn action(&self, op: BulkOp) -> &'static str {
        match (self, op) {
            (EntityFamily::Users, BulkOp::Archive) => "user.bulk_delete",
            (EntityFamily::Users, BulkOp::Restore) => "user.bulk_restore",
            (EntityFamily::Users, BulkOp::Purge) => "user.bulk_purge_archived",
            (EntityFamily::Events, BulkOp::Archive) => "event.bulk_delete",
            (EntityFamily::Events, BulkOp::Restore) => "event.bulk_restore",
            (EntityFamily::Events, BulkOp::Purge) => "event.bulk_delete_permanent",
            (EntityFamily::Registrations, BulkOp::Archive) => "registration.bulk_delete",
            (EntityFamily::Registrations, BulkOp::Restore) => "registration.bulk_restore",
            (EntityFamily::Registrations, BulkOp::Purge) => "registration.bulk_purge_archived",
        }
    }
}

impl fmt::Display for EntityFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityFamily {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "users" | "user" => Ok(EntityFamily::Users),
            "events" | "event" => Ok(EntityFamily::Events),
            "registrations" | "registration" => Ok(EntityFamily::Registrations),
            other => Err(format!("unknown entity family '{}'", other)),
        }
    }
}

impl<'a> FromParam<'a> for EntityFamily {
    type Error = &'a str;

    fn from_param(param: &'a str) -> Result<Self, Self::Error> {
        param.parse().map_err(|_| param)
    }
}

/// Who is performing a bulk call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: i32,
    pub role: String,
}

/// Turns raw request ids into a sorted, duplicate-free id set.
///
/// Accepts JSON integers and strings holding an integer. Empty input,
/// anything non-numeric and anything not in `1..=i32::MAX` is rejected.
pub fn parse_ids(values: &[Value]) -> Result<Vec<i32>, ArchiveError> {
    let raw = values
        .iter()
        .map(|value| {
            let parsed = match value {
                Value::Number(n) => n.as_i64(),
                Value::String(s) => s.trim().parse::<i64>().ok(),
                _ => None,
            };
            parsed.ok_or_else(|| ArchiveError::InvalidId(value.to_string()))
        })
        .collect::<Result<Vec<i64>, _>>()?;
    normalize_ids(&raw)
}

/// Validates and dedups ids that are already numeric.
pub fn normalize_ids(raw: &[i64]) -> Result<Vec<i32>, ArchiveError> {
    if raw.is_empty() {
        return Err(ArchiveError::EmptyIdSet);
    }
    let mut ids = raw
        .iter()
        .map(|&id| match i32::try_from(id) {
            Ok(id) if id > 0 => Ok(id),
            _ => Err(ArchiveError::InvalidId(id.to_string())),
        })
        .collect::<Result<Vec<i32>, _>>()?;
    ids.sort_unstable();
    ids.dedup();
    Ok(ids)
}

/// Moves rows out of live storage: users and registrations into their
/// archive tables, events by soft delete.
pub fn bulk_archive(
    conn: &mut SqliteConnection,
    family: EntityFamily,
    ids: &[i32],
    actor: &Actor,
) -> Result<ArchiveSummary, ArchiveError> {
    let ids = normalize_ids(&ids.iter().map(|&id| id as i64).collect::<Vec<_>>())?;
    let action = family.action(BulkOp::Archive);

    let (archived_ids, cascaded_registration_ids) =
        conn.immediate_transaction::<_, ArchiveError, _>(|tx| match family {
            EntityFamily::Users => {
                let outcome = archive_users(tx, &ids, Some(actor.id), action)?;
                Ok((outcome.original_ids(), outcome.cascaded_registration_ids()))
            }
            EntityFamily::Events => Ok((soft_delete_events(tx, &ids, Some(actor.id))?, Vec::new())),
            EntityFamily::Registrations => {
                let outcome = archive_registrations(
                    tx,
                    &RegistrationSelector::Ids(ids.clone()),
                    Some(actor.id),
                    action,
                )?;
                Ok((outcome.original_ids(), Vec::new()))
            }
        })?;

    let summary = ArchiveSummary {
        archived_count: archived_ids.len(),
        archived_ids,
        cascaded_registration_ids,
    };
    audit::notify(
        conn,
        actor,
        action,
        family.entity_type(),
        json!({
            "requested": ids.len(),
            "archivedCount": summary.archived_count,
            "archivedIds": summary.archived_ids,
            "cascadedRegistrationIds": summary.cascaded_registration_ids,
        }),
    );
    Ok(summary)
}

/// Re-admits archived rows. Users and registrations are addressed by archive
/// id, events by event id.
pub fn bulk_restore(
    conn: &mut SqliteConnection,
    family: EntityFamily,
    ids: &[i32],
    actor: &Actor,
) -> Result<RestoreReport, ArchiveError> {
    let ids = normalize_ids(&ids.iter().map(|&id| id as i64).collect::<Vec<_>>())?;

    let outcomes = conn.immediate_transaction::<_, ArchiveError, _>(|tx| match family {
        EntityFamily::Users => restore_users(tx, &ids),
        EntityFamily::Events => restore_events(tx, &ids),
        EntityFamily::Registrations => restore_registrations(tx, &ids),
    })?;
    let report = RestoreReport::from_outcomes(ids.len(), outcomes);

    if report.skipped_count > 0 {
        info!(
            "Bulk restore of {} skipped {} of {} row(s)",
            family, report.skipped_count, report.requested
        );
    }
    let details = serde_json::to_value(&report).unwrap_or(Value::Null);
    audit::notify(conn, actor, family.action(BulkOp::Restore), family.entity_type(), details);
    Ok(report)
}

/// Permanently deletes rows. Users and registrations are addressed by archive
/// id; events by event id, and only soft-deleted events are removed.
pub fn bulk_purge(
    conn: &mut SqliteConnection,
    family: EntityFamily,
    ids: &[i32],
    actor: &Actor,
) -> Result<PurgeSummary, ArchiveError> {
    let ids = normalize_ids(&ids.iter().map(|&id| id as i64).collect::<Vec<_>>())?;

    let deleted_count = conn.immediate_transaction::<_, ArchiveError, _>(|tx| match family {
        EntityFamily::Users => purge_archived_users(tx, &ids),
        EntityFamily::Events => purge_events(tx, &ids, Some(actor.id)),
        EntityFamily::Registrations => purge_archived_registrations(tx, &ids),
    })?;

    audit::notify(
        conn,
        actor,
        family.action(BulkOp::Purge),
        family.entity_type(),
        json!({ "requested": ids.len(), "deletedCount": deleted_count, "ids": ids }),
    );
    Ok(PurgeSummary { deleted_count })
}

/// Archived users, newest first.
pub fn archived_users(conn: &mut SqliteConnection) -> Result<Vec<ArchivedUser>, ArchiveError> {
    ensure_archive_tables(conn)?;
    Ok(list_archived_users(conn)?)
}

/// Archived registrations, newest first.
pub fn archived_registrations(conn: &mut SqliteConnection) -> Result<Vec<ArchivedRegistration>, ArchiveError> {
    ensure_archive_tables(conn)?;
    Ok(list_archived_registrations(conn)?)
}
