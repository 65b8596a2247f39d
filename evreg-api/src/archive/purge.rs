use diesel::prelude::*;

use super::archiver::archive_registrations;
use super::error::ArchiveError;
use super::schema_guard::{ARCHIVED_REGISTRATIONS, ARCHIVED_USERS, ensure_archive_table};
use crate::orm::archived_registration::delete_archived_registrations;
use crate::orm::archived_user::delete_archived_users;
use crate::orm::event::{delete_events, soft_deleted_event_ids};
use crate::orm::registration::RegistrationSelector;

/// Deletion source recorded on registrations archived because their event was
/// permanently deleted.
pub const EVENT_PURGE_SOURCE: &str = "event.bulk_delete_permanent";

/// Permanently drops archived users. Returns how many archive rows went.
pub fn purge_archived_users(tx: &mut SqliteConnection, archive_ids: &[i32]) -> Result<usize, ArchiveError> {
    ensure_archive_table(tx, &ARCHIVED_USERS)?;
    Ok(delete_archived_users(tx, archive_ids)?)
}

/// Permanently drops archived registrations. Returns how many archive rows went.
pub fn purge_archived_registrations(
    tx: &mut SqliteConnection,
    archive_ids: &[i32],
) -> Result<usize, ArchiveError> {
    ensure_archive_table(tx, &ARCHIVED_REGISTRATIONS)?;
    Ok(delete_archived_registrations(tx, archive_ids)?)
}

/// Permanently deletes soft-deleted events. Live events in `event_ids` are
/// left alone. Registrations still attached to a purged event are archived
/// first so their snapshot survives.
pub fn purge_events(
    tx: &mut SqliteConnection,
    event_ids: &[i32],
    actor_id: Option<i32>,
) -> Result<usize, ArchiveError> {
    let targets = soft_deleted_event_ids(tx, event_ids)?;
    if targets.is_empty() {
        return Ok(0);
    }

    let archived = archive_registrations(
        tx,
        &RegistrationSelector::ByEvents(targets.clone()),
        actor_id,
        EVENT_PURGE_SOURCE,
    )?;
    let deleted = delete_events(tx, &targets)?;
    info!(
        "Purged {} event(s), archiving {} registration(s)",
        deleted,
        archived.len()
    );
    Ok(deleted)
}
