//! Re-admits archived rows into live storage.
//!
//! Each requested id is checked on its own against the live tables as they
//! are now. A row that no longer fits is left in the archive and reported as
//! skipped; only storage failures abort the call.

use std::collections::HashMap;

use diesel::prelude::*;

use super::credential::reconstitute_credential;
use super::error::ArchiveError;
use super::report::{RowOutcome, SkipReason};
use super::schema_guard::{ARCHIVED_REGISTRATIONS, ARCHIVED_USERS, ensure_archive_table};
use crate::models::{ArchivedRegistration, ArchivedUser, RestoredRegistration, RestoredUser};
use crate::orm::archived_registration::{delete_archived_registration, get_archived_registrations};
use crate::orm::archived_user::{delete_archived_user, get_archived_users};
use crate::orm::event::{clear_event_deleted, get_event, is_event_active};
use crate::orm::registration::{find_registration_for, get_registration, insert_restored_registration};
use crate::orm::user::{get_user, get_user_by_email, insert_restored_user};

/// Ascending, duplicate-free copy of `ids`.
fn sorted_unique(ids: &[i32]) -> Vec<i32> {
    let mut ids = ids.to_vec();
    ids.sort_unstable();
    ids.dedup();
    ids
}

/// Restores archived registrations by archive id.
pub fn restore_registrations(
    tx: &mut SqliteConnection,
    archive_ids: &[i32],
) -> Result<Vec<RowOutcome>, ArchiveError> {
    ensure_archive_table(tx, &ARCHIVED_REGISTRATIONS)?;

    let ids = sorted_unique(archive_ids);
    let mut rows: HashMap<i32, ArchivedRegistration> = get_archived_registrations(tx, &ids)?
        .into_iter()
        .map(|row| (row.archive_id, row))
        .collect();

    let mut outcomes = Vec::with_capacity(ids.len());
    for archive_id in ids {
        let outcome = match rows.remove(&archive_id) {
            Some(row) => restore_registration_row(tx, row)?,
            None => RowOutcome::skipped(archive_id, SkipReason::NotFound),
        };
        outcomes.push(outcome);
    }
    Ok(outcomes)
}

fn restore_registration_row(
    tx: &mut SqliteConnection,
    row: ArchivedRegistration,
) -> Result<RowOutcome, ArchiveError> {
    if !is_event_active(tx, row.event_id)? {
        return Ok(RowOutcome::skipped(row.archive_id, SkipReason::EventMissingOrArchived));
    }
    if get_user(tx, row.user_id)?.is_none() {
        return Ok(RowOutcome::skipped(row.archive_id, SkipReason::UserMissing));
    }
    if get_registration(tx, row.original_registration_id)?.is_some()
        || find_registration_for(tx, row.event_id, row.user_id)?.is_some()
    {
        return Ok(RowOutcome::skipped(row.archive_id, SkipReason::AlreadyExists));
    }

    insert_restored_registration(
        tx,
        &RestoredRegistration {
            id: row.original_registration_id,
            event_id: row.event_id,
            user_id: row.user_id,
            status: row.status,
            registered_at: row.registered_at,
        },
    )?;
    delete_archived_registration(tx, row.archive_id)?;
    Ok(RowOutcome::Restored(row.original_registration_id))
}

/// Restores archived users by archive id.
///
/// Users whose archive row has no usable password hash get a placeholder
/// credential and must reset their password.
pub fn restore_users(tx: &mut SqliteConnection, archive_ids: &[i32]) -> Result<Vec<RowOutcome>, ArchiveError> {
    ensure_archive_table(tx, &ARCHIVED_USERS)?;

    let ids = sorted_unique(archive_ids);
    let mut rows: HashMap<i32, ArchivedUser> = get_archived_users(tx, &ids)?
        .into_iter()
        .map(|row| (row.archive_id, row))
        .collect();

    let mut outcomes = Vec::with_capacity(ids.len());
    for archive_id in ids {
        let outcome = match rows.remove(&archive_id) {
            Some(row) => restore_user_row(tx, row)?,
            None => RowOutcome::skipped(archive_id, SkipReason::NotFound),
        };
        outcomes.push(outcome);
    }
    Ok(outcomes)
}

fn restore_user_row(tx: &mut SqliteConnection, row: ArchivedUser) -> Result<RowOutcome, ArchiveError> {
    if get_user(tx, row.original_user_id)?.is_some() {
        return Ok(RowOutcome::skipped(row.archive_id, SkipReason::UserIdExists));
    }
    if get_user_by_email(tx, &row.email)?.is_some() {
        return Ok(RowOutcome::skipped(row.archive_id, SkipReason::EmailExists));
    }

    let (password_hash, password_reset_required) =
        reconstitute_credential(row.password_hash.as_deref(), row.original_user_id)?;

    insert_restored_user(
        tx,
        &RestoredUser {
            id: row.original_user_id,
            name: row.name,
            email: row.email,
            password_hash,
            role: row.role,
            company: row.company,
            phone: row.phone,
            bio: row.bio,
            created_at: row.created_at_original,
            password_reset_required,
        },
    )?;
    delete_archived_user(tx, row.archive_id)?;
    Ok(RowOutcome::Restored(row.original_user_id))
}

/// Clears the soft-delete marker on events.
pub fn restore_events(tx: &mut SqliteConnection, event_ids: &[i32]) -> Result<Vec<RowOutcome>, ArchiveError> {
    let mut outcomes = Vec::new();
    for event_id in sorted_unique(event_ids) {
        let outcome = match get_event(tx, event_id)? {
            None => RowOutcome::skipped(event_id, SkipReason::NotFound),
            Some(event) if !event.is_deleted() => RowOutcome::skipped(event_id, SkipReason::AlreadyExists),
            Some(_) => {
                clear_event_deleted(tx, event_id)?;
                RowOutcome::Restored(event_id)
            }
        };
        outcomes.push(outcome);
    }
    Ok(outcomes)
}
