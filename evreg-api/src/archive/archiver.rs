//! Moves live rows into the archive tables.
//!
//! Every function here runs inside the caller's transaction and either
//! archives all selected rows or fails without side effects once the caller
//! rolls back.

use chrono::Utc;
use diesel::prelude::*;
use serde::Serialize;

use super::error::ArchiveError;
use super::schema_guard::{ARCHIVED_REGISTRATIONS, ARCHIVED_USERS, ensure_archive_table};
use crate::models::{NewArchivedRegistration, NewArchivedUser};
use crate::orm::archived_registration::{
    archived_registration_refs_after, insert_archived_registrations, max_archived_registration_id,
};
use crate::orm::archived_user::{archived_user_refs_after, insert_archived_users, max_archived_user_id};
use crate::orm::event::mark_events_deleted;
use crate::orm::registration::{RegistrationSelector, delete_registrations, load_registration_snapshots};
use crate::orm::user::{delete_users, get_users_by_ids};

/// Pairs a fresh archive row with the id its row had while live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ArchivedRef {
    pub archive_id: i32,
    pub original_id: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ArchiveOutcome {
    pub archived: Vec<ArchivedRef>,
    /// Registrations archived along with the users in `archived`.
    pub cascaded_registrations: Vec<ArchivedRef>,
}

impl ArchiveOutcome {
    fn from_refs(refs: Vec<(i32, i32)>) -> Self {
        ArchiveOutcome {
            archived: refs
                .into_iter()
                .map(|(archive_id, original_id)| ArchivedRef {
                    archive_id,
                    original_id,
                })
                .collect(),
            cascaded_registrations: Vec::new(),
        }
    }

    pub fn original_ids(&self) -> Vec<i32> {
        self.archived.iter().map(|r| r.original_id).collect()
    }

    pub fn cascaded_registration_ids(&self) -> Vec<i32> {
        self.cascaded_registrations.iter().map(|r| r.original_id).collect()
    }

    pub fn archive_ids(&self) -> Vec<i32> {
        self.archived.iter().map(|r| r.archive_id).collect()
    }

    pub fn len(&self) -> usize {
        self.archived.len()
    }

    pub fn is_empty(&self) -> bool {
        self.archived.is_empty()
    }
}

/// Archives the selected registrations with a snapshot of their user and
/// event, then deletes them from live storage.
pub fn archive_registrations(
    tx: &mut SqliteConnection,
    selector: &RegistrationSelector,
    actor_id: Option<i32>,
    reason: &str,
) -> Result<ArchiveOutcome, ArchiveError> {
    ensure_archive_table(tx, &ARCHIVED_REGISTRATIONS)?;
    if selector.is_empty() {
        return Ok(ArchiveOutcome::default());
    }

    let snapshots = load_registration_snapshots(tx, selector)?;
    if snapshots.is_empty() {
        return Ok(ArchiveOutcome::default());
    }

    let deleted_at = Utc::now().naive_utc();
    let live_ids: Vec<i32> = snapshots.iter().map(|s| s.id).collect();
    let rows: Vec<NewArchivedRegistration> = snapshots
        .into_iter()
        .map(|snap| snap.into_archived(deleted_at, actor_id, reason))
        .collect();

    let before = max_archived_registration_id(tx)?;
    insert_archived_registrations(tx, &rows)?;
    let refs = archived_registration_refs_after(tx, before)?;
    delete_registrations(tx, &live_ids)?;

    info!(
        "Archived {} registration(s) as {} (actor {:?})",
        refs.len(),
        reason,
        actor_id
    );
    Ok(ArchiveOutcome::from_refs(refs))
}

/// Archives users and everything that references them.
///
/// The users' live registrations are archived first under the same reason and
/// their sessions are removed, so no live row is left pointing at a missing
/// user. Ids with no live user are ignored.
pub fn archive_users(
    tx: &mut SqliteConnection,
    user_ids: &[i32],
    actor_id: Option<i32>,
    reason: &str,
) -> Result<ArchiveOutcome, ArchiveError> {
    ensure_archive_table(tx, &ARCHIVED_USERS)?;

    let users = get_users_by_ids(tx, user_ids)?;
    if users.is_empty() {
        return Ok(ArchiveOutcome::default());
    }
    let live_ids: Vec<i32> = users.iter().map(|u| u.id).collect();

    let cascaded = archive_registrations(tx, &RegistrationSelector::ByUsers(live_ids.clone()), actor_id, reason)?;

    let deleted_at = Utc::now().naive_utc();
    let rows: Vec<NewArchivedUser> = users
        .into_iter()
        .map(|user| NewArchivedUser {
            original_user_id: user.id,
            name: user.name,
            email: user.email,
            password_hash: Some(user.password_hash),
            role: user.role,
            company: user.company,
            phone: user.phone,
            bio: user.bio,
            created_at_original: user.created_at,
            deleted_at,
            deleted_by: actor_id,
            deletion_source: reason.to_string(),
        })
        .collect();

    let before = max_archived_user_id(tx)?;
    insert_archived_users(tx, &rows)?;
    let refs = archived_user_refs_after(tx, before)?;
    delete_users(tx, &live_ids)?;

    info!("Archived {} user(s) as {} (actor {:?})", refs.len(), reason, actor_id);
    Ok(ArchiveOutcome {
        cascaded_registrations: cascaded.archived,
        ..ArchiveOutcome::from_refs(refs)
    })
}

/// Soft-deletes events in place and returns the ids that were marked.
/// Events already soft-deleted are left untouched.
pub fn soft_delete_events(
    tx: &mut SqliteConnection,
    event_ids: &[i32],
    actor_id: Option<i32>,
) -> Result<Vec<i32>, ArchiveError> {
    let marked = mark_events_deleted(tx, event_ids, Utc::now().naive_utc(), actor_id)?;
    info!("Soft-deleted {} event(s) (actor {:?})", marked.len(), actor_id);
    Ok(marked)
}
