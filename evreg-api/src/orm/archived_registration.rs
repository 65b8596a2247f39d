use diesel::prelude::*;

use crate::models::{ArchivedRegistration, NewArchivedRegistration};
use crate::schema::archived_registrations;

/// Inserts all rows in one multi-row `INSERT`.
pub fn insert_archived_registrations(
    conn: &mut SqliteConnection,
    rows: &[NewArchivedRegistration],
) -> Result<usize, diesel::result::Error> {
    if rows.is_empty() {
        return Ok(0);
    }
    diesel::insert_into(archived_registrations::table)
        .values(rows)
        .execute(conn)
}

/// Highest archive id currently in use, or 0 for an empty table.
pub fn max_archived_registration_id(conn: &mut SqliteConnection) -> Result<i32, diesel::result::Error> {
    use diesel::dsl::max;
    let highest: Option<i32> = archived_registrations::table
        .select(max(archived_registrations::archive_id))
        .first(conn)?;
    Ok(highest.unwrap_or(0))
}

/// Returns `(archive_id, original_registration_id)` for rows newer than
/// `after`, ascending by archive id.
pub fn archived_registration_refs_after(
    conn: &mut SqliteConnection,
    after: i32,
) -> Result<Vec<(i32, i32)>, diesel::result::Error> {
    archived_registrations::table
        .filter(archived_registrations::archive_id.gt(after))
        .select((
            archived_registrations::archive_id,
            archived_registrations::original_registration_id,
        ))
        .order(archived_registrations::archive_id.asc())
        .load(conn)
}

/// Loads archive rows by archive id, ascending. Unknown ids are ignored.
pub fn get_archived_registrations(
    conn: &mut SqliteConnection,
    archive_ids: &[i32],
) -> Result<Vec<ArchivedRegistration>, diesel::result::Error> {
    archived_registrations::table
        .filter(archived_registrations::archive_id.eq_any(archive_ids))
        .order(archived_registrations::archive_id.asc())
        .select(ArchivedRegistration::as_select())
        .load(conn)
}

/// Lists every archived registration, most recently archived first.
pub fn list_archived_registrations(
    conn: &mut SqliteConnection,
) -> Result<Vec<ArchivedRegistration>, diesel::result::Error> {
    archived_registrations::table
        .order((
            archived_registrations::deleted_at.desc(),
            archived_registrations::archive_id.desc(),
        ))
        .select(ArchivedRegistration::as_select())
        .load(conn)
}

pub fn delete_archived_registration(
    conn: &mut SqliteConnection,
    archive_id: i32,
) -> Result<usize, diesel::result::Error> {
    diesel::delete(
        archived_registrations::table.filter(archived_registrations::archive_id.eq(archive_id)),
    )
    .execute(conn)
}

/// Deletes archive rows by archive id.
///
/// # Returns
/// * `Ok(usize)` - Number of archive rows deleted
pub fn delete_archived_registrations(
    conn: &mut SqliteConnection,
    archive_ids: &[i32],
) -> Result<usize, diesel::result::Error> {
    diesel::delete(
        archived_registrations::table.filter(archived_registrations::archive_id.eq_any(archive_ids)),
    )
    .execute(conn)
}
