use diesel::prelude::*;

use crate::models::{ArchivedUser, NewArchivedUser};
use crate::schema::archived_users;

/// Inserts all rows in one multi-row `INSERT`.
pub fn insert_archived_users(
    conn: &mut SqliteConnection,
    rows: &[NewArchivedUser],
) -> Result<usize, diesel::result::Error> {
    if rows.is_empty() {
        return Ok(0);
    }
    diesel::insert_into(archived_users::table)
        .values(rows)
        .execute(conn)
}

/// Highest archive id currently in use, or 0 for an empty table.
pub fn max_archived_user_id(conn: &mut SqliteConnection) -> Result<i32, diesel::result::Error> {
    use diesel::dsl::max;
    let highest: Option<i32> = archived_users::table
        .select(max(archived_users::archive_id))
        .first(conn)?;
    Ok(highest.unwrap_or(0))
}

/// Returns `(archive_id, original_user_id)` for rows newer than `after`,
/// ascending by archive id.
pub fn archived_user_refs_after(
    conn: &mut SqliteConnection,
    after: i32,
) -> Result<Vec<(i32, i32)>, diesel::result::Error> {
    archived_users::table
        .filter(archived_users::archive_id.gt(after))
        .select((archived_users::archive_id, archived_users::original_user_id))
        .order(archived_users::archive_id.asc())
        .load(conn)
}

/// Loads archive rows by archive id, ascending. Unknown ids are ignored.
pub fn get_archived_users(
    conn: &mut SqliteConnection,
    archive_ids: &[i32],
) -> Result<Vec<ArchivedUser>, diesel::result::Error> {
    archived_users::table
        .filter(archived_users::archive_id.eq_any(archive_ids))
        .order(archived_users::archive_id.asc())
        .select(ArchivedUser::as_select())
        .load(conn)
}

/// Lists every archived user, most recently archived first.
pub fn list_archived_users(conn: &mut SqliteConnection) -> Result<Vec<ArchivedUser>, diesel::result::Error> {
    archived_users::table
        .order((archived_users::deleted_at.desc(), archived_users::archive_id.desc()))
        .select(ArchivedUser::as_select())
        .load(conn)
}

/// Deletes one archive row.
pub fn delete_archived_user(conn: &mut SqliteConnection, archive_id: i32) -> Result<usize, diesel::result::Error> {
    diesel::delete(archived_users::table.filter(archived_users::archive_id.eq(archive_id))).execute(conn)
}

/// Deletes archive rows by archive id.
///
/// # Returns
/// * `Ok(usize)` - Number of archive rows deleted
pub fn delete_archived_users(
    conn: &mut SqliteConnection,
    archive_ids: &[i32],
) -> Result<usize, diesel::result::Error> {
    diesel::delete(archived_users::table.filter(archived_users::archive_id.eq_any(archive_ids))).execute(conn)
}
