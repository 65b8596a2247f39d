use diesel::QueryableByName;
use diesel::prelude::*;
use diesel::sql_types::BigInt;

use crate::models::{NewUser, RestoredUser, User};

#[derive(QueryableByName)]
struct LastInsertRowId {
    #[diesel(sql_type = BigInt)]
    last_insert_rowid: i64,
}

/// Inserts a new user and returns it with its database-assigned id.
pub fn insert_user(
    conn: &mut SqliteConnection,
    new_user: NewUser,
) -> Result<User, diesel::result::Error> {
    use crate::schema::users::dsl::*;

    diesel::insert_into(users)
        .values(&new_user)
        .execute(conn)?;

    let last_id = diesel::sql_query("SELECT last_insert_rowid() as last_insert_rowid")
        .get_result::<LastInsertRowId>(conn)?
        .last_insert_rowid;

    users.filter(id.eq(last_id as i32)).first::<User>(conn)
}

/// Re-inserts a user under its original id.
pub fn insert_restored_user(
    conn: &mut SqliteConnection,
    restored: &RestoredUser,
) -> Result<usize, diesel::result::Error> {
    use crate::schema::users::dsl::*;

    diesel::insert_into(users).values(restored).execute(conn)
}

/// Gets a single user by ID.
pub fn get_user(conn: &mut SqliteConnection, user_id: i32) -> Result<Option<User>, diesel::result::Error> {
    use crate::schema::users::dsl::*;
    users.filter(id.eq(user_id)).first::<User>(conn).optional()
}

/// Gets the users with the given ids, ordered by id. Missing ids are ignored.
pub fn get_users_by_ids(
    conn: &mut SqliteConnection,
    user_ids: &[i32],
) -> Result<Vec<User>, diesel::result::Error> {
    use crate::schema::users::dsl::*;
    users
        .filter(id.eq_any(user_ids))
        .order(id.asc())
        .load::<User>(conn)
}

/// Gets a single user by email (case-insensitive).
pub fn get_user_by_email(
    conn: &mut SqliteConnection,
    user_email: &str,
) -> Result<Option<User>, diesel::result::Error> {
    diesel::sql_query("SELECT * FROM users WHERE LOWER(email) = LOWER(?)")
        .bind::<diesel::sql_types::Text, _>(user_email)
        .get_result::<User>(conn)
        .optional()
}

/// Deletes the users with the given ids along with their sessions.
///
/// Registrations are not touched; callers archive them first.
///
/// # Returns
/// * `Ok(usize)` - Number of users deleted
pub fn delete_users(
    conn: &mut SqliteConnection,
    user_ids: &[i32],
) -> Result<usize, diesel::result::Error> {
    use crate::schema::{sessions, users};

    diesel::delete(sessions::table.filter(sessions::user_id.eq_any(user_ids))).execute(conn)?;
    diesel::delete(users::table.filter(users::id.eq_any(user_ids))).execute(conn)
}
