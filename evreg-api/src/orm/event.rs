use chrono::NaiveDateTime;
use diesel::QueryableByName;
use diesel::prelude::*;
use diesel::sql_types::BigInt;

use crate::models::{Event, NewEvent};

#[derive(QueryableByName)]
struct LastInsertRowId {
    #[diesel(sql_type = BigInt)]
    last_insert_rowid: i64,
}

/// Inserts a new event and returns it with its database-assigned id.
pub fn insert_event(
    conn: &mut SqliteConnection,
    new_event: NewEvent,
) -> Result<Event, diesel::result::Error> {
    use crate::schema::events::dsl::*;

    diesel::insert_into(events)
        .values(&new_event)
        .execute(conn)?;

    let last_id = diesel::sql_query("SELECT last_insert_rowid() as last_insert_rowid")
        .get_result::<LastInsertRowId>(conn)?
        .last_insert_rowid;

    events.filter(id.eq(last_id as i32)).first::<Event>(conn)
}

/// Gets a single event by ID, whether or not it is soft-deleted.
pub fn get_event(conn: &mut SqliteConnection, event_id: i32) -> Result<Option<Event>, diesel::result::Error> {
    use crate::schema::events::dsl::*;
    events.filter(id.eq(event_id)).first::<Event>(conn).optional()
}

/// Returns true when the event exists and is not soft-deleted.
pub fn is_event_active(conn: &mut SqliteConnection, event_id: i32) -> Result<bool, diesel::result::Error> {
    use crate::schema::events::dsl::*;
    let count: i64 = events
        .filter(id.eq(event_id))
        .filter(deleted_at.is_null())
        .count()
        .get_result(conn)?;
    Ok(count > 0)
}

/// Marks the live events among `event_ids` as deleted.
///
/// Events that are already soft-deleted keep their original `deleted_at`.
/// Returns the ids that were marked, ascending.
pub fn mark_events_deleted(
    conn: &mut SqliteConnection,
    event_ids: &[i32],
    deleted_on: NaiveDateTime,
    actor_id: Option<i32>,
) -> Result<Vec<i32>, diesel::result::Error> {
    use crate::schema::events::dsl::*;

    let targets: Vec<i32> = events
        .filter(id.eq_any(event_ids))
        .filter(deleted_at.is_null())
        .select(id)
        .order(id.asc())
        .load(conn)?;

    if !targets.is_empty() {
        diesel::update(events.filter(id.eq_any(&targets)))
            .set((deleted_at.eq(Some(deleted_on)), deleted_by.eq(actor_id)))
            .execute(conn)?;
    }

    Ok(targets)
}

/// Clears the soft-delete marker on one event.
pub fn clear_event_deleted(conn: &mut SqliteConnection, event_id: i32) -> Result<usize, diesel::result::Error> {
    use crate::schema::events::dsl::*;
    diesel::update(events.filter(id.eq(event_id)))
        .set((deleted_at.eq(None::<NaiveDateTime>), deleted_by.eq(None::<i32>)))
        .execute(conn)
}

/// Returns the ids of soft-deleted events among `event_ids`, ascending.
pub fn soft_deleted_event_ids(
    conn: &mut SqliteConnection,
    event_ids: &[i32],
) -> Result<Vec<i32>, diesel::result::Error> {
    use crate::schema::events::dsl::*;
    events
        .filter(id.eq_any(event_ids))
        .filter(deleted_at.is_not_null())
        .select(id)
        .order(id.asc())
        .load(conn)
}

/// Permanently removes the given events.
///
/// # Returns
/// * `Ok(usize)` - Number of events deleted
pub fn delete_events(conn: &mut SqliteConnection, event_ids: &[i32]) -> Result<usize, diesel::result::Error> {
    use crate::schema::events::dsl::*;
    diesel::delete(events.filter(id.eq_any(event_ids))).execute(conn)
}
