use diesel::QueryableByName;
use diesel::prelude::*;
use diesel::sql_types::BigInt;

use crate::models::{NewRegistration, Registration, RegistrationSnapshot, RestoredRegistration};
use crate::schema::{events, registrations, users};

#[derive(QueryableByName)]
struct LastInsertRowId {
    #[diesel(sql_type = BigInt)]
    last_insert_rowid: i64,
}

/// Picks which live registrations an archive call captures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationSelector {
    /// Registrations with these ids.
    Ids(Vec<i32>),
    /// Every registration for these events.
    ByEvents(Vec<i32>),
    /// Every registration held by these users.
    ByUsers(Vec<i32>),
}

impl RegistrationSelector {
    pub fn is_empty(&self) -> bool {
        match self {
            RegistrationSelector::Ids(ids)
            | RegistrationSelector::ByEvents(ids)
            | RegistrationSelector::ByUsers(ids) => ids.is_empty(),
        }
    }
}

pub fn insert_registration(
    conn: &mut SqliteConnection,
    new_registration: NewRegistration,
) -> Result<Registration, diesel::result::Error> {
    diesel::insert_into(registrations::table)
        .values(&new_registration)
        .execute(conn)?;

    let last_id = diesel::sql_query("SELECT last_insert_rowid() as last_insert_rowid")
        .get_result::<LastInsertRowId>(conn)?
        .last_insert_rowid;

    registrations::table
        .filter(registrations::id.eq(last_id as i32))
        .first::<Registration>(conn)
}

/// Re-inserts a registration under its original id.
pub fn insert_restored_registration(
    conn: &mut SqliteConnection,
    restored: &RestoredRegistration,
) -> Result<usize, diesel::result::Error> {
    diesel::insert_into(registrations::table)
        .values(restored)
        .execute(conn)
}

pub fn get_registration(
    conn: &mut SqliteConnection,
    registration_id: i32,
) -> Result<Option<Registration>, diesel::result::Error> {
    registrations::table
        .filter(registrations::id.eq(registration_id))
        .first::<Registration>(conn)
        .optional()
}

/// Finds the live registration of `user_id` for `event_id`, if any.
pub fn find_registration_for(
    conn: &mut SqliteConnection,
    event_id: i32,
    user_id: i32,
) -> Result<Option<Registration>, diesel::result::Error> {
    registrations::table
        .filter(registrations::event_id.eq(event_id))
        .filter(registrations::user_id.eq(user_id))
        .first::<Registration>(conn)
        .optional()
}

/// Lists live registrations for one event, ascending by id.
pub fn list_registrations_for_event(
    conn: &mut SqliteConnection,
    event_id: i32,
) -> Result<Vec<Registration>, diesel::result::Error> {
    registrations::table
        .filter(registrations::event_id.eq(event_id))
        .order(registrations::id.asc())
        .load::<Registration>(conn)
}

/// Loads the selected registrations joined with their user and event.
///
/// Rows come back ascending by registration id. Registrations whose user or
/// event row is gone are not returned.
pub fn load_registration_snapshots(
    conn: &mut SqliteConnection,
    selector: &RegistrationSelector,
) -> Result<Vec<RegistrationSnapshot>, diesel::result::Error> {
    let mut query = registrations::table
        .inner_join(users::table)
        .inner_join(events::table)
        .select((
            registrations::id,
            registrations::event_id,
            registrations::user_id,
            registrations::status,
            registrations::registered_at,
            users::name,
            users::email,
            events::title,
            events::event_date,
            events::event_time,
            events::location,
        ))
        .order(registrations::id.asc())
        .into_boxed();

    query = match selector {
        RegistrationSelector::Ids(ids) => query.filter(registrations::id.eq_any(ids.clone())),
        RegistrationSelector::ByEvents(ids) => query.filter(registrations::event_id.eq_any(ids.clone())),
        RegistrationSelector::ByUsers(ids) => query.filter(registrations::user_id.eq_any(ids.clone())),
    };

    query.load::<RegistrationSnapshot>(conn)
}

/// Deletes live registrations by id.
///
/// # Returns
/// * `Ok(usize)` - Number of registrations deleted
pub fn delete_registrations(
    conn: &mut SqliteConnection,
    registration_ids: &[i32],
) -> Result<usize, diesel::result::Error> {
    diesel::delete(registrations::table.filter(registrations::id.eq_any(registration_ids))).execute(conn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orm::testing::{seed_fixture, setup_test_db};

    #[test]
    fn test_snapshot_captures_user_and_event_fields() {
        let mut conn = setup_test_db();
        let fixture = seed_fixture(&mut conn).unwrap();
        let first = &fixture.registrations[0];

        let snapshots =
            load_registration_snapshots(&mut conn, &RegistrationSelector::Ids(vec![first.id])).unwrap();
        assert_eq!(snapshots.len(), 1);
        let snap = &snapshots[0];
        assert_eq!(snap.id, first.id);
        assert_eq!(snap.user_name, "Alice Example");
        assert_eq!(snap.user_email, "alice@example.com");
        assert_eq!(snap.event_title, "Rust Meetup");
        assert_eq!(snap.event_date, fixture.meetup.event_date);
        assert_eq!(snap.event_time.as_deref(), Some("18:30"));
        assert_eq!(snap.event_location.as_deref(), Some("Room 101"));
        assert_eq!(snap.registered_at, first.registered_at);
    }

    #[test]
    fn test_selectors_resolve_dependents() {
        let mut conn = setup_test_db();
        let fixture = seed_fixture(&mut conn).unwrap();

        let by_event =
            load_registration_snapshots(&mut conn, &RegistrationSelector::ByEvents(vec![fixture.launch.id]))
                .unwrap();
        let ids: Vec<i32> = by_event.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![fixture.registrations[2].id, fixture.registrations[3].id]);

        let by_user =
            load_registration_snapshots(&mut conn, &RegistrationSelector::ByUsers(vec![fixture.bob.id])).unwrap();
        let ids: Vec<i32> = by_user.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![fixture.registrations[1].id, fixture.registrations[3].id]);

        let none =
            load_registration_snapshots(&mut conn, &RegistrationSelector::ByUsers(vec![fixture.carol.id])).unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_pair_is_unique() {
        let mut conn = setup_test_db();
        let fixture = seed_fixture(&mut conn).unwrap();

        let duplicate = insert_registration(
            &mut conn,
            NewRegistration {
                event_id: fixture.meetup.id,
                user_id: fixture.alice.id,
                status: "registered".to_string(),
            },
        );
        assert!(duplicate.is_err());

        let found = find_registration_for(&mut conn, fixture.meetup.id, fixture.alice.id)
            .unwrap()
            .expect("registration exists");
        assert_eq!(found, fixture.registrations[0]);
    }

    #[test]
    fn test_delete_registrations() {
        let mut conn = setup_test_db();
        let fixture = seed_fixture(&mut conn).unwrap();

        let deleted = delete_registrations(&mut conn, &[fixture.registrations[0].id, 4242]).unwrap();
        assert_eq!(deleted, 1);
        assert!(get_registration(&mut conn, fixture.registrations[0].id).unwrap().is_none());
        assert_eq!(list_registrations_for_event(&mut conn, fixture.meetup.id).unwrap().len(), 1);
    }
}
