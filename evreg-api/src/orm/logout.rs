//! Session revocation.

use diesel::prelude::*;

use crate::schema::sessions;

/// Marks a session as revoked. The row is kept; the session guard ignores
/// revoked sessions. Returns the number of sessions affected (0 for an
/// unknown token).
pub fn revoke_session(conn: &mut SqliteConnection, session_id: &str) -> Result<usize, diesel::result::Error> {
    diesel::update(sessions::table.filter(sessions::id.eq(session_id)))
        .set(sessions::revoked.eq(true))
        .execute(conn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Session;
    use crate::orm::login::create_session;
    use crate::orm::testing::{seed_fixture, setup_test_db};

    #[test]
    fn test_revoke_session() {
        let mut conn = setup_test_db();
        let fixture = seed_fixture(&mut conn).unwrap();
        let token = create_session(&mut conn, fixture.alice.id).unwrap();

        assert_eq!(revoke_session(&mut conn, &token).unwrap(), 1);
        let session: Session = sessions::table.find(&token).first(&mut conn).unwrap();
        assert!(session.revoked);

        assert_eq!(revoke_session(&mut conn, "no-such-token").unwrap(), 0);
    }
}
