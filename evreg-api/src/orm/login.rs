//! Database operations for user authentication and session management.
//!
//! This module provides database layer functions for user login, session creation,
//! password hashing and verification, and session storage.

use argon2::{
    Argon2, PasswordHasher,
    password_hash::{self, PasswordHash, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use diesel::prelude::*;
use rocket::http::{Cookie, CookieJar, SameSite, Status};
use uuid::Uuid;

use crate::DbConn;
use crate::models::{NewSession, User};
use crate::orm::user::get_user_by_email;
use crate::schema::sessions;

/// Generates a new UUID-based session token.
fn generate_session_token() -> String {
    Uuid::new_v4().to_string()
}

/// Verifies a password against a stored hash.
///
/// Returns `false` when the password doesn't match or the stored hash
/// cannot be parsed.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed_hash) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok(),
        Err(_) => false,
    }
}

/// Creates a new session row for `user_id` and returns its token.
pub fn create_session(conn: &mut SqliteConnection, user_id: i32) -> Result<String, diesel::result::Error> {
    let session_token = generate_session_token();

    let new_session = NewSession {
        id: session_token.clone(),
        user_id,
        created_at: Utc::now().naive_utc(),
        expires_at: None,
        revoked: false,
    };

    diesel::insert_into(sessions::table)
        .values(&new_session)
        .execute(conn)?;

    Ok(session_token)
}

/// Sets a secure session cookie in the response.
///
/// - `http_only(true)` - Prevents JavaScript access to the cookie
/// - `secure(true)` - Requires HTTPS for cookie transmission (off in unit tests)
/// - `same_site(SameSite::Lax)` - Provides CSRF protection
/// - `path("/")` - Makes cookie available for all paths
fn set_session_cookie(cookies: &CookieJar<'_>, session_token: &str) {
    let secure_flag = !cfg!(test);
    let cookie = Cookie::build(("session", session_token.to_string()))
        .http_only(true)
        .secure(secure_flag)
        .same_site(SameSite::Lax)
        .path("/")
        .build();
    cookies.add(cookie);
}

/// Processes a complete login workflow including validation and session creation.
///
/// # Returns
/// * `Ok(User)` - Login successful, session created and cookie set
/// * `Err(Status::BadRequest)` - Empty email or password provided
/// * `Err(Status::Unauthorized)` - Invalid credentials or user not found
/// * `Err(Status::InternalServerError)` - Database operation failed
///
/// Returns a generic "Unauthorized" for both unknown users and wrong passwords.
pub async fn process_login(
    db: &DbConn,
    cookies: &CookieJar<'_>,
    login: &crate::api::login::LoginRequest,
) -> Result<User, Status> {
    if login.email.trim().is_empty() || login.password.trim().is_empty() {
        return Err(Status::BadRequest);
    }

    let email = login.email.clone();
    let user = db
        .run(move |conn| get_user_by_email(conn, &email))
        .await
        .map_err(|e| {
            error!("Database error finding user for login: {:?}", e);
            Status::InternalServerError
        })?
        .ok_or(Status::Unauthorized)?;

    if !verify_password(&login.password, &user.password_hash) {
        return Err(Status::Unauthorized);
    }

    let user_id = user.id;
    let session_token = db
        .run(move |conn| create_session(conn, user_id))
        .await
        .map_err(|e| {
            error!("Database error storing session: {:?}", e);
            Status::InternalServerError
        })?;
    set_session_cookie(cookies, &session_token);

    Ok(user)
}

/// Hashes a password using Argon2 with a random salt.
pub fn try_hash_password(password: &str) -> Result<String, password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

/// Hashes a password using Argon2 with a random salt.
///
/// # Panics
/// Panics if hashing fails (should not happen with default parameters)
pub fn hash_password(password: &str) -> String {
    try_hash_password(password).expect("Hashing should succeed")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewUser, Session};
    use crate::orm::testing::setup_test_db;
    use crate::orm::user::insert_user;

    #[test]
    fn test_verify_password() {
        let hash = hash_password("correct_password");

        assert!(verify_password("correct_password", &hash));
        assert!(!verify_password("wrong_password", &hash));
    }

    #[test]
    fn test_verify_password_rejects_garbage_hash() {
        assert!(!verify_password("anything", "not-a-phc-string"));
        assert!(!verify_password("anything", ""));
    }

    #[test]
    fn test_hashes_are_salted() {
        let first = hash_password("same");
        let second = hash_password("same");
        assert_ne!(first, second);
        assert!(verify_password("same", &first));
        assert!(verify_password("same", &second));
    }

    #[test]
    fn test_create_session() {
        let mut conn = setup_test_db();
        let user = insert_user(
            &mut conn,
            NewUser {
                name: "Karl".to_string(),
                email: "karl@example.com".to_string(),
                password_hash: hash_password("dummy password"),
                role: "attendee".to_string(),
                company: None,
                phone: None,
                bio: None,
            },
        )
        .expect("insert user");

        let token = create_session(&mut conn, user.id).expect("session creation should succeed");

        let session = sessions::table
            .filter(sessions::id.eq(&token))
            .first::<Session>(&mut conn)
            .expect("session row");
        assert_eq!(session.user_id, user.id);
        assert!(!session.revoked);
        assert!(session.expires_at.is_none());

        let now = Utc::now().naive_utc();
        assert!(session.created_at <= now);
        assert!(session.created_at > now - chrono::Duration::minutes(1));
    }
}
