//! Session-based authentication and authorization guards for Rocket routes.
//!
//! ```rust
//! use rocket::get;
//! use evreg_api::session_guards::AdminUser;
//!
//! #[get("/admin-panel")]
//! fn admin_panel(user: AdminUser) -> String {
//!     format!("Admin panel access for {}", user.user.email)
//! }
//! ```

use chrono::Utc;
use diesel::prelude::*;
use rocket::http::Status;
use rocket::outcome::Outcome;
use rocket::request::{self, FromRequest, Request};

use crate::DbConn;
use crate::archive::Actor;
use crate::models::{Session, User, roles};
use crate::schema::{sessions, users};

/// A request guard for routes that require an authenticated user.
///
/// Reads the `session` cookie, looks up a session that is neither revoked nor
/// expired and loads its user.
///
/// # Returns
///
/// - `Outcome::Success(AuthenticatedUser)` if authentication succeeds
/// - `Outcome::Error(Status::Unauthorized)` if the session or user is missing
/// - `Outcome::Error(Status::InternalServerError)` if no database connection is available
#[derive(Debug)]
pub struct AuthenticatedUser {
    pub user: User,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AuthenticatedUser {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let db = match request.guard::<DbConn>().await {
            Outcome::Success(db) => db,
            _ => return Outcome::Error((Status::InternalServerError, ())),
        };

        let session_id = match request.cookies().get("session") {
            Some(cookie) => cookie.value().to_string(),
            None => return Outcome::Error((Status::Unauthorized, ())),
        };

        let lookup = db
            .run(move |conn| -> Result<Option<User>, diesel::result::Error> {
                let session = sessions::table
                    .filter(sessions::id.eq(&session_id))
                    .filter(sessions::revoked.eq(false))
                    .filter(
                        sessions::expires_at
                            .is_null()
                            .or(sessions::expires_at.gt(Utc::now().naive_utc())),
                    )
                    .first::<Session>(conn)
                    .optional()?;
                match session {
                    Some(session) => users::table
                        .filter(users::id.eq(session.user_id))
                        .first::<User>(conn)
                        .optional(),
                    None => Ok(None),
                }
            })
            .await;

        match lookup {
            Ok(Some(user)) => Outcome::Success(AuthenticatedUser { user }),
            Ok(None) => Outcome::Error((Status::Unauthorized, ())),
            Err(e) => {
                error!("Database error resolving session: {:?}", e);
                Outcome::Error((Status::Unauthorized, ()))
            }
        }
    }
}

impl AuthenticatedUser {
    pub fn has_role(&self, role_name: &str) -> bool {
        self.user.role == role_name
    }
}

/// A request guard that requires the "admin" role.
///
/// - `Outcome::Error(Status::Forbidden)` if the user is authenticated but not an admin
/// - `Outcome::Error(Status::Unauthorized)` if the user is not authenticated
#[derive(Debug)]
pub struct AdminUser {
    pub user: User,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AdminUser {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let auth_user = match AuthenticatedUser::from_request(request).await {
            Outcome::Success(user) => user,
            Outcome::Error(e) => return Outcome::Error(e),
            Outcome::Forward(f) => return Outcome::Forward(f),
        };

        if auth_user.has_role(roles::ADMIN) {
            Outcome::Success(AdminUser { user: auth_user.user })
        } else {
            Outcome::Error((Status::Forbidden, ()))
        }
    }
}

impl AdminUser {
    /// The identity recorded on archive rows and audit entries.
    pub fn actor(&self) -> Actor {
        Actor {
            id: self.user.id,
            role: self.user.role.clone(),
        }
    }
}
