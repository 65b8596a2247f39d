//! API endpoint for user login.

use rocket::response;
use rocket::serde::json::Json;
use rocket::{
    Route,
    http::{Cookie, CookieJar},
    post,
};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::DbConn;
use crate::api::ErrorResponse;
use crate::models::User;
use crate::orm::login::process_login;
use crate::orm::logout::revoke_session;

/// Login request structure containing user credentials.
#[derive(Clone, Deserialize, TS)]
#[ts(export)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login success response structure containing user information.
#[derive(Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LoginSuccessResponse {
    pub user_id: i32,
    pub email: String,
    pub name: String,
    pub role: String,
    pub password_reset_required: bool,
}

impl From<User> for LoginSuccessResponse {
    fn from(user: User) -> Self {
        LoginSuccessResponse {
            user_id: user.id,
            email: user.email,
            name: user.name,
            role: user.role,
            password_reset_required: user.password_reset_required,
        }
    }
}

/// Login endpoint that authenticates users and creates sessions.
///
/// - **URL:** `/api/1/login`
/// - **Method:** `POST`
/// - **Purpose:** Authenticates a user by email and password, and sets a secure session cookie
/// - **Authentication:** None required
///
/// # Request Format
///
/// ```json
/// {
///   "email": "user@example.com",
///   "password": "userpassword"
/// }
/// ```
///
/// # Response
///
/// **Success (HTTP 200 OK):**
/// ```json
/// {
///   "user_id": 1,
///   "email": "user@example.com",
///   "name": "Alice Example",
///   "role": "admin",
///   "password_reset_required": false
/// }
/// ```
/// Sets the `session` cookie (HTTP-only, SameSite=Lax).
///
/// **Failure (HTTP 400 / 401):**
/// ```json
/// { "error": "Invalid credentials" }
/// ```
///
/// Users restored from the archive without a stored credential log in with
/// the restore placeholder password and come back with
/// `password_reset_required: true`.
#[post("/1/login", data = "<login>")]
pub async fn login(
    db: DbConn,
    cookies: &CookieJar<'_>,
    login: Json<LoginRequest>,
) -> Result<Json<LoginSuccessResponse>, response::status::Custom<Json<ErrorResponse>>> {
    match process_login(&db, cookies, &login).await {
        Ok(user) => Ok(Json(user.into())),
        Err(status) => Err(response::status::Custom(
            status,
            Json(ErrorResponse {
                error: "Invalid credentials".to_string(),
            }),
        )),
    }
}

/// Logout endpoint.
///
/// - **URL:** `/api/1/logout`
/// - **Method:** `POST`
/// - **Purpose:** Revokes the current session and clears the cookie
/// - **Authentication:** None required
///
/// Always answers 204, with or without a session.
#[post("/1/logout")]
pub async fn logout(db: DbConn, cookies: &CookieJar<'_>) -> rocket::http::Status {
    if let Some(session_id) = cookies.get("session").map(|c| c.value().to_string()) {
        if let Err(e) = db.run(move |conn| revoke_session(conn, &session_id)).await {
            error!("Failed to revoke session: {:?}", e);
        }
        cookies.remove(Cookie::from("session"));
    }
    rocket::http::Status::NoContent
}

pub fn routes() -> Vec<Route> {
    routes![login, logout]
}
