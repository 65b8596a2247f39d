//! API endpoints for bulk archive, restore and purge.
//!
//! All endpoints require an admin session. `<family>` is one of `users`,
//! `events` or `registrations`. Request bodies carry the ids to act on:
//!
//! ```json
//! { "ids": [12, "13", 14] }
//! ```
//!
//! Ids may be JSON integers or strings holding an integer. Duplicates are
//! collapsed. An empty list, a non-numeric id or a non-positive id is
//! rejected with 400 before anything is touched.

use rocket::Route;
use rocket::http::Status;
use rocket::response::status;
use rocket::serde::json::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;

use crate::api::ErrorResponse;
use crate::archive::service::{archived_registrations, archived_users};
use crate::archive::{
    ArchiveError, ArchiveSummary, EntityFamily, PurgeSummary, RestoreReport, bulk_archive, bulk_purge,
    bulk_restore, parse_ids,
};
use crate::logged_json::LoggedJson;
use crate::models::{ArchivedRegistration, ArchivedUser};
use crate::orm::DbConn;
use crate::session_guards::AdminUser;

type ApiError = status::Custom<Json<ErrorResponse>>;

/// Body of every bulk request.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BulkIdsRequest {
    #[serde(default)]
    #[ts(type = "Array<number | string>")]
    pub ids: Vec<Value>,
}

fn archive_error_response(err: ArchiveError) -> ApiError {
    if err.is_input_error() {
        return status::Custom(
            Status::BadRequest,
            Json(ErrorResponse {
                error: err.to_string(),
            }),
        );
    }
    error!("Bulk archive operation failed: {}", err);
    status::Custom(
        Status::InternalServerError,
        Json(ErrorResponse {
            error: "Internal error while processing bulk request".to_string(),
        }),
    )
}

/// Bulk Delete endpoint.
///
/// - **URL:** `/api/1/Archive/<family>/Delete`
/// - **Method:** `POST`
/// - **Purpose:** Moves users or registrations into the archive; soft-deletes events
/// - **Authentication:** Admin
///
/// Deleting a user also archives that user's registrations; their ids are
/// listed in `cascadedRegistrationIds`. Ids that have no live row are ignored.
///
/// # Response
///
/// **Success (HTTP 200 OK):**
/// ```json
/// { "archivedCount": 2, "archivedIds": [12, 14], "cascadedRegistrationIds": [31, 40] }
/// ```
///
/// **Failure (HTTP 400 Bad Request):**
/// ```json
/// { "error": "no ids supplied" }
/// ```
#[post("/1/Archive/<family>/Delete", data = "<request>")]
pub async fn bulk_delete(
    db: DbConn,
    family: EntityFamily,
    admin: AdminUser,
    request: LoggedJson<BulkIdsRequest>,
) -> Result<Json<ArchiveSummary>, ApiError> {
    let ids = parse_ids(&request.ids).map_err(archive_error_response)?;
    let actor = admin.actor();
    db.run(move |conn| bulk_archive(conn, family, &ids, &actor))
        .await
        .map(Json)
        .map_err(archive_error_response)
}

/// Bulk Restore endpoint.
///
/// - **URL:** `/api/1/Archive/<family>/Restore`
/// - **Method:** `POST`
/// - **Purpose:** Re-admits archived rows into live storage
/// - **Authentication:** Admin
///
/// Users and registrations are addressed by archive id, events by event id.
/// Rows that conflict with the current live data stay archived and are
/// listed under `skipped`; the rest are restored.
///
/// # Response
///
/// **Success (HTTP 200 OK):**
/// ```json
/// {
///   "requested": 2,
///   "restored": 1,
///   "restoredIds": [10],
///   "skippedCount": 1,
///   "skipped": [{ "id": 7, "reason": "user_missing" }]
/// }
/// ```
///
/// Skip reasons: `event_missing_or_archived`, `user_missing`,
/// `already_exists`, `user_id_exists`, `email_exists`, `not_found`.
#[post("/1/Archive/<family>/Restore", data = "<request>")]
pub async fn bulk_restore_endpoint(
    db: DbConn,
    family: EntityFamily,
    admin: AdminUser,
    request: LoggedJson<BulkIdsRequest>,
) -> Result<Json<RestoreReport>, ApiError> {
    let ids = parse_ids(&request.ids).map_err(archive_error_response)?;
    let actor = admin.actor();
    db.run(move |conn| bulk_restore(conn, family, &ids, &actor))
        .await
        .map(Json)
        .map_err(archive_error_response)
}

/// Bulk Purge endpoint.
///
/// - **URL:** `/api/1/Archive/<family>/Purge`
/// - **Method:** `POST`
/// - **Purpose:** Permanently deletes archived users/registrations, or soft-deleted events
/// - **Authentication:** Admin
///
/// Live events named in the request are left alone. Registrations still
/// attached to a purged event are archived first.
///
/// # Response
///
/// **Success (HTTP 200 OK):**
/// ```json
/// { "deletedCount": 3 }
/// ```
#[post("/1/Archive/<family>/Purge", data = "<request>")]
pub async fn bulk_purge_endpoint(
    db: DbConn,
    family: EntityFamily,
    admin: AdminUser,
    request: LoggedJson<BulkIdsRequest>,
) -> Result<Json<PurgeSummary>, ApiError> {
    let ids = parse_ids(&request.ids).map_err(archive_error_response)?;
    let actor = admin.actor();
    db.run(move |conn| bulk_purge(conn, family, &ids, &actor))
        .await
        .map(Json)
        .map_err(archive_error_response)
}

/// List Archived Users endpoint.
///
/// - **URL:** `/api/1/Archive/users`
/// - **Method:** `GET`
/// - **Authentication:** Admin
///
/// Returns archived users, most recently archived first. Password hashes
/// are never included.
#[get("/1/Archive/users")]
pub async fn list_archived_users(db: DbConn, _admin: AdminUser) -> Result<Json<Vec<ArchivedUser>>, ApiError> {
    db.run(|conn| archived_users(conn))
        .await
        .map(Json)
        .map_err(archive_error_response)
}

/// List Archived Registrations endpoint.
///
/// - **URL:** `/api/1/Archive/registrations`
/// - **Method:** `GET`
/// - **Authentication:** Admin
///
/// Returns archived registrations with their user and event snapshot, most
/// recently archived first.
#[get("/1/Archive/registrations")]
pub async fn list_archived_registrations(
    db: DbConn,
    _admin: AdminUser,
) -> Result<Json<Vec<ArchivedRegistration>>, ApiError> {
    db.run(|conn| archived_registrations(conn))
        .await
        .map(Json)
        .map_err(archive_error_response)
}

pub fn routes() -> Vec<Route> {
    routes![
        bulk_delete,
        bulk_restore_endpoint,
        bulk_purge_endpoint,
        list_archived_users,
        list_archived_registrations
    ]
}
