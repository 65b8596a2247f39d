pub mod archive;
pub mod login;
pub mod status;

use rocket::Route;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Error body returned by every API failure.
#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ErrorResponse {
    pub error: String,
}

pub fn routes() -> Vec<Route> {
    let mut routes = Vec::new();
    routes.extend(archive::routes());
    routes.extend(login::routes());
    routes.extend(status::routes());
    routes
}
