#[macro_use]
extern crate rocket;

use rocket::figment::value::Map;
use rocket::figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use rocket::request::Request;
use rocket::serde::json::{Json, Value, json};
use rocket::{Build, Rocket};

pub mod admin_init_fairing;
pub mod api;
pub mod archive;
pub mod generate_types;
pub mod logged_json;
pub mod models;
pub mod orm;
pub mod schema;
pub mod session_guards;

pub use orm::DbConn;

fn error_body(message: &str, req: &Request, code: u16) -> Json<Value> {
    Json(json!({
        "error": message,
        "path": req.uri().path().to_string(),
        "status": code
    }))
}

#[catch(400)]
fn bad_request(req: &Request) -> Json<Value> {
    error_body("Bad Request", req, 400)
}

#[catch(401)]
fn unauthorized(req: &Request) -> Json<Value> {
    error_body("Unauthorized", req, 401)
}

#[catch(403)]
fn forbidden(req: &Request) -> Json<Value> {
    error_body("Forbidden", req, 403)
}

#[catch(404)]
fn not_found(req: &Request) -> Json<Value> {
    error_body("Not Found", req, 404)
}

#[catch(422)]
fn unprocessable_entity(req: &Request) -> Json<Value> {
    error_body("Unprocessable Entity", req, 422)
}

#[catch(500)]
fn internal_server_error(req: &Request) -> Json<Value> {
    error_body("Internal Server Error", req, 500)
}

#[catch(default)]
fn default_catcher(status: rocket::http::Status, req: &Request) -> Json<Value> {
    error_body(status.reason().unwrap_or("Unknown Error"), req, status.code)
}

pub fn mount_api_routes(rocket: Rocket<Build>) -> Rocket<Build> {
    rocket.mount("/api", api::routes()).register(
        "/",
        catchers![
            bad_request,
            unauthorized,
            forbidden,
            not_found,
            unprocessable_entity,
            internal_server_error,
            default_catcher
        ],
    )
}

fn log_rocket_info(rocket: &Rocket<Build>) {
    let figment = rocket.figment();

    if let Ok(address) = figment.extract_inner::<String>("address") {
        info!("Rocket is running at: {}", address);
    }

    if let Ok(port) = figment.extract_inner::<u16>("port") {
        info!("Rocket is listening on port: {}", port);
    }

    match figment.extract_inner::<Map<String, Value>>("databases.sqlite_db") {
        Ok(db_config) => {
            if let Some(Value::String(url)) = db_config.get("url") {
                info!("Database URL: {}", url);
            } else {
                warn!("Database URL not found in configuration");
            }
        }
        Err(e) => {
            warn!("Failed to extract database configuration: {}", e);
        }
    }
}

/// Builds the production server from `Rocket.toml`, `ROCKET_*` variables and
/// `DATABASE_URL`. Tests use `orm::testing::test_rocket` instead.
#[launch]
pub fn rocket() -> Rocket<Build> {
    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let figment = Figment::from(rocket::Config::default())
        .merge(Toml::file("Rocket.toml").nested())
        .merge(Env::prefixed("ROCKET_").global())
        .merge(("databases.sqlite_db.url", database_url));

    let rocket = rocket::custom(figment)
        .attach(DbConn::fairing())
        .attach(orm::run_migrations_fairing())
        .attach(orm::archive_schema_fairing())
        .attach(admin_init_fairing::admin_init_fairing());

    log_rocket_info(&rocket);

    mount_api_routes(rocket)
}
