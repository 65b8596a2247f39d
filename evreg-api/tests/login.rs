#[macro_use]
extern crate time_test;

use chrono::Utc;
use rocket::http::Status;
use rocket::local::asynchronous::Client;
use serde_json::{Value, json};

use evreg_api::DbConn;
use evreg_api::archive::credential::RESTORED_USER_PLACEHOLDER_PASSWORD;
use evreg_api::models::NewArchivedUser;
use evreg_api::orm::archived_user::{insert_archived_users, list_archived_users};
use evreg_api::orm::testing::test_rocket;

#[rocket::async_test]
async fn test_default_admin_login() {
    let client = Client::tracked(test_rocket()).await.expect("valid rocket instance");
    time_test!("test_default_admin_login");

    let response = client
        .post("/api/1/login")
        .json(&json!({ "email": "superadmin@example.com", "password": "admin" }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    assert!(response.cookies().get("session").is_some());

    let body: Value = response.into_json().await.unwrap();
    assert_eq!(body["role"], "admin");
    assert_eq!(body["password_reset_required"], false);
}

#[rocket::async_test]
async fn test_login_rejects_bad_credentials() {
    let client = Client::tracked(test_rocket()).await.expect("valid rocket instance");
    time_test!("test_login_rejects_bad_credentials");

    let response = client
        .post("/api/1/login")
        .json(&json!({ "email": "superadmin@example.com", "password": "nope" }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Unauthorized);
    assert!(response.cookies().get("session").is_none());

    let response = client
        .post("/api/1/login")
        .json(&json!({ "email": "nobody@example.com", "password": "admin" }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Unauthorized);
}

#[rocket::async_test]
async fn test_restored_legacy_user_logs_in_with_placeholder() {
    let client = Client::tracked(test_rocket()).await.expect("valid rocket instance");
    time_test!("test_restored_legacy_user_logs_in_with_placeholder");

    let conn = DbConn::get_one(client.rocket()).await.unwrap();
    let archive_id = conn
        .run(|c| {
            let now = Utc::now().naive_utc();
            insert_archived_users(
                c,
                &[NewArchivedUser {
                    original_user_id: 500,
                    name: "Legacy Larry".to_string(),
                    email: "larry@example.com".to_string(),
                    password_hash: None,
                    role: "attendee".to_string(),
                    company: None,
                    phone: None,
                    bio: None,
                    created_at_original: now,
                    deleted_at: now,
                    deleted_by: None,
                    deletion_source: "legacy".to_string(),
                }],
            )?;
            list_archived_users(c).map(|rows| rows[0].archive_id)
        })
        .await
        .unwrap();

    let admin_session = client
        .post("/api/1/login")
        .json(&json!({ "email": "superadmin@example.com", "password": "admin" }))
        .dispatch()
        .await
        .cookies()
        .get("session")
        .expect("admin session")
        .clone()
        .into_owned();

    let response = client
        .post("/api/1/Archive/users/Restore")
        .cookie(admin_session)
        .json(&json!({ "ids": [archive_id] }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let report: Value = response.into_json().await.unwrap();
    assert_eq!(report["restoredIds"], json!([500]));

    let response = client
        .post("/api/1/login")
        .json(&json!({ "email": "LARRY@example.com", "password": RESTORED_USER_PLACEHOLDER_PASSWORD }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let body: Value = response.into_json().await.unwrap();
    assert_eq!(body["user_id"], 500);
    assert_eq!(body["password_reset_required"], true);
}

#[rocket::async_test]
async fn test_logout_revokes_session() {
    let client = Client::tracked(test_rocket()).await.expect("valid rocket instance");
    time_test!("test_logout_revokes_session");

    let session = client
        .post("/api/1/login")
        .json(&json!({ "email": "superadmin@example.com", "password": "admin" }))
        .dispatch()
        .await
        .cookies()
        .get("session")
        .expect("admin session")
        .clone()
        .into_owned();

    let response = client.get("/api/1/Archive/users").cookie(session.clone()).dispatch().await;
    assert_eq!(response.status(), Status::Ok);

    let response = client.post("/api/1/logout").cookie(session.clone()).dispatch().await;
    assert_eq!(response.status(), Status::NoContent);

    let response = client.get("/api/1/Archive/users").cookie(session).dispatch().await;
    assert_eq!(response.status(), Status::Unauthorized);
}
