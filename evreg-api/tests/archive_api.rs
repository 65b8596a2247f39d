//! End-to-end tests for the bulk archive, restore and purge endpoints.

#[macro_use]
extern crate time_test;

use diesel::RunQueryDsl;
use rocket::http::{Cookie, Status};
use rocket::local::asynchronous::Client;
use serde_json::{Value, json};

use evreg_api::DbConn;
use evreg_api::orm::audit_log::list_audit_logs;
use evreg_api::orm::registration::get_registration;
use evreg_api::orm::testing::{FIXTURE_PASSWORD, Fixture, seed_fixture, test_rocket};
use evreg_api::orm::user::get_user;

async fn login(client: &Client, email: &str, password: &str) -> Cookie<'static> {
    let response = client
        .post("/api/1/login")
        .json(&json!({ "email": email, "password": password }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok, "login failed for {}", email);
    response
        .cookies()
        .get("session")
        .expect("Session cookie should be set")
        .clone()
        .into_owned()
}

async fn login_admin(client: &Client) -> Cookie<'static> {
    login(client, "superadmin@example.com", "admin").await
}

async fn seed(client: &Client) -> Fixture {
    let conn = DbConn::get_one(client.rocket()).await.expect("database connection");
    conn.run(|c| seed_fixture(c)).await.expect("seed fixture")
}

async fn post_ids(client: &Client, session: &Cookie<'static>, path: &str, ids: Value) -> (Status, Value) {
    let response = client
        .post(path)
        .cookie(session.clone())
        .json(&json!({ "ids": ids }))
        .dispatch()
        .await;
    let status = response.status();
    let body = response.into_json::<Value>().await.unwrap_or(Value::Null);
    (status, body)
}

async fn archive_id_for_registration(client: &Client, session: &Cookie<'static>, original_id: i32) -> i64 {
    let rows: Value = client
        .get("/api/1/Archive/registrations")
        .cookie(session.clone())
        .dispatch()
        .await
        .into_json()
        .await
        .expect("archived registrations JSON");
    rows.as_array()
        .expect("array of archived registrations")
        .iter()
        .find(|r| r["original_registration_id"] == original_id)
        .and_then(|r| r["archive_id"].as_i64())
        .expect("archive row for registration")
}

#[rocket::async_test]
async fn test_bulk_endpoints_require_session() {
    let client = Client::tracked(test_rocket()).await.expect("valid rocket instance");
    time_test!("test_bulk_endpoints_require_session");

    for path in [
        "/api/1/Archive/users/Delete",
        "/api/1/Archive/events/Restore",
        "/api/1/Archive/registrations/Purge",
    ] {
        let response = client.post(path).json(&json!({ "ids": [1] })).dispatch().await;
        assert_eq!(response.status(), Status::Unauthorized, "{}", path);
    }

    let response = client.get("/api/1/Archive/users").dispatch().await;
    assert_eq!(response.status(), Status::Unauthorized);
}

#[rocket::async_test]
async fn test_non_admin_is_forbidden() {
    let client = Client::tracked(test_rocket()).await.expect("valid rocket instance");
    time_test!("test_non_admin_is_forbidden");
    let fixture = seed(&client).await;
    let session = login(&client, &fixture.carol.email, FIXTURE_PASSWORD).await;

    let (status, _) = post_ids(
        &client,
        &session,
        "/api/1/Archive/users/Delete",
        json!([fixture.alice.id]),
    )
    .await;
    assert_eq!(status, Status::Forbidden);

    let conn = DbConn::get_one(client.rocket()).await.unwrap();
    let alice_id = fixture.alice.id;
    let alice = conn.run(move |c| get_user(c, alice_id)).await.unwrap();
    assert!(alice.is_some());
}

#[rocket::async_test]
async fn test_invalid_ids_are_bad_requests() {
    let client = Client::tracked(test_rocket()).await.expect("valid rocket instance");
    time_test!("test_invalid_ids_are_bad_requests");
    let session = login_admin(&client).await;

    for ids in [json!([]), json!(["abc"]), json!([0]), json!([-3]), json!([1, null]), json!([2.5])] {
        let (status, body) = post_ids(&client, &session, "/api/1/Archive/registrations/Delete", ids.clone()).await;
        assert_eq!(status, Status::BadRequest, "ids {}", ids);
        assert!(body["error"].is_string());
    }

    let response = client
        .post("/api/1/Archive/users/Restore")
        .cookie(session.clone())
        .json(&json!({}))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::BadRequest);
}

#[rocket::async_test]
async fn test_restore_skips_registration_whose_user_was_archived() {
    let client = Client::tracked(test_rocket()).await.expect("valid rocket instance");
    time_test!("test_restore_skips_registration_whose_user_was_archived");
    let fixture = seed(&client).await;
    let session = login_admin(&client).await;
    let kept = fixture.registrations[0].id;
    let orphaned = fixture.registrations[1].id;

    let (status, body) = post_ids(
        &client,
        &session,
        "/api/1/Archive/registrations/Delete",
        json!([kept, orphaned.to_string()]),
    )
    .await;
    assert_eq!(status, Status::Ok);
    assert_eq!(
        body,
        json!({ "archivedCount": 2, "archivedIds": [kept, orphaned], "cascadedRegistrationIds": [] })
    );

    let kept_archive = archive_id_for_registration(&client, &session, kept).await;
    let orphaned_archive = archive_id_for_registration(&client, &session, orphaned).await;

    let (status, _) = post_ids(&client, &session, "/api/1/Archive/users/Delete", json!([fixture.bob.id])).await;
    assert_eq!(status, Status::Ok);

    let (status, body) = post_ids(
        &client,
        &session,
        "/api/1/Archive/registrations/Restore",
        json!([kept_archive, orphaned_archive]),
    )
    .await;
    assert_eq!(status, Status::Ok);
    assert_eq!(
        body,
        json!({
            "requested": 2,
            "restored": 1,
            "restoredIds": [kept],
            "skippedCount": 1,
            "skipped": [{ "id": orphaned_archive, "reason": "user_missing" }]
        })
    );

    // Restoring the same archive id again finds nothing to restore.
    let (status, body) = post_ids(
        &client,
        &session,
        "/api/1/Archive/registrations/Restore",
        json!([kept_archive]),
    )
    .await;
    assert_eq!(status, Status::Ok);
    assert_eq!(body["restored"], 0);
    assert_eq!(body["skipped"][0]["reason"], "not_found");

    let conn = DbConn::get_one(client.rocket()).await.unwrap();
    let registration = conn.run(move |c| get_registration(c, kept)).await.unwrap();
    assert!(registration.is_some());
}

#[rocket::async_test]
async fn test_archive_and_restore_user() {
    let client = Client::tracked(test_rocket()).await.expect("valid rocket instance");
    time_test!("test_archive_and_restore_user");
    let fixture = seed(&client).await;
    let session = login_admin(&client).await;

    let (status, body) = post_ids(&client, &session, "/api/1/Archive/users/Delete", json!([fixture.alice.id])).await;
    assert_eq!(status, Status::Ok);
    assert_eq!(body["archivedIds"], json!([fixture.alice.id]));

    let archived: Value = client
        .get("/api/1/Archive/users")
        .cookie(session.clone())
        .dispatch()
        .await
        .into_json()
        .await
        .unwrap();
    let row = &archived.as_array().unwrap()[0];
    assert_eq!(row["email"], "alice@example.com");
    assert_eq!(row["deletion_source"], "user.bulk_delete");
    assert!(row.get("password_hash").is_none());
    let archive_id = row["archive_id"].as_i64().unwrap();

    let response = client
        .post("/api/1/login")
        .json(&json!({ "email": "alice@example.com", "password": FIXTURE_PASSWORD }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Unauthorized);

    let (status, body) = post_ids(&client, &session, "/api/1/Archive/users/Restore", json!([archive_id])).await;
    assert_eq!(status, Status::Ok);
    assert_eq!(body["restoredIds"], json!([fixture.alice.id]));

    let response = client
        .post("/api/1/login")
        .json(&json!({ "email": "alice@example.com", "password": FIXTURE_PASSWORD }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let body: Value = response.into_json().await.unwrap();
    assert_eq!(body["password_reset_required"], false);
}

#[rocket::async_test]
async fn test_event_lifecycle() {
    let client = Client::tracked(test_rocket()).await.expect("valid rocket instance");
    time_test!("test_event_lifecycle");
    let fixture = seed(&client).await;
    let session = login_admin(&client).await;

    let (status, body) = post_ids(
        &client,
        &session,
        "/api/1/Archive/events/Delete",
        json!([fixture.launch.id]),
    )
    .await;
    assert_eq!(status, Status::Ok);
    assert_eq!(body["archivedCount"], 1);

    let (status, body) = post_ids(
        &client,
        &session,
        "/api/1/Archive/events/Restore",
        json!([fixture.launch.id, fixture.meetup.id, 9999]),
    )
    .await;
    assert_eq!(status, Status::Ok);
    assert_eq!(body["restored"], 1);
    assert_eq!(body["restoredIds"], json!([fixture.launch.id]));
    assert_eq!(
        body["skipped"],
        json!([
            { "id": fixture.meetup.id, "reason": "already_exists" },
            { "id": 9999, "reason": "not_found" }
        ])
    );

    // Both events are live again, so purge leaves them alone.
    let (_, body) = post_ids(
        &client,
        &session,
        "/api/1/Archive/events/Purge",
        json!([fixture.launch.id, fixture.meetup.id]),
    )
    .await;
    assert_eq!(body["deletedCount"], 0);
}

#[rocket::async_test]
async fn test_purge_soft_deleted_event_archives_its_registrations() {
    let client = Client::tracked(test_rocket()).await.expect("valid rocket instance");
    time_test!("test_purge_soft_deleted_event_archives_its_registrations");
    let fixture = seed(&client).await;
    let session = login_admin(&client).await;

    post_ids(&client, &session, "/api/1/Archive/events/Delete", json!([fixture.meetup.id])).await;
    let (status, body) = post_ids(
        &client,
        &session,
        "/api/1/Archive/events/Purge",
        json!([fixture.meetup.id, fixture.launch.id]),
    )
    .await;
    assert_eq!(status, Status::Ok);
    assert_eq!(body, json!({ "deletedCount": 1 }));

    let archived: Value = client
        .get("/api/1/Archive/registrations")
        .cookie(session.clone())
        .dispatch()
        .await
        .into_json()
        .await
        .unwrap();
    let rows = archived.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    for row in rows {
        assert_eq!(row["event_title"], "Rust Meetup");
        assert_eq!(row["event_location"], "Room 101");
        assert_eq!(row["deletion_source"], "event.bulk_delete_permanent");
    }

    let archive_id = rows[0]["archive_id"].clone();
    let (_, body) = post_ids(&client, &session, "/api/1/Archive/registrations/Restore", json!([archive_id])).await;
    assert_eq!(body["skipped"][0]["reason"], "event_missing_or_archived");
}

#[rocket::async_test]
async fn test_each_bulk_call_writes_one_audit_entry() {
    let client = Client::tracked(test_rocket()).await.expect("valid rocket instance");
    time_test!("test_each_bulk_call_writes_one_audit_entry");
    let fixture = seed(&client).await;
    let session = login_admin(&client).await;

    post_ids(
        &client,
        &session,
        "/api/1/Archive/registrations/Delete",
        json!([fixture.registrations[0].id, fixture.registrations[1].id]),
    )
    .await;
    post_ids(&client, &session, "/api/1/Archive/events/Delete", json!([fixture.launch.id])).await;

    let conn = DbConn::get_one(client.rocket()).await.unwrap();
    let entries = conn.run(|c| list_audit_logs(c)).await.unwrap();
    let actions: Vec<&str> = entries.iter().map(|e| e.action.as_str()).collect();
    assert_eq!(actions, vec!["registration.bulk_delete", "event.bulk_delete"]);
    assert!(entries.iter().all(|e| e.entity_id.is_none() && e.actor_role == "admin"));
}

#[rocket::async_test]
async fn test_audit_failure_does_not_fail_request() {
    let client = Client::tracked(test_rocket()).await.expect("valid rocket instance");
    time_test!("test_audit_failure_does_not_fail_request");
    let fixture = seed(&client).await;
    let session = login_admin(&client).await;

    let conn = DbConn::get_one(client.rocket()).await.unwrap();
    conn.run(|c| diesel::sql_query("DROP TABLE audit_logs").execute(c))
        .await
        .unwrap();

    let (status, body) = post_ids(
        &client,
        &session,
        "/api/1/Archive/registrations/Delete",
        json!([fixture.registrations[3].id]),
    )
    .await;
    assert_eq!(status, Status::Ok);
    assert_eq!(body["archivedCount"], 1);
}

#[rocket::async_test]
async fn test_status_endpoint() {
    let client = Client::tracked(test_rocket()).await.expect("valid rocket instance");
    time_test!("test_status_endpoint");

    let response = client.get("/api/1/status").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    let body: Value = response.into_json().await.unwrap();
    assert_eq!(body["status"], "running");
    assert_eq!(body["database"], "ok");
}

#[rocket::async_test]
async fn test_storage_failure_returns_generic_500() {
    let client = Client::tracked(test_rocket()).await.expect("valid rocket instance");
    time_test!("test_storage_failure_returns_generic_500");
    let fixture = seed(&client).await;
    let session = login_admin(&client).await;
    let first = fixture.registrations[0].id;
    let second = fixture.registrations[1].id;

    post_ids(&client, &session, "/api/1/Archive/registrations/Delete", json!([first, second])).await;
    let first_archive = archive_id_for_registration(&client, &session, first).await;
    let second_archive = archive_id_for_registration(&client, &session, second).await;

    let conn = DbConn::get_one(client.rocket()).await.unwrap();
    conn.run(move |c| {
        diesel::sql_query(format!(
            "CREATE TRIGGER fail_second_restore BEFORE INSERT ON registrations WHEN NEW.id = {}
             BEGIN SELECT RAISE(ABORT, 'simulated storage failure'); END",
            second
        ))
        .execute(c)
    })
    .await
    .unwrap();

    let (status, body) = post_ids(
        &client,
        &session,
        "/api/1/Archive/registrations/Restore",
        json!([first_archive, second_archive]),
    )
    .await;
    assert_eq!(status, Status::InternalServerError);
    assert_eq!(body, json!({ "error": "Internal error while processing bulk request" }));

    let registration = conn.run(move |c| get_registration(c, first)).await.unwrap();
    assert!(registration.is_none());
}

#[rocket::async_test]
async fn test_pool_connections_enforce_foreign_keys() {
    let client = Client::tracked(test_rocket()).await.expect("valid rocket instance");
    time_test!("test_pool_connections_enforce_foreign_keys");

    let conn = DbConn::get_one(client.rocket()).await.unwrap();
    let result = conn
        .run(|c| {
            diesel::sql_query(
                "INSERT INTO registrations (event_id, user_id, status) VALUES (4242, 4242, 'registered')",
            )
            .execute(c)
        })
        .await;
    assert!(result.is_err());
}
