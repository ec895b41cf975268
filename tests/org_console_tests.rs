//! Organisation-admin console tests: invites, bulk CSV import and join links

use axum::http::StatusCode;
use serde_json::json;

mod common;
use common::{
    create_test_group, create_test_org, create_test_state, create_test_user, get, login,
    make_org_admin, post,
};

use curio::models::UserRole;
use curio::state::AppState;

/// Organisation "Acme" with group "Parents", administered by ada@example.com
async fn console_state() -> (AppState, String, i64) {
    let (state, _) = create_test_state().await;
    let org = create_test_org(&state.db, "Acme").await;
    let group = create_test_group(&state.db, org.id, "Parents").await;
    let ada = create_test_user(&state.db, "ada@example.com", UserRole::OrganisationAdmin).await;
    make_org_admin(&state.db, org.id, ada.id).await;

    let cookie = login(&state, "ada@example.com").await;
    (state, cookie, group.id)
}

#[tokio::test]
async fn test_group_console_lists_invites_and_join_link() {
    let (state, cookie, group_id) = console_state().await;

    let first = post(
        &state,
        &format!("/org/groups/{group_id}/invites"),
        Some(&cookie),
        json!({}),
    )
    .await;
    assert_eq!(first.status, StatusCode::CREATED);
    assert_eq!(first.body["token"].as_str().unwrap().len(), 48);
    assert!(first.body["email"].is_null());

    let second = post(
        &state,
        &format!("/org/groups/{group_id}/invites"),
        Some(&cookie),
        json!({ "email": " Bob@Example.com " }),
    )
    .await;
    assert_eq!(second.body["email"], "bob@example.com");
    assert_eq!(second.body["status"], "invited");

    let console = get(&state, &format!("/org/groups/{group_id}"), Some(&cookie)).await;
    assert_eq!(console.status, StatusCode::OK);
    assert_eq!(console.body["group"]["name"], "Parents");
    assert_eq!(console.body["invites"].as_array().unwrap().len(), 2);
    // Newest first
    assert_eq!(console.body["invites"][0]["email"], "bob@example.com");
    assert!(console.body["active_join_link"].is_null());
}

#[tokio::test]
async fn test_invite_with_invalid_email_is_rejected() {
    let (state, cookie, group_id) = console_state().await;

    let response = post(
        &state,
        &format!("/org/groups/{group_id}/invites"),
        Some(&cookie),
        json!({ "email": "not-an-email" }),
    )
    .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_admin_of_other_organisation_is_forbidden() {
    let (state, _, group_id) = console_state().await;
    let other = create_test_org(&state.db, "Globex").await;
    let bob = create_test_user(&state.db, "bob@example.com", UserRole::OrganisationAdmin).await;
    make_org_admin(&state.db, other.id, bob.id).await;
    let cookie = login(&state, "bob@example.com").await;

    let console = get(&state, &format!("/org/groups/{group_id}"), Some(&cookie)).await;
    assert_eq!(console.status, StatusCode::FORBIDDEN);

    let invite = post(
        &state,
        &format!("/org/groups/{group_id}/invites"),
        Some(&cookie),
        json!({}),
    )
    .await;
    assert_eq!(invite.status, StatusCode::FORBIDDEN);

    let listed = get(&state, "/org", Some(&cookie)).await;
    assert_eq!(listed.body.as_array().unwrap().len(), 1);
    assert_eq!(listed.body[0]["organisation"]["name"], "Globex");
}

#[tokio::test]
async fn test_super_admin_manages_any_group() {
    let (state, _, group_id) = console_state().await;
    create_test_user(&state.db, "root@example.com", UserRole::SuperAdmin).await;
    let cookie = login(&state, "root@example.com").await;

    let console = get(&state, &format!("/org/groups/{group_id}"), Some(&cookie)).await;
    assert_eq!(console.status, StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_group_is_not_found() {
    let (state, cookie, _) = console_state().await;

    let console = get(&state, "/org/groups/999", Some(&cookie)).await;
    assert_eq!(console.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_bulk_invite_import() {
    let (state, cookie, group_id) = console_state().await;

    let csv = "email,name\n\
               ann@example.com,Ann\n\
               not-an-email,Bob\n\
               ANN@example.com,Cat\n\
               ,Nobody\n\
               dan@example.com,Dan\n";

    let response = post(
        &state,
        &format!("/org/groups/{group_id}/invites/bulk"),
        Some(&cookie),
        json!({ "csv_content": csv }),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["created"], 2);
    assert_eq!(response.body["skipped"], 3);
    assert_eq!(response.body["capped"], false);

    let errors: Vec<&str> = response.body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e.as_str().unwrap())
        .collect();
    assert_eq!(
        errors,
        vec![
            "Row 3: Invalid email \"not-an-email\"",
            "Row 4: Duplicate email \"ann@example.com\"",
        ]
    );

    let console = get(&state, &format!("/org/groups/{group_id}"), Some(&cookie)).await;
    assert_eq!(console.body["invites"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_bulk_invite_with_blank_content() {
    let (state, cookie, group_id) = console_state().await;

    let response = post(
        &state,
        &format!("/org/groups/{group_id}/invites/bulk"),
        Some(&cookie),
        json!({ "csv_content": "  \n" }),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["created"], 0);
    assert_eq!(response.body["errors"], json!(["Missing required fields"]));
}

#[tokio::test]
async fn test_join_link_lifecycle_in_console() {
    let (state, cookie, group_id) = console_state().await;

    let first = post(
        &state,
        &format!("/org/groups/{group_id}/join-links"),
        Some(&cookie),
        json!({ "max_uses": 10, "expires_in_days": 7 }),
    )
    .await;
    assert_eq!(first.status, StatusCode::CREATED);
    assert_eq!(first.body["token"].as_str().unwrap().len(), 32);
    assert_eq!(first.body["max_uses"], 10);
    assert!(first.body["expires_at"].is_string());

    let second = post(
        &state,
        &format!("/org/groups/{group_id}/join-links"),
        Some(&cookie),
        json!({}),
    )
    .await;
    let second_id = second.body["id"].as_i64().unwrap();

    // Only the newest link stays active
    let console = get(&state, &format!("/org/groups/{group_id}"), Some(&cookie)).await;
    assert_eq!(console.body["active_join_link"]["id"], second_id);
    let first_token = first.body["token"].as_str().unwrap();
    assert_eq!(
        get(&state, &format!("/join/{first_token}"), None).await.status,
        StatusCode::GONE
    );

    let deactivated = post(
        &state,
        &format!("/org/groups/{group_id}/join-links/{second_id}/deactivate"),
        Some(&cookie),
        json!({}),
    )
    .await;
    assert_eq!(deactivated.status, StatusCode::OK);
    assert_eq!(deactivated.body["is_active"], false);

    let console = get(&state, &format!("/org/groups/{group_id}"), Some(&cookie)).await;
    assert!(console.body["active_join_link"].is_null());
}

#[tokio::test]
async fn test_join_link_rejects_bad_options() {
    let (state, cookie, group_id) = console_state().await;

    for body in [
        json!({ "max_uses": 0 }),
        json!({ "expires_in_days": 0 }),
        json!({ "expires_in_days": 1_000_000_000i64 }),
    ] {
        let response = post(
            &state,
            &format!("/org/groups/{group_id}/join-links"),
            Some(&cookie),
            body,
        )
        .await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
    }
}
