//! Super-admin organisation management tests

use axum::http::StatusCode;
use serde_json::json;

mod common;
use common::{create_test_state, create_test_user, get, login, post, send};

use curio::models::UserRole;

async fn super_admin_state() -> (curio::state::AppState, String) {
    let (state, _) = create_test_state().await;
    create_test_user(&state.db, "root@example.com", UserRole::SuperAdmin).await;
    let cookie = login(&state, "root@example.com").await;
    (state, cookie)
}

#[tokio::test]
async fn test_create_and_list_organisations() {
    let (state, cookie) = super_admin_state().await;

    let created = post(
        &state,
        "/admin/organisations",
        Some(&cookie),
        json!({ "name": "  Acme Trust  ", "description": "" }),
    )
    .await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.body["name"], "Acme Trust");
    assert_eq!(created.body["slug"], "acme-trust");
    assert!(created.body["description"].is_null());

    let listed = get(&state, "/admin/organisations", Some(&cookie)).await;
    assert_eq!(listed.status, StatusCode::OK);
    assert_eq!(listed.body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_create_organisation_requires_name() {
    let (state, cookie) = super_admin_state().await;

    let response = post(
        &state,
        "/admin/organisations",
        Some(&cookie),
        json!({ "name": "   " }),
    )
    .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_organisation_detail_with_groups_and_admins() {
    let (state, cookie) = super_admin_state().await;
    create_test_user(&state.db, "lead@example.com", UserRole::User).await;

    let org = post(
        &state,
        "/admin/organisations",
        Some(&cookie),
        json!({ "name": "Acme" }),
    )
    .await;
    let org_id = org.body["id"].as_i64().unwrap();

    let group = post(
        &state,
        &format!("/admin/organisations/{org_id}/groups"),
        Some(&cookie),
        json!({ "name": "Parents" }),
    )
    .await;
    assert_eq!(group.status, StatusCode::CREATED);
    assert_eq!(group.body["organisation_id"], org_id);

    let assigned = post(
        &state,
        &format!("/admin/organisations/{org_id}/admins"),
        Some(&cookie),
        json!({ "email": "LEAD@example.com" }),
    )
    .await;
    assert_eq!(assigned.status, StatusCode::OK);
    assert_eq!(assigned.body["admins"][0]["email"], "lead@example.com");

    let detail = get(&state, &format!("/admin/organisations/{org_id}"), Some(&cookie)).await;
    assert_eq!(detail.body["organisation"]["name"], "Acme");
    assert_eq!(detail.body["groups"].as_array().unwrap().len(), 1);
    assert_eq!(detail.body["admins"].as_array().unwrap().len(), 1);

    // The promoted user can now reach the organisation console
    let lead_cookie = login(&state, "lead@example.com").await;
    let console = get(&state, "/org", Some(&lead_cookie)).await;
    assert_eq!(console.status, StatusCode::OK);
    assert_eq!(console.body[0]["organisation"]["id"], org_id);
}

#[tokio::test]
async fn test_assign_unknown_user_is_not_found() {
    let (state, cookie) = super_admin_state().await;
    let org = post(
        &state,
        "/admin/organisations",
        Some(&cookie),
        json!({ "name": "Acme" }),
    )
    .await;
    let org_id = org.body["id"].as_i64().unwrap();

    let response = post(
        &state,
        &format!("/admin/organisations/{org_id}/admins"),
        Some(&cookie),
        json!({ "email": "ghost@example.com" }),
    )
    .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_remove_admin() {
    let (state, cookie) = super_admin_state().await;
    let lead = create_test_user(&state.db, "lead@example.com", UserRole::User).await;

    let org = post(
        &state,
        "/admin/organisations",
        Some(&cookie),
        json!({ "name": "Acme" }),
    )
    .await;
    let org_id = org.body["id"].as_i64().unwrap();
    post(
        &state,
        &format!("/admin/organisations/{org_id}/admins"),
        Some(&cookie),
        json!({ "email": "lead@example.com" }),
    )
    .await;

    let uri = format!("/admin/organisations/{org_id}/admins/{}", lead.id);
    let removed = send(&state, "DELETE", &uri, Some(&cookie), None).await;
    assert_eq!(removed.status, StatusCode::NO_CONTENT);

    let again = send(&state, "DELETE", &uri, Some(&cookie), None).await;
    assert_eq!(again.status, StatusCode::NOT_FOUND);

    let detail = get(&state, &format!("/admin/organisations/{org_id}"), Some(&cookie)).await;
    assert!(detail.body["admins"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_organisation_is_not_found() {
    let (state, cookie) = super_admin_state().await;

    let response = get(&state, "/admin/organisations/999", Some(&cookie)).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
