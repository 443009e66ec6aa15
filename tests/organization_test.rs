mod common;

use axum::http::Method;
use serde_json::json;

use common::{read_json, user_id_from_token, TestApp};

#[tokio::test]
async fn creator_becomes_owner_member() {
    let app = TestApp::new().await;
    let token = app.register("owner@example.com", "owner").await;
    let org_id = app.create_organization(&token, "Cedar Works").await;

    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/organizations/{}/members", org_id),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), 200);
    let members = read_json(response).await;
    let members = members.as_array().unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0]["role"], "owner");
}

#[tokio::test]
async fn list_shows_only_own_organizations() {
    let app = TestApp::new().await;
    let alice = app.register("alice@example.com", "alice").await;
    let bob = app.register("bob@example.com", "bobby").await;
    app.create_organization(&alice, "Alice Woodshop").await;
    app.create_organization(&bob, "Bob Lumber").await;

    let response = app
        .request(Method::GET, "/api/v1/organizations", None, Some(&alice))
        .await;
    assert_eq!(response.status(), 200);
    let body = read_json(response).await;
    let orgs = body.as_array().unwrap();
    assert_eq!(orgs.len(), 1);
    assert_eq!(orgs[0]["name"], "Alice Woodshop");
}

#[tokio::test]
async fn non_members_see_organizations_as_absent() {
    let app = TestApp::new().await;
    let alice = app.register("a2@example.com", "alice2").await;
    let mallory = app.register("m2@example.com", "mallory2").await;
    let org_id = app.create_organization(&alice, "Private Shop").await;

    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/organizations/{}", org_id),
            None,
            Some(&mallory),
        )
        .await;
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn plain_members_cannot_update_the_organization() {
    let app = TestApp::new().await;
    let owner = app.register("boss@example.com", "bossman").await;
    let worker = app.register("crew@example.com", "crewman").await;
    let org_id = app.create_organization(&owner, "Joinery Ltd").await;
    app.add_member(org_id, user_id_from_token(&worker), "member")
        .await;

    // Members can read the organization...
    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/organizations/{}", org_id),
            None,
            Some(&worker),
        )
        .await;
    assert_eq!(response.status(), 200);

    // ...but management is hidden from them.
    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/organizations/{}/update", org_id),
            Some(json!({ "name": "Hijacked" })),
            Some(&worker),
        )
        .await;
    assert_eq!(response.status(), 404);

    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/organizations/{}/update", org_id),
            Some(json!({ "name": "Joinery & Sons" })),
            Some(&owner),
        )
        .await;
    assert_eq!(response.status(), 200);
    let body = read_json(response).await;
    assert_eq!(body["name"], "Joinery & Sons");
}

#[tokio::test]
async fn subscription_creation_is_owner_only() {
    let app = TestApp::new().await;
    let owner = app.register("sub-owner@example.com", "subowner").await;
    let worker = app.register("sub-crew@example.com", "subcrew").await;
    let org_id = app.create_organization(&owner, "Planing Co").await;
    app.add_member(org_id, user_id_from_token(&worker), "member")
        .await;

    let payload = json!({ "organization_id": org_id, "plan_name": "pro" });

    let response = app
        .request(
            Method::POST,
            "/api/v1/organizations/subscriptions/create",
            Some(payload.clone()),
            Some(&worker),
        )
        .await;
    assert_eq!(response.status(), 403);

    let response = app
        .request(
            Method::POST,
            "/api/v1/organizations/subscriptions/create",
            Some(payload),
            Some(&owner),
        )
        .await;
    assert_eq!(response.status(), 201);
    let body = read_json(response).await;
    assert_eq!(body["plan_name"], "pro");

    // The subscription shows up in the caller's subscription list.
    let response = app
        .request(
            Method::GET,
            "/api/v1/organizations/subscriptions",
            None,
            Some(&owner),
        )
        .await;
    assert_eq!(response.status(), 200);
    let subs = read_json(response).await;
    assert_eq!(subs.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn organization_routes_require_a_token() {
    let app = TestApp::new().await;
    let response = app
        .request(Method::GET, "/api/v1/organizations", None, None)
        .await;
    assert_eq!(response.status(), 401);
}
