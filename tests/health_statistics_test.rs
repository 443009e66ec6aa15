mod common;

use axum::http::Method;
use serde_json::json;

use common::{read_json, TestApp};

#[tokio::test]
async fn health_is_public_and_reports_global_counts() {
    let app = TestApp::new().await;
    let token = app.register("count@example.com", "counter").await;
    app.create_organization(&token, "Counted Shop").await;

    let response = app.request(Method::GET, "/health", None, None).await;
    assert_eq!(response.status(), 200);
    let body = read_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["statistics"]["total_users"], 1);
    assert_eq!(body["statistics"]["total_organizations"], 1);
    assert_eq!(body["statistics"]["total_subscriptions"], 0);
    assert!(body["endpoints"]["auth"]["register"].is_string());
}

#[tokio::test]
async fn api_status_is_public() {
    let app = TestApp::new().await;
    let response = app.request(Method::GET, "/api/v1/status", None, None).await;
    assert_eq!(response.status(), 200);
    let body = read_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["service"], "timber-api");
}

#[tokio::test]
async fn openapi_schema_is_served() {
    let app = TestApp::new().await;
    let response = app
        .request(Method::GET, "/api-docs/openapi.json", None, None)
        .await;
    assert_eq!(response.status(), 200);
    let body = read_json(response).await;
    assert!(body["paths"]
        .as_object()
        .unwrap()
        .keys()
        .any(|p| p.contains("estimate-headers")));
}

#[tokio::test]
async fn statistics_requires_a_token() {
    let app = TestApp::new().await;
    let response = app
        .request(Method::GET, "/api/v1/statistics", None, None)
        .await;
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn statistics_reports_caller_and_global_views() {
    let app = TestApp::new().await;
    let alice = app.register("stats-a@example.com", "statsalice").await;
    let bob = app.register("stats-b@example.com", "statsbob").await;

    let alice_org = app.create_organization(&alice, "Alice Stats Shop").await;
    app.create_organization(&bob, "Bob Stats Shop").await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/organizations/subscriptions/create",
            Some(json!({ "organization_id": alice_org, "plan_name": "starter" })),
            Some(&alice),
        )
        .await;
    assert_eq!(response.status(), 201);

    let response = app
        .request(Method::GET, "/api/v1/statistics", None, Some(&alice))
        .await;
    assert_eq!(response.status(), 200);
    let body = read_json(response).await;

    assert_eq!(body["user_info"]["email"], "stats-a@example.com");
    assert_eq!(body["user_statistics"]["organizations_count"], 1);
    assert_eq!(body["user_statistics"]["subscriptions_count"], 1);
    assert_eq!(body["global_statistics"]["total_users"], 2);
    assert_eq!(body["global_statistics"]["total_organizations"], 2);
    assert_eq!(body["global_statistics"]["active_subscriptions"], 1);
    assert_eq!(body["global_statistics"]["expired_subscriptions"], 0);

    // Bob's view counts only his own memberships.
    let response = app
        .request(Method::GET, "/api/v1/statistics", None, Some(&bob))
        .await;
    let body = read_json(response).await;
    assert_eq!(body["user_statistics"]["subscriptions_count"], 0);
}
