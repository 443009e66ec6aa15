mod common;

use axum::http::Method;
use serde_json::json;
use uuid::Uuid;

use common::{read_json, TestApp};

/// Registers a user, creates an organization and returns (token, org_id).
async fn setup(app: &TestApp, email: &str, username: &str) -> (String, Uuid) {
    let token = app.register(email, username).await;
    let org_id = app.create_organization(&token, "Catalog Shop").await;
    (token, org_id)
}

#[tokio::test]
async fn customer_crud_round_trip() {
    let app = TestApp::new().await;
    let (token, org_id) = setup(&app, "cust@example.com", "custkeeper").await;
    let base = format!("/api/v1/organizations/{}/customers", org_id);

    let response = app
        .request(
            Method::POST,
            &base,
            Some(json!({ "name": "Nils Carpenter", "email": "nils@client.example" })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), 201);
    let created = read_json(response).await;
    let customer_id = created["id"].as_str().unwrap().to_string();

    let response = app
        .request(
            Method::GET,
            &format!("{}/{}", base, customer_id),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), 200);

    let response = app
        .request(
            Method::PATCH,
            &format!("{}/{}", base, customer_id),
            Some(json!({ "phone_number": "+4670000000" })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), 200);
    let updated = read_json(response).await;
    assert_eq!(updated["phone_number"], "+4670000000");
    assert_eq!(updated["name"], "Nils Carpenter");

    let response = app
        .request(
            Method::DELETE,
            &format!("{}/{}", base, customer_id),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), 204);

    let response = app
        .request(
            Method::GET,
            &format!("{}/{}", base, customer_id),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn customer_list_is_paginated() {
    let app = TestApp::new().await;
    let (token, org_id) = setup(&app, "page@example.com", "paginator").await;
    let base = format!("/api/v1/organizations/{}/customers", org_id);

    for i in 0..5 {
        let response = app
            .request(
                Method::POST,
                &base,
                Some(json!({ "name": format!("Customer {}", i) })),
                Some(&token),
            )
            .await;
        assert_eq!(response.status(), 201);
    }

    let response = app
        .request(
            Method::GET,
            &format!("{}?page=2&limit=2", base),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), 200);
    let body = read_json(response).await;
    assert_eq!(body["total"], 5);
    assert_eq!(body["page"], 2);
    assert_eq!(body["limit"], 2);
    assert_eq!(body["total_pages"], 3);
    assert_eq!(body["items"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn project_rejects_customer_from_another_organization() {
    let app = TestApp::new().await;
    let (token, org_id) = setup(&app, "proj@example.com", "projlead").await;
    let other_org = app.create_organization(&token, "Other Shop").await;

    // Customer lives in the other organization.
    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/organizations/{}/customers", other_org),
            Some(json!({ "name": "Elsewhere" })),
            Some(&token),
        )
        .await;
    let foreign_customer = read_json(response).await["id"].as_str().unwrap().to_string();

    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/organizations/{}/projects", org_id),
            Some(json!({ "name": "Kitchen Remodel", "customer_id": foreign_customer })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), 400);
    let body = read_json(response).await;
    assert!(body["message"].as_str().unwrap().contains("customer_id"));
}

#[tokio::test]
async fn project_status_must_be_known() {
    let app = TestApp::new().await;
    let (token, org_id) = setup(&app, "status@example.com", "statuser").await;
    let base = format!("/api/v1/organizations/{}/projects", org_id);

    let response = app
        .request(
            Method::POST,
            &base,
            Some(json!({ "name": "Bad Status", "status": "cancelled" })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), 400);

    let response = app
        .request(
            Method::POST,
            &base,
            Some(json!({ "name": "Defaulted" })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), 201);
    let body = read_json(response).await;
    assert_eq!(body["status"], "active");
}

#[tokio::test]
async fn product_delete_is_refused_while_referenced() {
    let app = TestApp::new().await;
    let (token, org_id) = setup(&app, "prod@example.com", "produser").await;

    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/organizations/{}/projects", org_id),
            Some(json!({ "name": "Wardrobe" })),
            Some(&token),
        )
        .await;
    let project_id = read_json(response).await["id"].as_str().unwrap().to_string();

    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/organizations/{}/products", org_id),
            Some(json!({ "name": "Teak Panel" })),
            Some(&token),
        )
        .await;
    let product_id = read_json(response).await["id"].as_str().unwrap().to_string();

    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/organizations/{}/estimate-headers", org_id),
            Some(json!({
                "project_id": project_id,
                "details": [{ "product_id": product_id, "component_cft": "1.5" }],
            })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), 201);

    let product_uri = format!(
        "/api/v1/organizations/{}/products/{}",
        org_id, product_id
    );
    let response = app
        .request(Method::DELETE, &product_uri, None, Some(&token))
        .await;
    assert_eq!(response.status(), 400);

    // Deleting the estimate releases the reference.
    let estimates = app
        .request(
            Method::GET,
            &format!("/api/v1/organizations/{}/estimate-headers", org_id),
            None,
            Some(&token),
        )
        .await;
    let estimates = read_json(estimates).await;
    let header_id = estimates["items"][0]["id"].as_str().unwrap().to_string();
    let response = app
        .request(
            Method::DELETE,
            &format!(
                "/api/v1/organizations/{}/estimate-headers/{}",
                org_id, header_id
            ),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), 204);

    let response = app
        .request(Method::DELETE, &product_uri, None, Some(&token))
        .await;
    assert_eq!(response.status(), 204);
}

#[tokio::test]
async fn catalogs_are_isolated_between_organizations() {
    let app = TestApp::new().await;
    let (alice, alice_org) = setup(&app, "iso-a@example.com", "isoalice").await;
    let bob = app.register("iso-b@example.com", "isobob").await;
    let bob_org = app.create_organization(&bob, "Bob Shop").await;

    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/organizations/{}/customers", alice_org),
            Some(json!({ "name": "Alice Client" })),
            Some(&alice),
        )
        .await;
    let customer_id = read_json(response).await["id"].as_str().unwrap().to_string();

    // Bob cannot reach Alice's org at all.
    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/organizations/{}/customers", alice_org),
            None,
            Some(&bob),
        )
        .await;
    assert_eq!(response.status(), 404);

    // And the customer id resolves to nothing inside Bob's own org.
    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/organizations/{}/customers/{}", bob_org, customer_id),
            None,
            Some(&bob),
        )
        .await;
    assert_eq!(response.status(), 404);
}
