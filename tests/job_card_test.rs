mod common;

use axum::http::Method;
use serde_json::json;
use uuid::Uuid;

use common::{read_json, TestApp};

struct Fixture {
    token: String,
    org_id: Uuid,
    header_id: String,
    product_a: String,
    product_b: String,
}

/// One estimate with two details for product A ("Seat", "Back") and one for
/// product B ("Legs").
async fn fixture(app: &TestApp, email: &str, username: &str) -> Fixture {
    let token = app.register(email, username).await;
    let org_id = app.create_organization(&token, "Job Card Shop").await;

    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/organizations/{}/projects", org_id),
            Some(json!({ "name": "Chair Order" })),
            Some(&token),
        )
        .await;
    let project_id = read_json(response).await["id"].as_str().unwrap().to_string();

    let mut product_ids = Vec::new();
    for name in ["Armchair", "Stool"] {
        let response = app
            .request(
                Method::POST,
                &format!("/api/v1/organizations/{}/products", org_id),
                Some(json!({ "name": name })),
                Some(&token),
            )
            .await;
        product_ids.push(read_json(response).await["id"].as_str().unwrap().to_string());
    }
    let product_b = product_ids.pop().unwrap();
    let product_a = product_ids.pop().unwrap();

    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/organizations/{}/estimate-headers", org_id),
            Some(json!({
                "project_id": project_id,
                "details": [
                    { "product_id": product_a, "component_name": "Seat", "component_cft": "1.2" },
                    { "product_id": product_b, "component_name": "Legs" },
                    { "product_id": product_a, "component_name": "Back" },
                ],
            })),
            Some(&token),
        )
        .await;
    let header_id = read_json(response).await["id"].as_str().unwrap().to_string();

    Fixture {
        token,
        org_id,
        header_id,
        product_a,
        product_b,
    }
}

fn cards_uri(org_id: Uuid) -> String {
    format!("/api/v1/organizations/{}/job-cards", org_id)
}

#[tokio::test]
async fn measurements_follow_the_header_product_pair() {
    let app = TestApp::new().await;
    let fx = fixture(&app, "jc@example.com", "jcmaker").await;

    let response = app
        .request(
            Method::POST,
            &cards_uri(fx.org_id),
            Some(json!({
                "estimate_header_id": fx.header_id,
                "product_id": fx.product_a,
                "description": "Armchair components",
            })),
            Some(&fx.token),
        )
        .await;
    assert_eq!(response.status(), 201);
    let card = read_json(response).await;
    assert_eq!(card["status"], "pending");

    let names: Vec<&str> = card["measurements"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["component_name"].as_str().unwrap())
        .collect();
    // Only product A's details, in their creation order.
    assert_eq!(names, vec!["Seat", "Back"]);
    assert_eq!(card["measurements"][0]["component_cft"], "1.2");
}

#[tokio::test]
async fn card_without_product_has_no_measurements() {
    let app = TestApp::new().await;
    let fx = fixture(&app, "bare@example.com", "barecard").await;

    let response = app
        .request(
            Method::POST,
            &cards_uri(fx.org_id),
            Some(json!({ "estimate_header_id": fx.header_id })),
            Some(&fx.token),
        )
        .await;
    assert_eq!(response.status(), 201);
    let card = read_json(response).await;
    assert_eq!(card["measurements"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn measurements_reflect_later_estimate_edits() {
    let app = TestApp::new().await;
    let fx = fixture(&app, "live@example.com", "livecard").await;

    let response = app
        .request(
            Method::POST,
            &cards_uri(fx.org_id),
            Some(json!({
                "estimate_header_id": fx.header_id,
                "product_id": fx.product_b,
            })),
            Some(&fx.token),
        )
        .await;
    let card_id = read_json(response).await["id"].as_str().unwrap().to_string();

    // Replace the estimate's details: product B now has two components.
    let response = app
        .request(
            Method::PUT,
            &format!(
                "/api/v1/organizations/{}/estimate-headers/{}",
                fx.org_id, fx.header_id
            ),
            Some(json!({
                "details": [
                    { "product_id": fx.product_b, "component_name": "Leg frame" },
                    { "product_id": fx.product_b, "component_name": "Footrest" },
                ],
            })),
            Some(&fx.token),
        )
        .await;
    assert_eq!(response.status(), 200);

    let response = app
        .request(
            Method::GET,
            &format!("{}/{}", cards_uri(fx.org_id), card_id),
            None,
            Some(&fx.token),
        )
        .await;
    let card = read_json(response).await;
    let names: Vec<&str> = card["measurements"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["component_name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Leg frame", "Footrest"]);
}

#[tokio::test]
async fn update_can_clear_a_reference_with_explicit_null() {
    let app = TestApp::new().await;
    let fx = fixture(&app, "null@example.com", "nuller").await;

    let response = app
        .request(
            Method::POST,
            &cards_uri(fx.org_id),
            Some(json!({
                "estimate_header_id": fx.header_id,
                "product_id": fx.product_a,
            })),
            Some(&fx.token),
        )
        .await;
    let card_id = read_json(response).await["id"].as_str().unwrap().to_string();

    // Status-only update leaves both references in place.
    let response = app
        .request(
            Method::PATCH,
            &format!("{}/{}", cards_uri(fx.org_id), card_id),
            Some(json!({ "status": "in_progress" })),
            Some(&fx.token),
        )
        .await;
    let card = read_json(response).await;
    assert_eq!(card["status"], "in_progress");
    assert!(card["product_id"].is_string());
    assert!(!card["measurements"].as_array().unwrap().is_empty());

    // Explicit null clears the product, and the measurements with it.
    let response = app
        .request(
            Method::PATCH,
            &format!("{}/{}", cards_uri(fx.org_id), card_id),
            Some(json!({ "product_id": null })),
            Some(&fx.token),
        )
        .await;
    let card = read_json(response).await;
    assert!(card["product_id"].is_null());
    assert_eq!(card["measurements"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn references_must_resolve_within_the_organization() {
    let app = TestApp::new().await;
    let fx = fixture(&app, "ref@example.com", "refcheck").await;

    let response = app
        .request(
            Method::POST,
            &cards_uri(fx.org_id),
            Some(json!({ "estimate_header_id": Uuid::new_v4() })),
            Some(&fx.token),
        )
        .await;
    assert_eq!(response.status(), 400);
    let body = read_json(response).await;
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("estimate_header_id"));

    let response = app
        .request(
            Method::POST,
            &cards_uri(fx.org_id),
            Some(json!({ "product_id": Uuid::new_v4() })),
            Some(&fx.token),
        )
        .await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn unknown_status_is_rejected() {
    let app = TestApp::new().await;
    let fx = fixture(&app, "jcstat@example.com", "jcstatus").await;

    let response = app
        .request(
            Method::POST,
            &cards_uri(fx.org_id),
            Some(json!({ "status": "done" })),
            Some(&fx.token),
        )
        .await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn delete_leaves_the_estimate_untouched() {
    let app = TestApp::new().await;
    let fx = fixture(&app, "jcdel@example.com", "jcdelete").await;

    let response = app
        .request(
            Method::POST,
            &cards_uri(fx.org_id),
            Some(json!({
                "estimate_header_id": fx.header_id,
                "product_id": fx.product_a,
            })),
            Some(&fx.token),
        )
        .await;
    let card_id = read_json(response).await["id"].as_str().unwrap().to_string();

    let response = app
        .request(
            Method::DELETE,
            &format!("{}/{}", cards_uri(fx.org_id), card_id),
            None,
            Some(&fx.token),
        )
        .await;
    assert_eq!(response.status(), 204);

    let response = app
        .request(
            Method::GET,
            &format!(
                "/api/v1/organizations/{}/estimate-headers/{}",
                fx.org_id, fx.header_id
            ),
            None,
            Some(&fx.token),
        )
        .await;
    assert_eq!(response.status(), 200);
    let estimate = read_json(response).await;
    assert_eq!(estimate["details"].as_array().unwrap().len(), 3);
}
