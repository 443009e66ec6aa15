use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request},
    Router,
};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use sea_orm::{ActiveModelTrait, Set};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;

use timber_api::{
    app_router,
    config::AppConfig,
    db,
    entities::organization_member,
    mailer::Mailer,
    AppState,
};

const TEST_JWT_SECRET: &str =
    "timber-integration-suite-jwt-signing-secret-R7kQ2vX9mZ4pL8-woodgrain-edition";

/// Test harness: the full router backed by a fresh sqlite database in a
/// temporary directory. Everything goes through real HTTP requests except
/// where a test needs to reach behind the API (e.g. to read a mailed token).
pub struct TestApp {
    router: Router,
    pub state: AppState,
    _db_dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        let db_dir = tempfile::tempdir().expect("create temp dir for test database");
        let db_path = db_dir.path().join("timber_test.db");

        let mut cfg = AppConfig::new(
            format!("sqlite://{}?mode=rwc", db_path.display()),
            TEST_JWT_SECRET.to_string(),
            3600,
            "127.0.0.1".to_string(),
            0,
            "test".to_string(),
        );
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("create test database");
        db::run_migrations(&pool)
            .await
            .expect("run migrations in tests");

        let mailer = Mailer::new(&cfg);
        let state = AppState::new(Arc::new(pool), cfg, mailer);
        let router = app_router(state.clone());

        Self {
            router,
            state,
            _db_dir: db_dir,
        }
    }

    /// Send a request against the router with an optional bearer token.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(tok) = token {
            builder = builder.header("authorization", format!("Bearer {}", tok));
        }

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Register an account through the API and return its bearer token.
    pub async fn register(&self, email: &str, username: &str) -> String {
        let response = self
            .request(
                Method::POST,
                "/api/v1/auth/register",
                Some(json!({
                    "email": email,
                    "username": username,
                    "password": "sturdy-workbench-1",
                    "password_confirm": "sturdy-workbench-1",
                })),
                None,
            )
            .await;
        assert_eq!(response.status(), 201, "registration should succeed");

        let body = read_json(response).await;
        body["token"]["access_token"]
            .as_str()
            .expect("access token in registration response")
            .to_string()
    }

    /// Create an organization through the API and return its id.
    pub async fn create_organization(&self, token: &str, name: &str) -> Uuid {
        let response = self
            .request(
                Method::POST,
                "/api/v1/organizations/create",
                Some(json!({ "name": name })),
                Some(token),
            )
            .await;
        assert_eq!(response.status(), 201, "organization creation should succeed");

        let body = read_json(response).await;
        body["id"]
            .as_str()
            .and_then(|id| Uuid::parse_str(id).ok())
            .expect("organization id in response")
    }

    /// Attach an existing user to an organization with a given role,
    /// directly in the store. There is no invite endpoint, so role-gating
    /// tests seed memberships this way.
    pub async fn add_member(&self, organization_id: Uuid, user_id: Uuid, role: &str) {
        organization_member::ActiveModel {
            id: Set(Uuid::new_v4()),
            organization_id: Set(organization_id),
            user_id: Set(user_id),
            role: Set(role.to_string()),
            is_active: Set(true),
            ..Default::default()
        }
        .insert(&*self.state.db)
        .await
        .expect("insert membership row");
    }
}

/// Decode a response body as JSON.
pub async fn read_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read response body");
    serde_json::from_slice(&bytes).expect("response body should be JSON")
}

/// Extract the user id from a token's claims without verifying (test-only).
pub fn user_id_from_token(token: &str) -> Uuid {
    let payload = token.split('.').nth(1).expect("jwt payload segment");
    let decoded = URL_SAFE_NO_PAD
        .decode(payload)
        .expect("decode jwt payload segment");
    let claims: Value = serde_json::from_slice(&decoded).expect("claims json");
    Uuid::parse_str(claims["sub"].as_str().expect("sub claim")).expect("sub is a uuid")
}
