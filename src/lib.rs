//! Timber API Library
//!
//! Backend for a woodworking shop: user accounts, organizations, reference
//! catalogs, cost estimates with ordered line items, and job cards.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod mailer;
pub mod migrator;
pub mod openapi;
pub mod services;
pub mod tracing;

use axum::{extract::State, middleware, response::Json, routing::get, Extension, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::db::DbPool;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DbPool>,
    pub config: config::AppConfig,
    pub auth: Arc<auth::AuthService>,
    pub services: handlers::AppServices,
}

impl AppState {
    pub fn new(db: Arc<DbPool>, config: config::AppConfig, mailer: mailer::Mailer) -> Self {
        let auth = Arc::new(auth::AuthService::new(auth::AuthConfig::from(&config)));
        let services = handlers::AppServices::new(db.clone(), mailer);
        Self {
            db,
            config,
            auth,
            services,
        }
    }
}

// Common query parameters for list endpoints
#[derive(Debug, Deserialize, ToSchema)]
pub struct ListQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
    pub search: Option<String>,
}

fn default_page() -> u64 {
    1
}
fn default_limit() -> u64 {
    20
}

// Common response wrappers
#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub errors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
}

#[derive(Serialize, ToSchema)]
pub struct ResponseMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub timestamp: String,
}

impl ResponseMeta {
    fn capture() -> Self {
        Self {
            request_id: crate::tracing::current_request_id().map(|rid| rid.as_str().to_string()),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            errors: None,
            meta: Some(ResponseMeta::capture()),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message),
            errors: None,
            meta: Some(ResponseMeta::capture()),
        }
    }

    pub fn validation_errors(errors: Vec<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some("Validation failed".to_string()),
            errors: Some(errors),
            meta: Some(ResponseMeta::capture()),
        }
    }
}

#[cfg(test)]
mod response_tests {
    use super::*;
    use chrono::DateTime;

    #[tokio::test]
    async fn success_response_includes_request_metadata() {
        let response =
            crate::tracing::scope_request_id(crate::tracing::RequestId::new("meta-123"), async {
                ApiResponse::success("ok")
            })
            .await;

        let meta = response.meta.expect("metadata expected");
        assert_eq!(meta.request_id.as_deref(), Some("meta-123"));
        DateTime::parse_from_rfc3339(&meta.timestamp).expect("timestamp should parse");
    }

    #[tokio::test]
    async fn error_response_includes_request_metadata() {
        let response =
            crate::tracing::scope_request_id(crate::tracing::RequestId::new("meta-err"), async {
                ApiResponse::<()>::error("oops".into())
            })
            .await;

        let meta = response.meta.expect("metadata expected");
        assert_eq!(meta.request_id.as_deref(), Some("meta-err"));
        assert!(!meta.timestamp.is_empty());
    }

    #[tokio::test]
    async fn validation_errors_response_includes_metadata() {
        let response = crate::tracing::scope_request_id(
            crate::tracing::RequestId::new("meta-validation"),
            async { ApiResponse::<()>::validation_errors(vec!["missing".into()]) },
        )
        .await;

        let meta = response.meta.expect("metadata expected");
        assert_eq!(meta.request_id.as_deref(), Some("meta-validation"));
        DateTime::parse_from_rfc3339(&meta.timestamp).expect("timestamp should parse");
    }
}

/// Standard API result type for JSON responses
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, errors::ServiceError>;

/// All `/api/v1` routes. Gated surfaces are wrapped in the auth middleware;
/// membership and role checks happen per handler.
pub fn api_v1_routes() -> Router<AppState> {
    let auth_routes = handlers::auth::public_routes().merge(
        handlers::auth::protected_routes()
            .route_layer(middleware::from_fn(auth::auth_middleware)),
    );

    let org_routes = handlers::organizations::routes()
        .nest("/:org_id/customers", handlers::customers::routes())
        .nest("/:org_id/projects", handlers::projects::routes())
        .nest("/:org_id/products", handlers::products::routes())
        .nest("/:org_id/estimate-headers", handlers::estimates::routes())
        .nest("/:org_id/job-cards", handlers::job_cards::routes())
        .route_layer(middleware::from_fn(auth::auth_middleware));

    let statistics = Router::new()
        .route("/statistics", get(handlers::statistics::api_statistics))
        .route_layer(middleware::from_fn(auth::auth_middleware));

    Router::new()
        .route("/status", get(api_status))
        .nest("/auth", auth_routes)
        .nest("/organizations", org_routes)
        .merge(statistics)
}

/// The full application router: health, versioned API, interactive docs.
/// The auth service is injected as a request extension so the middleware
/// can reach it.
pub fn app_router(state: AppState) -> Router {
    let auth_service = state.auth.clone();
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_v1_routes())
        .merge(openapi::swagger_ui())
        .layer(Extension(auth_service))
        .with_state(state)
}

async fn api_status() -> Result<Json<ApiResponse<Value>>, errors::ServiceError> {
    let version = env!("CARGO_PKG_VERSION");
    let git = option_env!("GIT_HASH").unwrap_or("unknown");
    let build_time = option_env!("BUILD_TIME").unwrap_or("unknown");
    let status_data = json!({
        "status": "ok",
        "version": version,
        "git": git,
        "build_time": build_time,
        "service": "timber-api",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "environment": std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
    });

    Ok(Json(ApiResponse::success(status_data)))
}

/// Public health endpoint: connectivity check, an endpoint map for
/// discoverability, and the global counters.
async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<Value>, errors::ServiceError> {
    let db_status = match state.db.ping().await {
        Ok(_) => "healthy",
        Err(_) => "unhealthy",
    };

    let counts = state.services.statistics.global_counts().await?;

    Ok(Json(json!({
        "status": db_status,
        "message": "Timber API is running",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "auth": {
                "register": "/api/v1/auth/register",
                "login": "/api/v1/auth/login",
                "logout": "/api/v1/auth/logout",
                "profile": "/api/v1/auth/profile",
                "verify_email": "/api/v1/auth/verify-email/{token}",
                "password_reset": "/api/v1/auth/password-reset/request",
                "password_change": "/api/v1/auth/password/change",
            },
            "organizations": {
                "list": "/api/v1/organizations",
                "create": "/api/v1/organizations/create",
                "detail": "/api/v1/organizations/{id}",
                "subscriptions": "/api/v1/organizations/subscriptions",
            },
            "docs": {
                "swagger": "/api/docs",
                "schema": "/api-docs/openapi.json",
            }
        },
        "statistics": {
            "total_users": counts.total_users,
            "total_organizations": counts.total_organizations,
            "total_subscriptions": counts.total_subscriptions,
        },
        "timestamp": chrono::Utc::now().to_rfc3339(),
    })))
}
