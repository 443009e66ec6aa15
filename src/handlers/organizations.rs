use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Router,
};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::ServiceError;
use crate::services::organizations::{
    CreateOrganizationRequest, CreateSubscriptionRequest, UpdateOrganizationRequest,
};
use crate::AppState;

async fn list_organizations(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    let organizations = state
        .services
        .organizations
        .list_for_user(user.user_id)
        .await?;
    Ok(Json(organizations))
}

async fn create_organization(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<CreateOrganizationRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let organization = state
        .services
        .organizations
        .create(user.user_id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(organization)))
}

async fn get_organization(
    State(state): State<AppState>,
    user: AuthUser,
    Path(org_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let organization = state
        .services
        .organizations
        .get_for_member(user.user_id, org_id)
        .await?;
    Ok(Json(organization))
}

async fn update_organization(
    State(state): State<AppState>,
    user: AuthUser,
    Path(org_id): Path<Uuid>,
    Json(request): Json<UpdateOrganizationRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let organization = state
        .services
        .organizations
        .update(user.user_id, org_id, request)
        .await?;
    Ok(Json(organization))
}

async fn list_members(
    State(state): State<AppState>,
    user: AuthUser,
    Path(org_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let members = state
        .services
        .organizations
        .members(user.user_id, org_id)
        .await?;
    Ok(Json(members))
}

async fn list_subscriptions(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    let subscriptions = state
        .services
        .organizations
        .subscriptions_for_user(user.user_id)
        .await?;
    Ok(Json(subscriptions))
}

async fn create_subscription(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<CreateSubscriptionRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let subscription = state
        .services
        .organizations
        .create_subscription(user.user_id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(subscription)))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_organizations))
        .route("/create", post(create_organization))
        // Subscription routes must register before the `/:org_id` catch-all.
        .route("/subscriptions", get(list_subscriptions))
        .route("/subscriptions/create", post(create_subscription))
        .route("/:org_id", get(get_organization))
        .route(
            "/:org_id/update",
            put(update_organization).patch(update_organization),
        )
        .route("/:org_id/members", get(list_members))
}
