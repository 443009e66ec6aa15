use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Router,
};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::ServiceError;
use crate::services::catalog::{CreateCustomerRequest, UpdateCustomerRequest};
use crate::{AppState, ListQuery, PaginatedResponse};

async fn list_customers(
    State(state): State<AppState>,
    user: AuthUser,
    Path(org_id): Path<Uuid>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    state
        .services
        .organizations
        .ensure_member(user.user_id, org_id)
        .await?;
    let page = state
        .services
        .catalog
        .list_customers(org_id, query.page, query.limit)
        .await?;
    Ok(Json(PaginatedResponse {
        total_pages: page.total.div_ceil(query.limit.max(1)),
        items: page.items,
        total: page.total,
        page: query.page,
        limit: query.limit,
    }))
}

async fn create_customer(
    State(state): State<AppState>,
    user: AuthUser,
    Path(org_id): Path<Uuid>,
    Json(request): Json<CreateCustomerRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    state
        .services
        .organizations
        .ensure_member(user.user_id, org_id)
        .await?;
    let customer = state.services.catalog.create_customer(org_id, request).await?;
    Ok((StatusCode::CREATED, Json(customer)))
}

async fn get_customer(
    State(state): State<AppState>,
    user: AuthUser,
    Path((org_id, id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ServiceError> {
    state
        .services
        .organizations
        .ensure_member(user.user_id, org_id)
        .await?;
    let customer = state.services.catalog.get_customer(org_id, id).await?;
    Ok(Json(customer))
}

async fn update_customer(
    State(state): State<AppState>,
    user: AuthUser,
    Path((org_id, id)): Path<(Uuid, Uuid)>,
    Json(request): Json<UpdateCustomerRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    state
        .services
        .organizations
        .ensure_member(user.user_id, org_id)
        .await?;
    let customer = state
        .services
        .catalog
        .update_customer(org_id, id, request)
        .await?;
    Ok(Json(customer))
}

async fn delete_customer(
    State(state): State<AppState>,
    user: AuthUser,
    Path((org_id, id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ServiceError> {
    state
        .services
        .organizations
        .ensure_member(user.user_id, org_id)
        .await?;
    state.services.catalog.delete_customer(org_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_customers))
        .route("/", post(create_customer))
        .route("/:id", get(get_customer))
        .route("/:id", put(update_customer).patch(update_customer))
        .route("/:id", delete(delete_customer))
}
