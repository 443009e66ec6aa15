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
use crate::services::catalog::{CreateProductRequest, UpdateProductRequest};
use crate::{AppState, ListQuery, PaginatedResponse};

async fn list_products(
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
        .list_products(org_id, query.page, query.limit)
        .await?;
    Ok(Json(PaginatedResponse {
        total_pages: page.total.div_ceil(query.limit.max(1)),
        items: page.items,
        total: page.total,
        page: query.page,
        limit: query.limit,
    }))
}

async fn create_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(org_id): Path<Uuid>,
    Json(request): Json<CreateProductRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    state
        .services
        .organizations
        .ensure_member(user.user_id, org_id)
        .await?;
    let product = state.services.catalog.create_product(org_id, request).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

async fn get_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path((org_id, id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ServiceError> {
    state
        .services
        .organizations
        .ensure_member(user.user_id, org_id)
        .await?;
    let product = state.services.catalog.get_product(org_id, id).await?;
    Ok(Json(product))
}

async fn update_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path((org_id, id)): Path<(Uuid, Uuid)>,
    Json(request): Json<UpdateProductRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    state
        .services
        .organizations
        .ensure_member(user.user_id, org_id)
        .await?;
    let product = state
        .services
        .catalog
        .update_product(org_id, id, request)
        .await?;
    Ok(Json(product))
}

/// Refused while any estimate detail still references the product.
async fn delete_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path((org_id, id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ServiceError> {
    state
        .services
        .organizations
        .ensure_member(user.user_id, org_id)
        .await?;
    state.services.catalog.delete_product(org_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products))
        .route("/", post(create_product))
        .route("/:id", get(get_product))
        .route("/:id", put(update_product).patch(update_product))
        .route("/:id", delete(delete_product))
}
