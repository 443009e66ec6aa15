use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Router,
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::ServiceError;
use crate::services::estimates::{
    CreateEstimateRequest, EstimateWithDetailsResponse, UpdateEstimateRequest,
};
use crate::{AppState, ListQuery, PaginatedResponse};

/// Update response: the re-read aggregate plus a skip report for detail
/// items that were dropped for lacking a product reference.
#[derive(Debug, Serialize, ToSchema)]
pub struct EstimateUpdateResponse {
    #[serde(flatten)]
    pub estimate: EstimateWithDetailsResponse,
    pub skipped_details: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Create an estimate header with its detail lines
#[utoipa::path(
    post,
    path = "/api/v1/organizations/{org_id}/estimate-headers",
    request_body = CreateEstimateRequest,
    params(
        ("org_id" = Uuid, Path, description = "Organization ID")
    ),
    responses(
        (status = 201, description = "Estimate created", body = crate::services::estimates::EstimateHeaderResponse),
        (status = 400, description = "Validation failure or unresolved reference", body = crate::errors::ErrorResponse),
        (status = 404, description = "Organization not found", body = crate::errors::ErrorResponse)
    ),
    tag = "estimates"
)]
pub async fn create_estimate(
    State(state): State<AppState>,
    user: AuthUser,
    Path(org_id): Path<Uuid>,
    Json(request): Json<CreateEstimateRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    state
        .services
        .organizations
        .ensure_member(user.user_id, org_id)
        .await?;
    let header = state.services.estimates.create(org_id, request).await?;
    Ok((StatusCode::CREATED, Json(header)))
}

/// List estimate headers for an organization
#[utoipa::path(
    get,
    path = "/api/v1/organizations/{org_id}/estimate-headers",
    params(
        ("org_id" = Uuid, Path, description = "Organization ID")
    ),
    responses(
        (status = 200, description = "Estimate headers listed")
    ),
    tag = "estimates"
)]
pub async fn list_estimates(
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
        .estimates
        .list(org_id, query.page, query.limit)
        .await?;
    Ok(Json(PaginatedResponse {
        total_pages: page.total.div_ceil(query.limit.max(1)),
        items: page.items,
        total: page.total,
        page: query.page,
        limit: query.limit,
    }))
}

/// Retrieve an estimate with its detail lines
#[utoipa::path(
    get,
    path = "/api/v1/organizations/{org_id}/estimate-headers/{id}",
    params(
        ("org_id" = Uuid, Path, description = "Organization ID"),
        ("id" = Uuid, Path, description = "Estimate header ID")
    ),
    responses(
        (status = 200, description = "Estimate fetched", body = EstimateWithDetailsResponse),
        (status = 404, description = "Estimate not found", body = crate::errors::ErrorResponse)
    ),
    tag = "estimates"
)]
pub async fn get_estimate(
    State(state): State<AppState>,
    user: AuthUser,
    Path((org_id, id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ServiceError> {
    state
        .services
        .organizations
        .ensure_member(user.user_id, org_id)
        .await?;
    let estimate = state.services.estimates.get(org_id, id).await?;
    Ok(Json(estimate))
}

/// Update an estimate; a payload with a `details` key replaces the whole
/// detail collection
#[utoipa::path(
    put,
    path = "/api/v1/organizations/{org_id}/estimate-headers/{id}",
    request_body = UpdateEstimateRequest,
    params(
        ("org_id" = Uuid, Path, description = "Organization ID"),
        ("id" = Uuid, Path, description = "Estimate header ID")
    ),
    responses(
        (status = 200, description = "Estimate updated", body = EstimateUpdateResponse),
        (status = 400, description = "Validation failure or unresolved reference", body = crate::errors::ErrorResponse),
        (status = 404, description = "Estimate not found", body = crate::errors::ErrorResponse)
    ),
    tag = "estimates"
)]
pub async fn update_estimate(
    State(state): State<AppState>,
    user: AuthUser,
    Path((org_id, id)): Path<(Uuid, Uuid)>,
    Json(request): Json<UpdateEstimateRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    state
        .services
        .organizations
        .ensure_member(user.user_id, org_id)
        .await?;
    let outcome = state
        .services
        .estimates
        .update(org_id, id, request)
        .await?;

    let warning = (outcome.skipped_details > 0).then(|| {
        format!(
            "{} detail item(s) without a product_id were skipped",
            outcome.skipped_details
        )
    });
    Ok(Json(EstimateUpdateResponse {
        estimate: outcome.estimate,
        skipped_details: outcome.skipped_details,
        warning,
    }))
}

/// Delete an estimate and its detail lines
#[utoipa::path(
    delete,
    path = "/api/v1/organizations/{org_id}/estimate-headers/{id}",
    params(
        ("org_id" = Uuid, Path, description = "Organization ID"),
        ("id" = Uuid, Path, description = "Estimate header ID")
    ),
    responses(
        (status = 204, description = "Estimate deleted"),
        (status = 404, description = "Estimate not found", body = crate::errors::ErrorResponse)
    ),
    tag = "estimates"
)]
pub async fn delete_estimate(
    State(state): State<AppState>,
    user: AuthUser,
    Path((org_id, id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ServiceError> {
    state
        .services
        .organizations
        .ensure_member(user.user_id, org_id)
        .await?;
    state.services.estimates.delete(org_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_estimates))
        .route("/", post(create_estimate))
        .route("/:id", get(get_estimate))
        .route("/:id", put(update_estimate).patch(update_estimate))
        .route("/:id", delete(delete_estimate))
}
