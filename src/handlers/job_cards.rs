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
use crate::services::job_cards::{CreateJobCardRequest, UpdateJobCardRequest};
use crate::{AppState, ListQuery, PaginatedResponse};

async fn list_job_cards(
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
        .job_cards
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

async fn create_job_card(
    State(state): State<AppState>,
    user: AuthUser,
    Path(org_id): Path<Uuid>,
    Json(request): Json<CreateJobCardRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    state
        .services
        .organizations
        .ensure_member(user.user_id, org_id)
        .await?;
    let card = state.services.job_cards.create(org_id, request).await?;
    Ok((StatusCode::CREATED, Json(card)))
}

/// The response carries the derived `measurements` list, recomputed from
/// the estimate details matching the card's (header, product) pair.
async fn get_job_card(
    State(state): State<AppState>,
    user: AuthUser,
    Path((org_id, id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ServiceError> {
    state
        .services
        .organizations
        .ensure_member(user.user_id, org_id)
        .await?;
    let card = state.services.job_cards.get(org_id, id).await?;
    Ok(Json(card))
}

async fn update_job_card(
    State(state): State<AppState>,
    user: AuthUser,
    Path((org_id, id)): Path<(Uuid, Uuid)>,
    Json(request): Json<UpdateJobCardRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    state
        .services
        .organizations
        .ensure_member(user.user_id, org_id)
        .await?;
    let card = state
        .services
        .job_cards
        .update(org_id, id, request)
        .await?;
    Ok(Json(card))
}

async fn delete_job_card(
    State(state): State<AppState>,
    user: AuthUser,
    Path((org_id, id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ServiceError> {
    state
        .services
        .organizations
        .ensure_member(user.user_id, org_id)
        .await?;
    state.services.job_cards.delete(org_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_job_cards))
        .route("/", post(create_job_card))
        .route("/:id", get(get_job_card))
        .route("/:id", put(update_job_card).patch(update_job_card))
        .route("/:id", delete(delete_job_card))
}
