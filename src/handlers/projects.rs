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
use crate::services::catalog::{CreateProjectRequest, UpdateProjectRequest};
use crate::{AppState, ListQuery, PaginatedResponse};

async fn list_projects(
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
        .list_projects(org_id, query.page, query.limit)
        .await?;
    Ok(Json(PaginatedResponse {
        total_pages: page.total.div_ceil(query.limit.max(1)),
        items: page.items,
        total: page.total,
        page: query.page,
        limit: query.limit,
    }))
}

async fn create_project(
    State(state): State<AppState>,
    user: AuthUser,
    Path(org_id): Path<Uuid>,
    Json(request): Json<CreateProjectRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    state
        .services
        .organizations
        .ensure_member(user.user_id, org_id)
        .await?;
    let project = state.services.catalog.create_project(org_id, request).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

async fn get_project(
    State(state): State<AppState>,
    user: AuthUser,
    Path((org_id, id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ServiceError> {
    state
        .services
        .organizations
        .ensure_member(user.user_id, org_id)
        .await?;
    let project = state.services.catalog.get_project(org_id, id).await?;
    Ok(Json(project))
}

async fn update_project(
    State(state): State<AppState>,
    user: AuthUser,
    Path((org_id, id)): Path<(Uuid, Uuid)>,
    Json(request): Json<UpdateProjectRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    state
        .services
        .organizations
        .ensure_member(user.user_id, org_id)
        .await?;
    let project = state
        .services
        .catalog
        .update_project(org_id, id, request)
        .await?;
    Ok(Json(project))
}

async fn delete_project(
    State(state): State<AppState>,
    user: AuthUser,
    Path((org_id, id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ServiceError> {
    state
        .services
        .organizations
        .ensure_member(user.user_id, org_id)
        .await?;
    state.services.catalog.delete_project(org_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_projects))
        .route("/", post(create_project))
        .route("/:id", get(get_project))
        .route("/:id", put(update_project).patch(update_project))
        .route("/:id", delete(delete_project))
}
