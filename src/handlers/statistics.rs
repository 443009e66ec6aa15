use axum::{extract::State, response::Json};

use crate::auth::AuthUser;
use crate::errors::ServiceError;
use crate::services::statistics::StatisticsResponse;
use crate::AppState;

/// Caller-centric usage statistics plus the global counters.
pub async fn api_statistics(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<StatisticsResponse>, ServiceError> {
    let statistics = state.services.statistics.for_user(user.user_id).await?;
    Ok(Json(statistics))
}
