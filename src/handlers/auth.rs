use axum::{
    extract::{Json, Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post, put},
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::{bearer_token, AuthUser, IssuedToken};
use crate::entities::user;
use crate::errors::ServiceError;
use crate::services::users::{
    LoginRequest, PasswordChangeRequest, PasswordResetConfirmRequest, PasswordResetRequest,
    RegisterRequest, UpdateProfileRequest,
};
use crate::AppState;

/// Public projection of a user account. Token and hash fields never leave
/// the entity layer.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserView {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub is_email_verified: bool,
    pub created_at: DateTime<Utc>,
}

impl From<user::Model> for UserView {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            username: model.username,
            first_name: model.first_name,
            last_name: model.last_name,
            phone_number: model.phone_number,
            is_email_verified: model.is_email_verified,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub user: UserView,
    pub token: IssuedToken,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_sent: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_sent: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let outcome = state.services.users.register(request).await?;
    let token = state.auth.generate_token(&outcome.user)?;

    let warning = (!outcome.email_sent)
        .then(|| "Verification email could not be sent; request a resend later".to_string());

    let body = AuthResponse {
        user: outcome.user.into(),
        token,
        message: "Registration successful. Please verify your email address.".to_string(),
        email_sent: Some(outcome.email_sent),
        warning,
    };
    Ok((StatusCode::CREATED, Json(body)))
}

async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let user = state.services.users.login(request).await?;
    let token = state.auth.generate_token(&user)?;

    Ok(Json(AuthResponse {
        user: user.into(),
        token,
        message: "Login successful".to_string(),
        email_sent: None,
        warning: None,
    }))
}

/// Revokes the presented token so it fails validation from now on.
async fn logout(
    State(state): State<AppState>,
    _user: AuthUser,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ServiceError> {
    if let Some(token) = bearer_token(&headers) {
        state.auth.revoke_token(token).await?;
    }
    Ok(Json(MessageResponse {
        message: "Logged out".to_string(),
        email_sent: None,
        warning: None,
    }))
}

async fn profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<UserView>, ServiceError> {
    let model = state.services.users.get(user.user_id).await?;
    Ok(Json(model.into()))
}

async fn update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<UserView>, ServiceError> {
    let model = state
        .services
        .users
        .update_profile(user.user_id, request)
        .await?;
    Ok(Json(model.into()))
}

async fn verify_email(
    State(state): State<AppState>,
    Path(token): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.users.verify_email(token).await?;
    Ok(Json(MessageResponse {
        message: "Email verified successfully".to_string(),
        email_sent: None,
        warning: None,
    }))
}

async fn request_password_reset(
    State(state): State<AppState>,
    Json(request): Json<PasswordResetRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let outcome = state.services.users.request_password_reset(request).await?;
    let warning = (!outcome.email_sent)
        .then(|| "Reset email could not be sent; try again later".to_string());
    Ok(Json(MessageResponse {
        message: "Password reset requested. Check your inbox.".to_string(),
        email_sent: Some(outcome.email_sent),
        warning,
    }))
}

async fn confirm_password_reset(
    State(state): State<AppState>,
    Json(request): Json<PasswordResetConfirmRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.users.confirm_password_reset(request).await?;
    Ok(Json(MessageResponse {
        message: "Password has been reset".to_string(),
        email_sent: None,
        warning: None,
    }))
}

async fn change_password(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<PasswordChangeRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    state
        .services
        .users
        .change_password(user.user_id, request)
        .await?;
    Ok(Json(MessageResponse {
        message: "Password changed".to_string(),
        email_sent: None,
        warning: None,
    }))
}

/// Endpoints that work without a token.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/verify-email/:token", post(verify_email))
        .route("/password-reset/request", post(request_password_reset))
        .route("/password-reset/confirm", post(confirm_password_reset))
}

/// Endpoints behind the auth middleware.
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/logout", post(logout))
        .route("/profile", get(profile))
        .route("/profile/update", put(update_profile).patch(update_profile))
        .route("/password/change", post(change_password))
}
