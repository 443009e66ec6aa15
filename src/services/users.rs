use std::sync::Arc;

use chrono::{Duration, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::auth::{hash_password, verify_password};
use crate::db::DbPool;
use crate::entities::user::{self, ActiveModel as UserActiveModel, Entity as UserEntity};
use crate::errors::ServiceError;
use crate::mailer::Mailer;

/// How long a password-reset token stays valid.
const PASSWORD_RESET_VALIDITY_HOURS: i64 = 24;

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(email(message = "A valid email address is required"))]
    pub email: String,
    #[validate(length(min = 3, message = "Username must be at least 3 characters"))]
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    pub password_confirm: String,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "A valid email address is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 3, message = "Username must be at least 3 characters"))]
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct PasswordResetRequest {
    #[validate(email(message = "A valid email address is required"))]
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct PasswordResetConfirmRequest {
    pub token: Uuid,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub new_password: String,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct PasswordChangeRequest {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub new_password: String,
}

/// Outcome of an operation that attempts to send a mail: the affected user
/// plus whether the mail counts as delivered.
#[derive(Debug)]
pub struct MailedOutcome {
    pub user: user::Model,
    pub email_sent: bool,
}

/// Account lifecycle: registration, login verification, email verification
/// and the password reset/change flows. Token issuance lives in
/// [`crate::auth::AuthService`]; this service only answers whether the
/// credentials are good.
#[derive(Clone)]
pub struct UserService {
    db_pool: Arc<DbPool>,
    mailer: Mailer,
}

impl UserService {
    pub fn new(db_pool: Arc<DbPool>, mailer: Mailer) -> Self {
        Self { db_pool, mailer }
    }

    /// Register a new account, issue a verification token and mail it.
    ///
    /// Mail failure never fails the registration; it is surfaced through
    /// `email_sent` so the handler can attach a warning.
    #[instrument(skip(self, request), fields(email = %request.email, username = %request.username))]
    pub async fn register(&self, request: RegisterRequest) -> Result<MailedOutcome, ServiceError> {
        request.validate()?;
        if request.password != request.password_confirm {
            return Err(ServiceError::ValidationError(
                "Password fields didn't match".to_string(),
            ));
        }

        let db = &*self.db_pool;
        let email = request.email.trim().to_ascii_lowercase();
        let username = request.username.trim().to_string();

        if self.find_by_email(&email).await?.is_some() {
            return Err(ServiceError::ValidationError(
                "A user with that email already exists".to_string(),
            ));
        }
        let username_taken = UserEntity::find()
            .filter(user::Column::Username.eq(username.clone()))
            .one(db)
            .await?
            .is_some();
        if username_taken {
            return Err(ServiceError::ValidationError(
                "A user with that username already exists".to_string(),
            ));
        }

        let verification_token = Uuid::new_v4();
        let user = UserActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(email),
            username: Set(username),
            password_hash: Set(hash_password(&request.password)?),
            first_name: Set(request.first_name),
            last_name: Set(request.last_name),
            phone_number: Set(request.phone_number),
            is_active: Set(true),
            is_email_verified: Set(false),
            email_verification_token: Set(Some(verification_token)),
            ..Default::default()
        }
        .insert(db)
        .await?;

        let email_sent = self
            .mailer
            .send_verification_email(&user, verification_token)
            .await;
        if !email_sent {
            warn!(user_id = %user.id, "Verification email could not be sent");
        }

        info!(user_id = %user.id, "User registered");
        Ok(MailedOutcome { user, email_sent })
    }

    /// Check credentials for login. Wrong email and wrong password are
    /// indistinguishable to the caller.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: LoginRequest) -> Result<user::Model, ServiceError> {
        request.validate()?;

        let email = request.email.trim().to_ascii_lowercase();
        let user = self
            .find_by_email(&email)
            .await?
            .ok_or_else(|| ServiceError::Unauthorized("Invalid credentials".to_string()))?;

        if !verify_password(&request.password, &user.password_hash)? {
            return Err(ServiceError::Unauthorized("Invalid credentials".to_string()));
        }
        if !user.is_active {
            return Err(ServiceError::Unauthorized(
                "User account is disabled".to_string(),
            ));
        }

        info!(user_id = %user.id, "User logged in");
        Ok(user)
    }

    pub async fn get(&self, user_id: Uuid) -> Result<user::Model, ServiceError> {
        UserEntity::find_by_id(user_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("User {} not found", user_id)))
    }

    /// Partial profile update. Email and the verification flags are not
    /// editable here.
    #[instrument(skip(self, request), fields(user_id = %user_id))]
    pub async fn update_profile(
        &self,
        user_id: Uuid,
        request: UpdateProfileRequest,
    ) -> Result<user::Model, ServiceError> {
        request.validate()?;

        let db = &*self.db_pool;
        let user = self.get(user_id).await?;

        if let Some(username) = &request.username {
            let username = username.trim();
            let taken = UserEntity::find()
                .filter(user::Column::Username.eq(username))
                .filter(user::Column::Id.ne(user_id))
                .one(db)
                .await?
                .is_some();
            if taken {
                return Err(ServiceError::ValidationError(
                    "A user with that username already exists".to_string(),
                ));
            }
        }

        let mut active: UserActiveModel = user.into();
        if let Some(username) = request.username {
            active.username = Set(username.trim().to_string());
        }
        if let Some(first_name) = request.first_name {
            active.first_name = Set(Some(first_name));
        }
        if let Some(last_name) = request.last_name {
            active.last_name = Set(Some(last_name));
        }
        if let Some(phone_number) = request.phone_number {
            active.phone_number = Set(Some(phone_number));
        }
        active.updated_at = Set(Some(Utc::now()));

        Ok(active.update(db).await?)
    }

    /// Consume an email-verification token.
    #[instrument(skip(self))]
    pub async fn verify_email(&self, token: Uuid) -> Result<user::Model, ServiceError> {
        let db = &*self.db_pool;
        let user = UserEntity::find()
            .filter(user::Column::EmailVerificationToken.eq(token))
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::ValidationError(
                    "Invalid or expired verification token".to_string(),
                )
            })?;

        let user_id = user.id;
        let mut active: UserActiveModel = user.into();
        active.is_email_verified = Set(true);
        active.email_verification_token = Set(None);
        active.updated_at = Set(Some(Utc::now()));
        let updated = active.update(db).await?;

        info!(user_id = %user_id, "Email verified");
        Ok(updated)
    }

    /// Issue a password-reset token for a known email and mail the link.
    ///
    /// An unknown email is a validation error, matching the inherited
    /// contract (this deliberately confirms account existence).
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn request_password_reset(
        &self,
        request: PasswordResetRequest,
    ) -> Result<MailedOutcome, ServiceError> {
        request.validate()?;

        let db = &*self.db_pool;
        let email = request.email.trim().to_ascii_lowercase();
        let user = self.find_by_email(&email).await?.ok_or_else(|| {
            ServiceError::ValidationError("No user found with this email address".to_string())
        })?;

        let token = Uuid::new_v4();
        let mut active: UserActiveModel = user.into();
        active.password_reset_token = Set(Some(token));
        active.password_reset_expires =
            Set(Some(Utc::now() + Duration::hours(PASSWORD_RESET_VALIDITY_HOURS)));
        active.updated_at = Set(Some(Utc::now()));
        let user = active.update(db).await?;

        let email_sent = self.mailer.send_password_reset_email(&user, token).await;
        if !email_sent {
            warn!(user_id = %user.id, "Password reset email could not be sent");
        }

        Ok(MailedOutcome { user, email_sent })
    }

    /// Redeem a reset token: re-hash the password and clear the token.
    #[instrument(skip(self, request))]
    pub async fn confirm_password_reset(
        &self,
        request: PasswordResetConfirmRequest,
    ) -> Result<(), ServiceError> {
        request.validate()?;

        let db = &*self.db_pool;
        let user = UserEntity::find()
            .filter(user::Column::PasswordResetToken.eq(request.token))
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::ValidationError("Invalid reset token".to_string()))?;

        if !user.password_reset_token_valid(Utc::now()) {
            return Err(ServiceError::ValidationError(
                "Invalid or expired reset token".to_string(),
            ));
        }

        let user_id = user.id;
        let mut active: UserActiveModel = user.into();
        active.password_hash = Set(hash_password(&request.new_password)?);
        active.password_reset_token = Set(None);
        active.password_reset_expires = Set(None);
        active.updated_at = Set(Some(Utc::now()));
        active.update(db).await?;

        info!(user_id = %user_id, "Password reset completed");
        Ok(())
    }

    /// Change the password of an authenticated user after re-verifying the
    /// current one.
    #[instrument(skip(self, request), fields(user_id = %user_id))]
    pub async fn change_password(
        &self,
        user_id: Uuid,
        request: PasswordChangeRequest,
    ) -> Result<(), ServiceError> {
        request.validate()?;

        let user = self.get(user_id).await?;
        if !verify_password(&request.current_password, &user.password_hash)? {
            return Err(ServiceError::ValidationError(
                "Current password is incorrect".to_string(),
            ));
        }

        let mut active: UserActiveModel = user.into();
        active.password_hash = Set(hash_password(&request.new_password)?);
        active.updated_at = Set(Some(Utc::now()));
        active.update(&*self.db_pool).await?;

        info!(user_id = %user_id, "Password changed");
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<user::Model>, ServiceError> {
        UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_request_rejects_weak_password() {
        let request = RegisterRequest {
            email: "maker@example.com".into(),
            username: "maker".into(),
            first_name: None,
            last_name: None,
            phone_number: None,
            password: "short".into(),
            password_confirm: "short".into(),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn register_request_rejects_bad_email() {
        let request = RegisterRequest {
            email: "not-an-email".into(),
            username: "maker".into(),
            first_name: None,
            last_name: None,
            phone_number: None,
            password: "a-long-enough-password".into(),
            password_confirm: "a-long-enough-password".into(),
        };
        assert!(request.validate().is_err());
    }
}
