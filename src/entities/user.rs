use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub username: String,
    #[sea_orm(unique)]
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub is_active: bool,
    pub is_email_verified: bool,
    #[serde(skip_serializing)]
    pub email_verification_token: Option<Uuid>,
    #[serde(skip_serializing)]
    pub password_reset_token: Option<Uuid>,
    #[serde(skip_serializing)]
    pub password_reset_expires: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Model {
    /// A reset token counts only while its expiry window is still open.
    pub fn password_reset_token_valid(&self, now: DateTime<Utc>) -> bool {
        match (self.password_reset_token, self.password_reset_expires) {
            (Some(_), Some(expires)) => now < expires,
            _ => false,
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::organization_member::Entity")]
    OrganizationMembers,
}

impl Related<super::organization_member::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrganizationMembers.def()
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C: ConnectionTrait>(self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active_model = self;

        let now = Utc::now();

        if insert {
            active_model.created_at = Set(now);
        }

        if let ActiveValue::NotSet = active_model.updated_at {
            active_model.updated_at = Set(Some(now));
        }

        Ok(active_model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn reset_token_valid_inside_window() {
        let now = Utc::now();
        let model = Model {
            id: Uuid::new_v4(),
            username: "carpenter".into(),
            email: "carpenter@example.com".into(),
            password_hash: "x".into(),
            first_name: None,
            last_name: None,
            phone_number: None,
            is_active: true,
            is_email_verified: false,
            email_verification_token: None,
            password_reset_token: Some(Uuid::new_v4()),
            password_reset_expires: Some(now + Duration::hours(1)),
            created_at: now,
            updated_at: None,
        };
        assert!(model.password_reset_token_valid(now));
        assert!(!model.password_reset_token_valid(now + Duration::hours(2)));
    }

    #[test]
    fn reset_token_invalid_when_absent() {
        let now = Utc::now();
        let model = Model {
            id: Uuid::new_v4(),
            username: "carpenter".into(),
            email: "carpenter@example.com".into(),
            password_hash: "x".into(),
            first_name: None,
            last_name: None,
            phone_number: None,
            is_active: true,
            is_email_verified: false,
            email_verification_token: None,
            password_reset_token: None,
            password_reset_expires: None,
            created_at: now,
            updated_at: None,
        };
        assert!(!model.password_reset_token_valid(now));
    }
}
