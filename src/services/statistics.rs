//! Global and per-user usage counters for the health and statistics
//! endpoints. Everything here is computed on demand with count queries, no
//! caching.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::DbPool;
use crate::entities::organization::Entity as OrganizationEntity;
use crate::entities::organization_member::{self, Entity as MemberEntity};
use crate::entities::subscription::{self, Entity as SubscriptionEntity};
use crate::entities::user::Entity as UserEntity;
use crate::errors::ServiceError;

/// The headline counts shown on the public health endpoint.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GlobalCounts {
    pub total_users: u64,
    pub total_organizations: u64,
    pub total_subscriptions: u64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GlobalStatistics {
    pub total_users: u64,
    pub total_organizations: u64,
    pub total_subscriptions: u64,
    pub active_subscriptions: u64,
    pub expired_subscriptions: u64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserInfo {
    pub id: Uuid,
    pub email: String,
    pub is_email_verified: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserStatistics {
    pub organizations_count: u64,
    pub subscriptions_count: u64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StatisticsResponse {
    pub user_info: UserInfo,
    pub user_statistics: UserStatistics,
    pub global_statistics: GlobalStatistics,
}

#[derive(Clone)]
pub struct StatisticsService {
    db_pool: Arc<DbPool>,
}

impl StatisticsService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self))]
    pub async fn global_counts(&self) -> Result<GlobalCounts, ServiceError> {
        let db = &*self.db_pool;
        Ok(GlobalCounts {
            total_users: UserEntity::find().count(db).await?,
            total_organizations: OrganizationEntity::find().count(db).await?,
            total_subscriptions: SubscriptionEntity::find().count(db).await?,
        })
    }

    /// The per-user view counts organizations through active memberships and
    /// subscriptions through the organizations those memberships reach.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn for_user(&self, user_id: Uuid) -> Result<StatisticsResponse, ServiceError> {
        let db = &*self.db_pool;

        let user = UserEntity::find_by_id(user_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("User {} not found", user_id)))?;

        let memberships = MemberEntity::find()
            .filter(organization_member::Column::UserId.eq(user_id))
            .filter(organization_member::Column::IsActive.eq(true))
            .all(db)
            .await?;
        let org_ids: Vec<Uuid> = memberships.iter().map(|m| m.organization_id).collect();

        let subscriptions_count = if org_ids.is_empty() {
            0
        } else {
            SubscriptionEntity::find()
                .filter(subscription::Column::OrganizationId.is_in(org_ids.clone()))
                .count(db)
                .await?
        };

        Ok(StatisticsResponse {
            user_info: UserInfo {
                id: user.id,
                email: user.email,
                is_email_verified: user.is_email_verified,
                created_at: user.created_at,
            },
            user_statistics: UserStatistics {
                organizations_count: memberships.len() as u64,
                subscriptions_count,
            },
            global_statistics: GlobalStatistics {
                total_users: UserEntity::find().count(db).await?,
                total_organizations: OrganizationEntity::find().count(db).await?,
                total_subscriptions: SubscriptionEntity::find().count(db).await?,
                active_subscriptions: SubscriptionEntity::find()
                    .filter(subscription::Column::HasExpired.eq(false))
                    .count(db)
                    .await?,
                expired_subscriptions: SubscriptionEntity::find()
                    .filter(subscription::Column::HasExpired.eq(true))
                    .count(db)
                    .await?,
            },
        })
    }
}
