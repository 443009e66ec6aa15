use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::db::DbPool;
use crate::entities::organization::{
    self, ActiveModel as OrganizationActiveModel, Entity as OrganizationEntity,
};
use crate::entities::organization_member::{
    self, ActiveModel as MemberActiveModel, Entity as MemberEntity, ROLE_ADMIN, ROLE_MEMBER,
    ROLE_OWNER,
};
use crate::entities::subscription::{
    self, ActiveModel as SubscriptionActiveModel, Entity as SubscriptionEntity,
};
use crate::entities::user::Entity as UserEntity;
use crate::errors::ServiceError;

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateOrganizationRequest {
    #[validate(length(min = 1, message = "Organization name is required"))]
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateOrganizationRequest {
    #[validate(length(min = 1, message = "Organization name must not be empty"))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateSubscriptionRequest {
    pub organization_id: Uuid,
    #[validate(length(min = 1, message = "Plan name is required"))]
    pub plan_name: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrganizationResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_by: Option<Uuid>,
    pub is_active: bool,
    pub member_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MemberResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub user_email: String,
    pub role: String,
    pub joined_at: DateTime<Utc>,
}

/// Organizations, memberships and subscriptions.
///
/// Membership is the unit of tenancy: every org-scoped read or write goes
/// through [`ensure_member`](Self::ensure_member) or
/// [`ensure_role`](Self::ensure_role) before touching data.
#[derive(Clone)]
pub struct OrganizationService {
    db_pool: Arc<DbPool>,
}

impl OrganizationService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Active membership row for a user in an organization.
    ///
    /// A non-member is answered with NotFound rather than Forbidden so the
    /// existence of the organization is not revealed.
    pub async fn ensure_member(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
    ) -> Result<organization_member::Model, ServiceError> {
        self.find_active_membership(user_id, organization_id)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Organization {} not found", organization_id))
            })
    }

    /// Membership check restricted to an allowed role set.
    ///
    /// A member with an insufficient role receives an explicit Forbidden; a
    /// non-member still receives NotFound, matching [`ensure_member`].
    pub async fn ensure_role(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
        allowed_roles: &[&str],
    ) -> Result<organization_member::Model, ServiceError> {
        let membership = self.ensure_member(user_id, organization_id).await?;
        if allowed_roles.contains(&membership.role.as_str()) {
            Ok(membership)
        } else {
            Err(ServiceError::Forbidden(format!(
                "Role '{}' may not perform this action; requires one of: {}",
                membership.role,
                allowed_roles.join(", ")
            )))
        }
    }

    async fn find_active_membership(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
    ) -> Result<Option<organization_member::Model>, ServiceError> {
        MemberEntity::find()
            .filter(organization_member::Column::OrganizationId.eq(organization_id))
            .filter(organization_member::Column::UserId.eq(user_id))
            .filter(organization_member::Column::IsActive.eq(true))
            .one(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    /// Organizations the user is an active member of.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn list_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<OrganizationResponse>, ServiceError> {
        let db = &*self.db_pool;

        let memberships = MemberEntity::find()
            .filter(organization_member::Column::UserId.eq(user_id))
            .filter(organization_member::Column::IsActive.eq(true))
            .all(db)
            .await?;

        let org_ids: Vec<Uuid> = memberships.iter().map(|m| m.organization_id).collect();
        if org_ids.is_empty() {
            return Ok(Vec::new());
        }

        let organizations = OrganizationEntity::find()
            .filter(organization::Column::Id.is_in(org_ids))
            .order_by_asc(organization::Column::CreatedAt)
            .all(db)
            .await?;

        let mut responses = Vec::with_capacity(organizations.len());
        for org in organizations {
            let member_count = self.count_active_members(org.id).await?;
            responses.push(to_response(org, member_count));
        }
        Ok(responses)
    }

    /// Create an organization and enroll the creator as its owner, in one
    /// transaction.
    #[instrument(skip(self, request), fields(user_id = %user_id, name = %request.name))]
    pub async fn create(
        &self,
        user_id: Uuid,
        request: CreateOrganizationRequest,
    ) -> Result<OrganizationResponse, ServiceError> {
        request.validate()?;

        let db = &*self.db_pool;
        let name = request.name.trim().to_string();

        let name_taken = OrganizationEntity::find()
            .filter(organization::Column::Name.eq(name.clone()))
            .one(db)
            .await?
            .is_some();
        if name_taken {
            return Err(ServiceError::ValidationError(format!(
                "An organization named '{}' already exists",
                name
            )));
        }

        let org_id = Uuid::new_v4();
        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, "Failed to start transaction for organization creation");
            ServiceError::DatabaseError(e)
        })?;

        let organization = OrganizationActiveModel {
            id: Set(org_id),
            name: Set(name),
            description: Set(request.description),
            created_by: Set(Some(user_id)),
            is_active: Set(true),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        MemberActiveModel {
            id: Set(Uuid::new_v4()),
            organization_id: Set(org_id),
            user_id: Set(user_id),
            role: Set(ROLE_OWNER.to_string()),
            is_active: Set(true),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, organization_id = %org_id, "Failed to commit organization creation");
            ServiceError::DatabaseError(e)
        })?;

        info!(organization_id = %org_id, "Organization created");
        Ok(to_response(organization, 1))
    }

    /// Fetch an organization the caller belongs to.
    #[instrument(skip(self), fields(user_id = %user_id, organization_id = %organization_id))]
    pub async fn get_for_member(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
    ) -> Result<OrganizationResponse, ServiceError> {
        self.ensure_member(user_id, organization_id).await?;

        let organization = OrganizationEntity::find_by_id(organization_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Organization {} not found", organization_id))
            })?;

        let member_count = self.count_active_members(organization_id).await?;
        Ok(to_response(organization, member_count))
    }

    /// Partial update, restricted to owners and admins. Non-members and plain
    /// members both see NotFound: the row is scoped by membership role.
    #[instrument(skip(self, request), fields(user_id = %user_id, organization_id = %organization_id))]
    pub async fn update(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
        request: UpdateOrganizationRequest,
    ) -> Result<OrganizationResponse, ServiceError> {
        request.validate()?;

        let membership = self.ensure_member(user_id, organization_id).await?;
        if !membership.can_manage_organization() {
            return Err(ServiceError::NotFound(format!(
                "Organization {} not found",
                organization_id
            )));
        }

        let db = &*self.db_pool;
        let organization = OrganizationEntity::find_by_id(organization_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Organization {} not found", organization_id))
            })?;

        let mut active: OrganizationActiveModel = organization.into();
        if let Some(name) = request.name {
            active.name = Set(name.trim().to_string());
        }
        if let Some(description) = request.description {
            active.description = Set(Some(description));
        }
        if let Some(is_active) = request.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(Some(Utc::now()));

        let updated = active.update(db).await?;
        info!(organization_id = %organization_id, "Organization updated");

        let member_count = self.count_active_members(organization_id).await?;
        Ok(to_response(updated, member_count))
    }

    /// Active members with their user email, owners first.
    #[instrument(skip(self), fields(user_id = %user_id, organization_id = %organization_id))]
    pub async fn members(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
    ) -> Result<Vec<MemberResponse>, ServiceError> {
        self.ensure_member(user_id, organization_id).await?;

        let rows = MemberEntity::find()
            .filter(organization_member::Column::OrganizationId.eq(organization_id))
            .filter(organization_member::Column::IsActive.eq(true))
            .find_also_related(UserEntity)
            .order_by_asc(organization_member::Column::JoinedAt)
            .all(&*self.db_pool)
            .await?;

        let mut members: Vec<MemberResponse> = rows
            .into_iter()
            .map(|(member, user)| MemberResponse {
                id: member.id,
                user_id: member.user_id,
                user_email: user.map(|u| u.email).unwrap_or_default(),
                role: member.role,
                joined_at: member.joined_at,
            })
            .collect();

        members.sort_by_key(|m| (role_rank(&m.role), m.joined_at));
        Ok(members)
    }

    /// Subscriptions of every organization the caller belongs to.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn subscriptions_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<subscription::Model>, ServiceError> {
        let db = &*self.db_pool;

        let memberships = MemberEntity::find()
            .filter(organization_member::Column::UserId.eq(user_id))
            .filter(organization_member::Column::IsActive.eq(true))
            .all(db)
            .await?;

        let org_ids: Vec<Uuid> = memberships.iter().map(|m| m.organization_id).collect();
        if org_ids.is_empty() {
            return Ok(Vec::new());
        }

        SubscriptionEntity::find()
            .filter(subscription::Column::OrganizationId.is_in(org_ids))
            .order_by_asc(subscription::Column::StartedAt)
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    /// Create a subscription. Unlike [`update`](Self::update), an
    /// insufficient role here is an explicit Forbidden.
    #[instrument(skip(self, request), fields(user_id = %user_id, organization_id = %request.organization_id))]
    pub async fn create_subscription(
        &self,
        user_id: Uuid,
        request: CreateSubscriptionRequest,
    ) -> Result<subscription::Model, ServiceError> {
        request.validate()?;

        self.ensure_role(user_id, request.organization_id, &[ROLE_OWNER, ROLE_ADMIN])
            .await
            .map_err(|err| match err {
                ServiceError::Forbidden(_) => ServiceError::Forbidden(
                    "You do not have permission to create subscriptions for this organization"
                        .to_string(),
                ),
                other => other,
            })?;

        let subscription = SubscriptionActiveModel {
            id: Set(Uuid::new_v4()),
            organization_id: Set(request.organization_id),
            plan_name: Set(request.plan_name.trim().to_string()),
            has_expired: Set(false),
            ..Default::default()
        }
        .insert(&*self.db_pool)
        .await?;

        info!(subscription_id = %subscription.id, "Subscription created");
        Ok(subscription)
    }

    async fn count_active_members(&self, organization_id: Uuid) -> Result<u64, ServiceError> {
        MemberEntity::find()
            .filter(organization_member::Column::OrganizationId.eq(organization_id))
            .filter(organization_member::Column::IsActive.eq(true))
            .count(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)
    }
}

fn to_response(model: organization::Model, member_count: u64) -> OrganizationResponse {
    OrganizationResponse {
        id: model.id,
        name: model.name,
        description: model.description,
        created_by: model.created_by,
        is_active: model.is_active,
        member_count,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

fn role_rank(role: &str) -> u8 {
    match role {
        ROLE_OWNER => 0,
        ROLE_ADMIN => 1,
        ROLE_MEMBER => 2,
        _ => 3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_sort_owner_first() {
        assert!(role_rank(ROLE_OWNER) < role_rank(ROLE_ADMIN));
        assert!(role_rank(ROLE_ADMIN) < role_rank(ROLE_MEMBER));
        assert!(role_rank(ROLE_MEMBER) < role_rank("viewer"));
    }

    #[test]
    fn create_request_requires_name() {
        let request = CreateOrganizationRequest {
            name: String::new(),
            description: None,
        };
        assert!(request.validate().is_err());
    }
}
