//! Shop-floor job cards.
//!
//! A job card optionally points at an estimate header and a product. It never
//! stores measurements of its own: the measurement view is derived on every
//! read from the estimate details matching both references, so the card always
//! reflects the current state of the estimate.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::DbPool;
use crate::entities::estimate_detail::{self, Entity as DetailEntity};
use crate::entities::estimate_header::Entity as HeaderEntity;
use crate::entities::job_card::{self, ActiveModel as JobCardActiveModel, Entity as JobCardEntity};
use crate::entities::product::{self, Entity as ProductEntity};
use crate::entities::project;
use crate::errors::ServiceError;
use crate::services::catalog::Page;
use crate::services::estimates::{detail_view, EstimateDetailView};

pub const JOB_CARD_STATUSES: [&str; 3] = ["pending", "in_progress", "completed"];

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateJobCardRequest {
    pub estimate_header_id: Option<Uuid>,
    pub product_id: Option<Uuid>,
    pub status: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateJobCardRequest {
    /// Double-optional so the payload can distinguish "leave the reference
    /// alone" (key absent) from "clear it" (explicit null).
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub estimate_header_id: Option<Option<Uuid>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub product_id: Option<Option<Uuid>>,
    pub status: Option<String>,
    pub description: Option<String>,
}

/// Read projection. `measurements` is recomputed on every retrieval from the
/// estimate details matching both the header and product references.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct JobCardResponse {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub estimate_header_id: Option<Uuid>,
    pub product_id: Option<Uuid>,
    pub status: String,
    pub description: Option<String>,
    pub measurements: Vec<EstimateDetailView>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Clone)]
pub struct JobCardService {
    db_pool: Arc<DbPool>,
}

impl JobCardService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self, request), fields(organization_id = %organization_id))]
    pub async fn create(
        &self,
        organization_id: Uuid,
        request: CreateJobCardRequest,
    ) -> Result<JobCardResponse, ServiceError> {
        if let Some(header_id) = request.estimate_header_id {
            self.ensure_header_in_org(organization_id, header_id).await?;
        }
        if let Some(product_id) = request.product_id {
            self.ensure_product_in_org(organization_id, product_id)
                .await?;
        }
        let status = validate_job_card_status(request.status)?;

        let card = JobCardActiveModel {
            id: Set(Uuid::new_v4()),
            organization_id: Set(organization_id),
            estimate_header_id: Set(request.estimate_header_id),
            product_id: Set(request.product_id),
            status: Set(status),
            description: Set(request.description),
            ..Default::default()
        }
        .insert(&*self.db_pool)
        .await?;

        info!(job_card_id = %card.id, "Job card created");
        self.with_measurements(card).await
    }

    #[instrument(skip(self), fields(organization_id = %organization_id, job_card_id = %card_id))]
    pub async fn get(
        &self,
        organization_id: Uuid,
        card_id: Uuid,
    ) -> Result<JobCardResponse, ServiceError> {
        let card = self.find_scoped(organization_id, card_id).await?;
        self.with_measurements(card).await
    }

    #[instrument(skip(self), fields(organization_id = %organization_id))]
    pub async fn list(
        &self,
        organization_id: Uuid,
        page: u64,
        limit: u64,
    ) -> Result<Page<JobCardResponse>, ServiceError> {
        let paginator = JobCardEntity::find()
            .filter(job_card::Column::OrganizationId.eq(organization_id))
            .order_by_asc(job_card::Column::CreatedAt)
            .paginate(&*self.db_pool, limit.max(1));

        let total = paginator.num_items().await?;
        let cards = paginator.fetch_page(page.saturating_sub(1)).await?;

        let mut items = Vec::with_capacity(cards.len());
        for card in cards {
            items.push(self.with_measurements(card).await?);
        }
        Ok(Page { items, total })
    }

    #[instrument(skip(self, request), fields(organization_id = %organization_id, job_card_id = %card_id))]
    pub async fn update(
        &self,
        organization_id: Uuid,
        card_id: Uuid,
        request: UpdateJobCardRequest,
    ) -> Result<JobCardResponse, ServiceError> {
        let card = self.find_scoped(organization_id, card_id).await?;

        if let Some(Some(header_id)) = request.estimate_header_id {
            self.ensure_header_in_org(organization_id, header_id).await?;
        }
        if let Some(Some(product_id)) = request.product_id {
            self.ensure_product_in_org(organization_id, product_id)
                .await?;
        }
        let status = match request.status {
            Some(status) => Some(validate_job_card_status(Some(status))?),
            None => None,
        };

        let mut active: JobCardActiveModel = card.into();
        if let Some(header_ref) = request.estimate_header_id {
            active.estimate_header_id = Set(header_ref);
        }
        if let Some(product_ref) = request.product_id {
            active.product_id = Set(product_ref);
        }
        if let Some(status) = status {
            active.status = Set(status);
        }
        if let Some(description) = request.description {
            active.description = Set(Some(description));
        }
        active.updated_at = Set(Some(Utc::now()));
        let card = active.update(&*self.db_pool).await?;

        info!(job_card_id = %card.id, "Job card updated");
        self.with_measurements(card).await
    }

    #[instrument(skip(self), fields(organization_id = %organization_id, job_card_id = %card_id))]
    pub async fn delete(
        &self,
        organization_id: Uuid,
        card_id: Uuid,
    ) -> Result<(), ServiceError> {
        let card = self.find_scoped(organization_id, card_id).await?;
        JobCardEntity::delete_by_id(card.id)
            .exec(&*self.db_pool)
            .await?;
        info!(job_card_id = %card_id, "Job card deleted");
        Ok(())
    }

    async fn find_scoped(
        &self,
        organization_id: Uuid,
        card_id: Uuid,
    ) -> Result<job_card::Model, ServiceError> {
        JobCardEntity::find_by_id(card_id)
            .filter(job_card::Column::OrganizationId.eq(organization_id))
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Job card {} not found", card_id)))
    }

    /// Headers reach their organization through the project they belong to.
    async fn ensure_header_in_org(
        &self,
        organization_id: Uuid,
        header_id: Uuid,
    ) -> Result<(), ServiceError> {
        let found = HeaderEntity::find_by_id(header_id)
            .find_also_related(project::Entity)
            .one(&*self.db_pool)
            .await?;
        match found {
            Some((_, Some(p))) if p.organization_id == organization_id => Ok(()),
            _ => Err(ServiceError::ReferenceNotFound(format!(
                "estimate_header_id {} does not exist",
                header_id
            ))),
        }
    }

    async fn ensure_product_in_org(
        &self,
        organization_id: Uuid,
        product_id: Uuid,
    ) -> Result<(), ServiceError> {
        ProductEntity::find_by_id(product_id)
            .filter(product::Column::OrganizationId.eq(organization_id))
            .one(&*self.db_pool)
            .await?
            .map(|_| ())
            .ok_or_else(|| {
                ServiceError::ReferenceNotFound(format!(
                    "product_id {} does not exist",
                    product_id
                ))
            })
    }

    /// Association is inferred from the (header, product) pair: the card
    /// matches every detail row carrying both of its references. Either
    /// reference missing means no measurements.
    async fn with_measurements(
        &self,
        card: job_card::Model,
    ) -> Result<JobCardResponse, ServiceError> {
        let measurements = match (card.estimate_header_id, card.product_id) {
            (Some(header_id), Some(product_id)) => {
                let rows = DetailEntity::find()
                    .filter(estimate_detail::Column::EstimateHeaderId.eq(header_id))
                    .filter(estimate_detail::Column::ProductId.eq(product_id))
                    .find_also_related(ProductEntity)
                    .order_by_asc(estimate_detail::Column::CreatedAt)
                    .order_by_asc(estimate_detail::Column::Id)
                    .all(&*self.db_pool)
                    .await?;
                rows.into_iter()
                    .map(|(detail, product)| detail_view(detail, product))
                    .collect()
            }
            _ => Vec::new(),
        };

        Ok(JobCardResponse {
            id: card.id,
            organization_id: card.organization_id,
            estimate_header_id: card.estimate_header_id,
            product_id: card.product_id,
            status: card.status,
            description: card.description,
            measurements,
            created_at: card.created_at,
            updated_at: card.updated_at,
        })
    }
}

fn validate_job_card_status(status: Option<String>) -> Result<String, ServiceError> {
    let status = status.unwrap_or_else(|| "pending".to_string());
    if JOB_CARD_STATUSES.contains(&status.as_str()) {
        Ok(status)
    } else {
        Err(ServiceError::InvalidStatus(format!(
            "Unknown job card status '{}'; expected one of: {}",
            status,
            JOB_CARD_STATUSES.join(", ")
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_defaults_to_pending() {
        assert_eq!(validate_job_card_status(None).unwrap(), "pending");
        assert_eq!(
            validate_job_card_status(Some("completed".into())).unwrap(),
            "completed"
        );
        assert!(validate_job_card_status(Some("done".into())).is_err());
    }

    #[test]
    fn update_payload_distinguishes_absent_and_null_references() {
        let absent: UpdateJobCardRequest = serde_json::from_str(r#"{"status":"pending"}"#).unwrap();
        assert!(absent.product_id.is_none());

        let cleared: UpdateJobCardRequest =
            serde_json::from_str(r#"{"product_id":null}"#).unwrap();
        assert_eq!(cleared.product_id, Some(None));
    }
}
