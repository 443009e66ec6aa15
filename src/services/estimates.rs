//! The estimate aggregate manager.
//!
//! An [`crate::entities::estimate_header`] row and its ordered
//! [`crate::entities::estimate_detail`] children form one consistency unit:
//! details are only ever written through the header's create and update
//! operations, and every multi-row write runs inside a single transaction.
//!
//! Update semantics are two-mode: a payload without a `details` key touches
//! only header scalars, while a payload with `details` destructively replaces
//! the whole child collection (delete-by-header then bulk insert, never
//! per-row diffing).

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::DbPool;
use crate::entities::estimate_detail::{
    self, ActiveModel as DetailActiveModel, Entity as DetailEntity,
};
use crate::entities::estimate_header::{
    self, ActiveModel as HeaderActiveModel, Entity as HeaderEntity,
};
use crate::entities::product::{self, Entity as ProductEntity};
use crate::entities::project::{self, Entity as ProjectEntity};
use crate::errors::ServiceError;
use crate::services::catalog::Page;

pub const ESTIMATE_STATUSES: [&str; 4] = ["draft", "sent", "approved", "rejected"];

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateEstimateRequest {
    pub project_id: Uuid,
    pub status: Option<String>,
    #[serde(default)]
    pub transport_handling_cost: Decimal,
    #[serde(default)]
    pub discount: Decimal,
    #[serde(default)]
    pub approximate_tax: Decimal,
    #[serde(default)]
    pub estimated_total: Decimal,
    pub description: Option<String>,
    pub additional_notes: Option<String>,
    #[serde(default)]
    pub details: Vec<CreateEstimateDetail>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateEstimateDetail {
    pub product_id: Uuid,
    #[serde(default)]
    pub component_name: String,
    #[serde(default)]
    pub overall_length: Decimal,
    #[serde(default)]
    pub overall_breadth: Decimal,
    #[serde(default)]
    pub overall_height: Decimal,
    #[serde(default)]
    pub labor_charges: Decimal,
    #[serde(default)]
    pub polishing_charges: Decimal,
    #[serde(default)]
    pub component_length: Decimal,
    #[serde(default)]
    pub component_breadth: Decimal,
    #[serde(default)]
    pub component_thickness: Decimal,
    #[serde(default)]
    pub component_cft: Decimal,
    #[serde(default)]
    pub component_cost_per_cft: Decimal,
}

/// Update payload. The presence of the `details` key selects the mode:
/// absent leaves the child collection untouched, present (even empty)
/// replaces it wholesale.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateEstimateRequest {
    pub project_id: Option<Uuid>,
    pub status: Option<String>,
    pub transport_handling_cost: Option<Decimal>,
    pub discount: Option<Decimal>,
    pub approximate_tax: Option<Decimal>,
    pub estimated_total: Option<Decimal>,
    pub description: Option<String>,
    pub additional_notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<UpdateEstimateDetail>>,
}

/// Incoming detail for the replace mode. An item without a `product_id` is
/// skipped (and reported), preserving the lenient write contract for sparse
/// spreadsheet-style payloads.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateEstimateDetail {
    pub product_id: Option<Uuid>,
    #[serde(default)]
    pub component_name: String,
    #[serde(default)]
    pub overall_length: Decimal,
    #[serde(default)]
    pub overall_breadth: Decimal,
    #[serde(default)]
    pub overall_height: Decimal,
    #[serde(default)]
    pub labor_charges: Decimal,
    #[serde(default)]
    pub polishing_charges: Decimal,
    #[serde(default)]
    pub component_length: Decimal,
    #[serde(default)]
    pub component_breadth: Decimal,
    #[serde(default)]
    pub component_thickness: Decimal,
    #[serde(default)]
    pub component_cft: Decimal,
    #[serde(default)]
    pub component_cost_per_cft: Decimal,
}

/// Flat header projection with the project name denormalized.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EstimateHeaderResponse {
    pub id: Uuid,
    pub project_id: Uuid,
    pub project_name: String,
    pub status: String,
    pub transport_handling_cost: Decimal,
    pub discount: Decimal,
    pub approximate_tax: Decimal,
    pub estimated_total: Decimal,
    pub description: Option<String>,
    pub additional_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Read projection of one detail row, used both under the header view and as
/// the job-card measurement view.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EstimateDetailView {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub component_name: String,
    pub component_length: Decimal,
    pub component_breadth: Decimal,
    pub component_thickness: Decimal,
    pub component_cft: Decimal,
    pub component_cost_per_cft: Decimal,
    pub labor_charges: Decimal,
    pub polishing_charges: Decimal,
    pub overall_length: Decimal,
    pub overall_breadth: Decimal,
    pub overall_height: Decimal,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EstimateWithDetailsResponse {
    #[serde(flatten)]
    pub header: EstimateHeaderResponse,
    pub details: Vec<EstimateDetailView>,
}

/// Result of an aggregate update: the re-read aggregate plus how many
/// incoming detail items were dropped for lacking a product reference.
#[derive(Debug)]
pub struct UpdateOutcome {
    pub estimate: EstimateWithDetailsResponse,
    pub skipped_details: usize,
}

#[derive(Clone)]
pub struct EstimateService {
    db_pool: Arc<DbPool>,
}

impl EstimateService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Create a header together with a non-empty ordered detail list.
    ///
    /// Validation is all-or-nothing and runs in a fixed order before any
    /// write: project reference, non-empty collection, per-item product
    /// references, per-item charge bounds. On success one transaction
    /// persists the header and all details in input order. The response
    /// echoes the header only; the nested collection is read back with
    /// [`get`](Self::get).
    #[instrument(skip(self, request), fields(organization_id = %organization_id, project_id = %request.project_id))]
    pub async fn create(
        &self,
        organization_id: Uuid,
        request: CreateEstimateRequest,
    ) -> Result<EstimateHeaderResponse, ServiceError> {
        let db = &*self.db_pool;

        let project = self
            .resolve_project(organization_id, request.project_id, "project_id")
            .await?;

        if request.details.is_empty() {
            return Err(ServiceError::ValidationError(
                "details must contain at least one item".to_string(),
            ));
        }

        let mut products = Vec::with_capacity(request.details.len());
        for (index, detail) in request.details.iter().enumerate() {
            let product = self
                .resolve_product(organization_id, detail.product_id, index)
                .await?;
            products.push(product);
        }

        for (index, detail) in request.details.iter().enumerate() {
            validate_detail_charges(index, detail.component_cft, detail.component_cost_per_cft)?;
            validate_detail_dimensions(index, detail_dimensions(detail))?;
        }

        let status = validate_estimate_status(request.status)?;
        validate_header_amounts(&[
            ("transport_handling_cost", request.transport_handling_cost),
            ("discount", request.discount),
            ("approximate_tax", request.approximate_tax),
            ("estimated_total", request.estimated_total),
        ])?;

        let header_id = Uuid::new_v4();
        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, "Failed to start transaction for estimate creation");
            ServiceError::DatabaseError(e)
        })?;

        let header = HeaderActiveModel {
            id: Set(header_id),
            project_id: Set(project.id),
            status: Set(status),
            transport_handling_cost: Set(request.transport_handling_cost),
            discount: Set(request.discount),
            approximate_tax: Set(request.approximate_tax),
            estimated_total: Set(request.estimated_total),
            description: Set(request.description),
            additional_notes: Set(request.additional_notes),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        insert_details_in_order(&txn, header_id, request.details.iter().map(detail_fields)).await?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, estimate_header_id = %header_id, "Failed to commit estimate creation");
            ServiceError::DatabaseError(e)
        })?;

        info!(estimate_header_id = %header_id, detail_count = request.details.len(), "Estimate created");
        Ok(header_response(header, project.name))
    }

    /// Header-with-details projection for a single estimate.
    #[instrument(skip(self), fields(organization_id = %organization_id, estimate_header_id = %header_id))]
    pub async fn get(
        &self,
        organization_id: Uuid,
        header_id: Uuid,
    ) -> Result<EstimateWithDetailsResponse, ServiceError> {
        let (header, project) = self.find_scoped(organization_id, header_id).await?;
        self.read_aggregate(header, project).await
    }

    /// Flat header views for an organization, newest last.
    #[instrument(skip(self), fields(organization_id = %organization_id))]
    pub async fn list(
        &self,
        organization_id: Uuid,
        page: u64,
        limit: u64,
    ) -> Result<Page<EstimateHeaderResponse>, ServiceError> {
        let paginator = HeaderEntity::find()
            .find_also_related(ProjectEntity)
            .filter(project::Column::OrganizationId.eq(organization_id))
            .order_by_asc(estimate_header::Column::CreatedAt)
            .paginate(&*self.db_pool, limit.max(1));

        let total = paginator.num_items().await?;
        let rows = paginator.fetch_page(page.saturating_sub(1)).await?;

        let items = rows
            .into_iter()
            .map(|(header, project)| {
                let project_name = project.map(|p| p.name).unwrap_or_default();
                header_response(header, project_name)
            })
            .collect();
        Ok(Page { items, total })
    }

    /// Partial update of the aggregate, mode selected by the `details` key.
    ///
    /// All validation runs before any mutation. In aggregate mode the child
    /// collection is replaced wholesale inside the same transaction as the
    /// header update: delete all rows for the header, then insert one row
    /// per incoming item that carries a product reference, in input order.
    /// Items without a product reference are dropped and counted in the
    /// returned outcome.
    #[instrument(skip(self, request), fields(organization_id = %organization_id, estimate_header_id = %header_id))]
    pub async fn update(
        &self,
        organization_id: Uuid,
        header_id: Uuid,
        request: UpdateEstimateRequest,
    ) -> Result<UpdateOutcome, ServiceError> {
        let db = &*self.db_pool;
        let (header, current_project) = self.find_scoped(organization_id, header_id).await?;

        // A re-parenting project reference is validated before anything else
        // is touched.
        let project = match request.project_id {
            Some(project_id) => {
                self.resolve_project(organization_id, project_id, "project_id")
                    .await?
            }
            None => current_project,
        };

        let status = match request.status {
            Some(status) => Some(validate_estimate_status(Some(status))?),
            None => None,
        };
        let provided_amounts: Vec<(&str, Decimal)> = [
            ("transport_handling_cost", request.transport_handling_cost),
            ("discount", request.discount),
            ("approximate_tax", request.approximate_tax),
            ("estimated_total", request.estimated_total),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.map(|v| (name, v)))
        .collect();
        validate_header_amounts(&provided_amounts)?;

        // Pre-validate the replacement collection so a bad item aborts
        // before the destructive delete.
        let mut skipped_details = 0usize;
        let mut replacement: Vec<DetailFields> = Vec::new();
        if let Some(details) = &request.details {
            for (index, item) in details.iter().enumerate() {
                let Some(product_id) = item.product_id else {
                    skipped_details += 1;
                    continue;
                };
                self.resolve_product(organization_id, product_id, index)
                    .await?;
                validate_detail_charges(index, item.component_cft, item.component_cost_per_cft)?;
                validate_detail_dimensions(
                    index,
                    [
                        ("overall_length", item.overall_length),
                        ("overall_breadth", item.overall_breadth),
                        ("overall_height", item.overall_height),
                        ("labor_charges", item.labor_charges),
                        ("polishing_charges", item.polishing_charges),
                        ("component_length", item.component_length),
                        ("component_breadth", item.component_breadth),
                        ("component_thickness", item.component_thickness),
                    ],
                )?;
                replacement.push(DetailFields {
                    product_id,
                    component_name: item.component_name.clone(),
                    overall_length: item.overall_length,
                    overall_breadth: item.overall_breadth,
                    overall_height: item.overall_height,
                    labor_charges: item.labor_charges,
                    polishing_charges: item.polishing_charges,
                    component_length: item.component_length,
                    component_breadth: item.component_breadth,
                    component_thickness: item.component_thickness,
                    component_cft: item.component_cft,
                    component_cost_per_cft: item.component_cost_per_cft,
                });
            }
        }
        let replace_details = request.details.is_some();

        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, "Failed to start transaction for estimate update");
            ServiceError::DatabaseError(e)
        })?;

        let mut active: HeaderActiveModel = header.into();
        if request.project_id.is_some() {
            active.project_id = Set(project.id);
        }
        if let Some(status) = status {
            active.status = Set(status);
        }
        if let Some(value) = request.transport_handling_cost {
            active.transport_handling_cost = Set(value);
        }
        if let Some(value) = request.discount {
            active.discount = Set(value);
        }
        if let Some(value) = request.approximate_tax {
            active.approximate_tax = Set(value);
        }
        if let Some(value) = request.estimated_total {
            active.estimated_total = Set(value);
        }
        if let Some(description) = request.description {
            active.description = Set(Some(description));
        }
        if let Some(notes) = request.additional_notes {
            active.additional_notes = Set(Some(notes));
        }
        active.updated_at = Set(Some(Utc::now()));
        let header = active.update(&txn).await?;

        if replace_details {
            DetailEntity::delete_many()
                .filter(estimate_detail::Column::EstimateHeaderId.eq(header_id))
                .exec(&txn)
                .await?;
            insert_details_in_order(&txn, header_id, replacement.into_iter()).await?;
        }

        txn.commit().await.map_err(|e| {
            error!(error = %e, estimate_header_id = %header_id, "Failed to commit estimate update");
            ServiceError::DatabaseError(e)
        })?;

        info!(
            estimate_header_id = %header_id,
            replaced_details = replace_details,
            skipped_details,
            "Estimate updated"
        );

        let estimate = self.read_aggregate(header, project).await?;
        Ok(UpdateOutcome {
            estimate,
            skipped_details,
        })
    }

    /// Delete a header and, with it, every detail it owns.
    #[instrument(skip(self), fields(organization_id = %organization_id, estimate_header_id = %header_id))]
    pub async fn delete(
        &self,
        organization_id: Uuid,
        header_id: Uuid,
    ) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        let (header, _) = self.find_scoped(organization_id, header_id).await?;

        let txn = db.begin().await.map_err(ServiceError::DatabaseError)?;
        DetailEntity::delete_many()
            .filter(estimate_detail::Column::EstimateHeaderId.eq(header_id))
            .exec(&txn)
            .await?;
        HeaderEntity::delete_by_id(header.id).exec(&txn).await?;
        txn.commit().await.map_err(ServiceError::DatabaseError)?;

        info!(estimate_header_id = %header_id, "Estimate deleted");
        Ok(())
    }

    async fn read_aggregate(
        &self,
        header: estimate_header::Model,
        project: project::Model,
    ) -> Result<EstimateWithDetailsResponse, ServiceError> {
        let rows = DetailEntity::find()
            .filter(estimate_detail::Column::EstimateHeaderId.eq(header.id))
            .find_also_related(ProductEntity)
            .order_by_asc(estimate_detail::Column::CreatedAt)
            .order_by_asc(estimate_detail::Column::Id)
            .all(&*self.db_pool)
            .await?;

        let details = rows
            .into_iter()
            .map(|(detail, product)| detail_view(detail, product))
            .collect();

        Ok(EstimateWithDetailsResponse {
            header: header_response(header, project.name),
            details,
        })
    }

    /// A header addressed through an organization the caller belongs to.
    /// Headers hanging off another organization's project read as absent.
    async fn find_scoped(
        &self,
        organization_id: Uuid,
        header_id: Uuid,
    ) -> Result<(estimate_header::Model, project::Model), ServiceError> {
        let not_found =
            || ServiceError::NotFound(format!("Estimate header {} not found", header_id));

        let (header, project) = HeaderEntity::find_by_id(header_id)
            .find_also_related(ProjectEntity)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(not_found)?;

        match project {
            Some(project) if project.organization_id == organization_id => Ok((header, project)),
            _ => Err(not_found()),
        }
    }

    async fn resolve_project(
        &self,
        organization_id: Uuid,
        project_id: Uuid,
        field: &str,
    ) -> Result<project::Model, ServiceError> {
        ProjectEntity::find_by_id(project_id)
            .filter(project::Column::OrganizationId.eq(organization_id))
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| {
                ServiceError::ReferenceNotFound(format!("{} {} does not exist", field, project_id))
            })
    }

    async fn resolve_product(
        &self,
        organization_id: Uuid,
        product_id: Uuid,
        index: usize,
    ) -> Result<product::Model, ServiceError> {
        ProductEntity::find_by_id(product_id)
            .filter(product::Column::OrganizationId.eq(organization_id))
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| {
                ServiceError::ReferenceNotFound(format!(
                    "details[{}].product_id {} does not exist",
                    index, product_id
                ))
            })
    }
}

/// Field set shared by both write paths when inserting detail rows.
struct DetailFields {
    product_id: Uuid,
    component_name: String,
    overall_length: Decimal,
    overall_breadth: Decimal,
    overall_height: Decimal,
    labor_charges: Decimal,
    polishing_charges: Decimal,
    component_length: Decimal,
    component_breadth: Decimal,
    component_thickness: Decimal,
    component_cft: Decimal,
    component_cost_per_cft: Decimal,
}

fn detail_fields(detail: &CreateEstimateDetail) -> DetailFields {
    DetailFields {
        product_id: detail.product_id,
        component_name: detail.component_name.clone(),
        overall_length: detail.overall_length,
        overall_breadth: detail.overall_breadth,
        overall_height: detail.overall_height,
        labor_charges: detail.labor_charges,
        polishing_charges: detail.polishing_charges,
        component_length: detail.component_length,
        component_breadth: detail.component_breadth,
        component_thickness: detail.component_thickness,
        component_cft: detail.component_cft,
        component_cost_per_cft: detail.component_cost_per_cft,
    }
}

fn detail_dimensions(detail: &CreateEstimateDetail) -> [(&'static str, Decimal); 8] {
    [
        ("overall_length", detail.overall_length),
        ("overall_breadth", detail.overall_breadth),
        ("overall_height", detail.overall_height),
        ("labor_charges", detail.labor_charges),
        ("polishing_charges", detail.polishing_charges),
        ("component_length", detail.component_length),
        ("component_breadth", detail.component_breadth),
        ("component_thickness", detail.component_thickness),
    ]
}

/// Insert detail rows with staggered timestamps so the (created_at, id)
/// display ordering reproduces the input order exactly.
async fn insert_details_in_order(
    txn: &DatabaseTransaction,
    header_id: Uuid,
    details: impl Iterator<Item = DetailFields>,
) -> Result<(), ServiceError> {
    let base = Utc::now();
    for (index, fields) in details.enumerate() {
        DetailActiveModel {
            id: Set(Uuid::new_v4()),
            estimate_header_id: Set(header_id),
            product_id: Set(fields.product_id),
            component_name: Set(fields.component_name),
            overall_length: Set(fields.overall_length),
            overall_breadth: Set(fields.overall_breadth),
            overall_height: Set(fields.overall_height),
            labor_charges: Set(fields.labor_charges),
            polishing_charges: Set(fields.polishing_charges),
            component_length: Set(fields.component_length),
            component_breadth: Set(fields.component_breadth),
            component_thickness: Set(fields.component_thickness),
            component_cft: Set(fields.component_cft),
            component_cost_per_cft: Set(fields.component_cost_per_cft),
            created_at: Set(base + Duration::microseconds(index as i64)),
            ..Default::default()
        }
        .insert(txn)
        .await?;
    }
    Ok(())
}

fn header_response(header: estimate_header::Model, project_name: String) -> EstimateHeaderResponse {
    EstimateHeaderResponse {
        id: header.id,
        project_id: header.project_id,
        project_name,
        status: header.status,
        transport_handling_cost: header.transport_handling_cost,
        discount: header.discount,
        approximate_tax: header.approximate_tax,
        estimated_total: header.estimated_total,
        description: header.description,
        additional_notes: header.additional_notes,
        created_at: header.created_at,
        updated_at: header.updated_at,
    }
}

pub(crate) fn detail_view(
    detail: estimate_detail::Model,
    product: Option<product::Model>,
) -> EstimateDetailView {
    EstimateDetailView {
        id: detail.id,
        product_id: detail.product_id,
        product_name: product.map(|p| p.name).unwrap_or_default(),
        component_name: detail.component_name,
        component_length: detail.component_length,
        component_breadth: detail.component_breadth,
        component_thickness: detail.component_thickness,
        component_cft: detail.component_cft,
        component_cost_per_cft: detail.component_cost_per_cft,
        labor_charges: detail.labor_charges,
        polishing_charges: detail.polishing_charges,
        overall_length: detail.overall_length,
        overall_breadth: detail.overall_breadth,
        overall_height: detail.overall_height,
    }
}

fn validate_estimate_status(status: Option<String>) -> Result<String, ServiceError> {
    let status = status.unwrap_or_else(|| "draft".to_string());
    if ESTIMATE_STATUSES.contains(&status.as_str()) {
        Ok(status)
    } else {
        Err(ServiceError::InvalidStatus(format!(
            "Unknown estimate status '{}'; expected one of: {}",
            status,
            ESTIMATE_STATUSES.join(", ")
        )))
    }
}

/// The enforced bound for the volume and rate fields is `>= 0`: zero is a
/// legitimate value for a component that has not been priced yet.
fn validate_detail_charges(
    index: usize,
    component_cft: Decimal,
    component_cost_per_cft: Decimal,
) -> Result<(), ServiceError> {
    if component_cft < Decimal::ZERO {
        return Err(ServiceError::ValidationError(format!(
            "details[{}].component_cft must not be negative",
            index
        )));
    }
    if component_cost_per_cft < Decimal::ZERO {
        return Err(ServiceError::ValidationError(format!(
            "details[{}].component_cost_per_cft must not be negative",
            index
        )));
    }
    Ok(())
}

fn validate_detail_dimensions(
    index: usize,
    fields: [(&str, Decimal); 8],
) -> Result<(), ServiceError> {
    for (name, value) in fields {
        if value < Decimal::ZERO {
            return Err(ServiceError::ValidationError(format!(
                "details[{}].{} must not be negative",
                index, name
            )));
        }
    }
    Ok(())
}

fn validate_header_amounts(amounts: &[(&str, Decimal)]) -> Result<(), ServiceError> {
    for (name, value) in amounts {
        if *value < Decimal::ZERO {
            return Err(ServiceError::ValidationError(format!(
                "{} must not be negative",
                name
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn zero_cft_is_accepted() {
        assert!(validate_detail_charges(0, Decimal::ZERO, Decimal::ZERO).is_ok());
    }

    #[test]
    fn negative_cft_is_rejected_with_item_index() {
        let err = validate_detail_charges(2, dec!(-0.01), Decimal::ZERO).unwrap_err();
        assert!(err
            .to_string()
            .contains("details[2].component_cft must not be negative"));
    }

    #[test]
    fn negative_cost_per_cft_is_rejected() {
        let err = validate_detail_charges(0, Decimal::ZERO, dec!(-1)).unwrap_err();
        assert!(err.to_string().contains("component_cost_per_cft"));
    }

    #[test]
    fn status_defaults_to_draft() {
        assert_eq!(validate_estimate_status(None).unwrap(), "draft");
        assert!(validate_estimate_status(Some("finalized".into())).is_err());
    }

    #[test]
    fn negative_header_amount_is_rejected() {
        let err = validate_header_amounts(&[("discount", dec!(-5))]).unwrap_err();
        assert!(err.to_string().contains("discount must not be negative"));
    }

    #[test]
    fn update_payload_distinguishes_missing_and_empty_details() {
        let without: UpdateEstimateRequest = serde_json::from_str(r#"{"status":"sent"}"#).unwrap();
        assert!(without.details.is_none());

        let with_empty: UpdateEstimateRequest =
            serde_json::from_str(r#"{"details":[]}"#).unwrap();
        assert_eq!(with_empty.details.as_deref().map(|d| d.len()), Some(0));
    }
}
