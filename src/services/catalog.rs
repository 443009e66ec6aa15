//! Reference catalogs: customers, projects and products.
//!
//! Every row is owned by an organization and every query here is scoped to
//! one. Membership checks happen in the handler layer before a service call;
//! this module only enforces that cross-entity references stay inside the
//! same organization.

use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::db::DbPool;
use crate::entities::customer::{self, ActiveModel as CustomerActiveModel, Entity as CustomerEntity};
use crate::entities::estimate_detail::{self, Entity as EstimateDetailEntity};
use crate::entities::product::{self, ActiveModel as ProductActiveModel, Entity as ProductEntity};
use crate::entities::project::{self, ActiveModel as ProjectActiveModel, Entity as ProjectEntity};
use crate::errors::ServiceError;

pub const PROJECT_STATUSES: [&str; 3] = ["active", "completed", "on_hold"];

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateCustomerRequest {
    #[validate(length(min = 1, message = "Customer name is required"))]
    pub name: String,
    #[validate(email(message = "A valid email address is required"))]
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateCustomerRequest {
    #[validate(length(min = 1, message = "Customer name must not be empty"))]
    pub name: Option<String>,
    #[validate(email(message = "A valid email address is required"))]
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateProjectRequest {
    #[validate(length(min = 1, message = "Project name is required"))]
    pub name: String,
    pub description: Option<String>,
    pub customer_id: Option<Uuid>,
    pub status: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateProjectRequest {
    #[validate(length(min = 1, message = "Project name must not be empty"))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub customer_id: Option<Uuid>,
    pub status: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, message = "Product name is required"))]
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateProductRequest {
    #[validate(length(min = 1, message = "Product name must not be empty"))]
    pub name: Option<String>,
    pub description: Option<String>,
}

/// A page of catalog rows together with the unpaginated total.
#[derive(Debug)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
}

#[derive(Clone)]
pub struct CatalogService {
    db_pool: Arc<DbPool>,
}

impl CatalogService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    // ---- customers -------------------------------------------------------

    #[instrument(skip(self), fields(organization_id = %organization_id))]
    pub async fn list_customers(
        &self,
        organization_id: Uuid,
        page: u64,
        limit: u64,
    ) -> Result<Page<customer::Model>, ServiceError> {
        let paginator = CustomerEntity::find()
            .filter(customer::Column::OrganizationId.eq(organization_id))
            .order_by_asc(customer::Column::CreatedAt)
            .paginate(&*self.db_pool, limit.max(1));

        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok(Page { items, total })
    }

    #[instrument(skip(self, request), fields(organization_id = %organization_id))]
    pub async fn create_customer(
        &self,
        organization_id: Uuid,
        request: CreateCustomerRequest,
    ) -> Result<customer::Model, ServiceError> {
        request.validate()?;

        let created = CustomerActiveModel {
            id: Set(Uuid::new_v4()),
            organization_id: Set(organization_id),
            name: Set(request.name.trim().to_string()),
            email: Set(request.email),
            phone_number: Set(request.phone_number),
            address: Set(request.address),
            ..Default::default()
        }
        .insert(&*self.db_pool)
        .await?;

        info!(customer_id = %created.id, "Customer created");
        Ok(created)
    }

    pub async fn get_customer(
        &self,
        organization_id: Uuid,
        customer_id: Uuid,
    ) -> Result<customer::Model, ServiceError> {
        CustomerEntity::find_by_id(customer_id)
            .filter(customer::Column::OrganizationId.eq(organization_id))
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Customer {} not found", customer_id)))
    }

    #[instrument(skip(self, request), fields(organization_id = %organization_id, customer_id = %customer_id))]
    pub async fn update_customer(
        &self,
        organization_id: Uuid,
        customer_id: Uuid,
        request: UpdateCustomerRequest,
    ) -> Result<customer::Model, ServiceError> {
        request.validate()?;
        let existing = self.get_customer(organization_id, customer_id).await?;

        let mut active: CustomerActiveModel = existing.into();
        if let Some(name) = request.name {
            active.name = Set(name.trim().to_string());
        }
        if let Some(email) = request.email {
            active.email = Set(Some(email));
        }
        if let Some(phone_number) = request.phone_number {
            active.phone_number = Set(Some(phone_number));
        }
        if let Some(address) = request.address {
            active.address = Set(Some(address));
        }
        active.updated_at = Set(Some(Utc::now()));

        Ok(active.update(&*self.db_pool).await?)
    }

    #[instrument(skip(self), fields(organization_id = %organization_id, customer_id = %customer_id))]
    pub async fn delete_customer(
        &self,
        organization_id: Uuid,
        customer_id: Uuid,
    ) -> Result<(), ServiceError> {
        let existing = self.get_customer(organization_id, customer_id).await?;
        existing.delete(&*self.db_pool).await?;
        info!(customer_id = %customer_id, "Customer deleted");
        Ok(())
    }

    // ---- projects --------------------------------------------------------

    #[instrument(skip(self), fields(organization_id = %organization_id))]
    pub async fn list_projects(
        &self,
        organization_id: Uuid,
        page: u64,
        limit: u64,
    ) -> Result<Page<project::Model>, ServiceError> {
        let paginator = ProjectEntity::find()
            .filter(project::Column::OrganizationId.eq(organization_id))
            .order_by_asc(project::Column::CreatedAt)
            .paginate(&*self.db_pool, limit.max(1));

        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok(Page { items, total })
    }

    #[instrument(skip(self, request), fields(organization_id = %organization_id))]
    pub async fn create_project(
        &self,
        organization_id: Uuid,
        request: CreateProjectRequest,
    ) -> Result<project::Model, ServiceError> {
        request.validate()?;

        if let Some(customer_id) = request.customer_id {
            // The customer must live in the same organization.
            self.get_customer(organization_id, customer_id)
                .await
                .map_err(|_| {
                    ServiceError::ReferenceNotFound(format!(
                        "customer_id {} does not exist in this organization",
                        customer_id
                    ))
                })?;
        }
        let status = validate_project_status(request.status)?;

        let created = ProjectActiveModel {
            id: Set(Uuid::new_v4()),
            organization_id: Set(organization_id),
            customer_id: Set(request.customer_id),
            name: Set(request.name.trim().to_string()),
            description: Set(request.description),
            status: Set(status),
            ..Default::default()
        }
        .insert(&*self.db_pool)
        .await?;

        info!(project_id = %created.id, "Project created");
        Ok(created)
    }

    pub async fn get_project(
        &self,
        organization_id: Uuid,
        project_id: Uuid,
    ) -> Result<project::Model, ServiceError> {
        ProjectEntity::find_by_id(project_id)
            .filter(project::Column::OrganizationId.eq(organization_id))
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Project {} not found", project_id)))
    }

    #[instrument(skip(self, request), fields(organization_id = %organization_id, project_id = %project_id))]
    pub async fn update_project(
        &self,
        organization_id: Uuid,
        project_id: Uuid,
        request: UpdateProjectRequest,
    ) -> Result<project::Model, ServiceError> {
        request.validate()?;
        let existing = self.get_project(organization_id, project_id).await?;

        if let Some(customer_id) = request.customer_id {
            self.get_customer(organization_id, customer_id)
                .await
                .map_err(|_| {
                    ServiceError::ReferenceNotFound(format!(
                        "customer_id {} does not exist in this organization",
                        customer_id
                    ))
                })?;
        }

        let mut active: ProjectActiveModel = existing.into();
        if let Some(name) = request.name {
            active.name = Set(name.trim().to_string());
        }
        if let Some(description) = request.description {
            active.description = Set(Some(description));
        }
        if let Some(customer_id) = request.customer_id {
            active.customer_id = Set(Some(customer_id));
        }
        if let Some(status) = request.status {
            active.status = Set(validate_project_status(Some(status))?);
        }
        active.updated_at = Set(Some(Utc::now()));

        Ok(active.update(&*self.db_pool).await?)
    }

    #[instrument(skip(self), fields(organization_id = %organization_id, project_id = %project_id))]
    pub async fn delete_project(
        &self,
        organization_id: Uuid,
        project_id: Uuid,
    ) -> Result<(), ServiceError> {
        let existing = self.get_project(organization_id, project_id).await?;
        existing.delete(&*self.db_pool).await?;
        info!(project_id = %project_id, "Project deleted");
        Ok(())
    }

    // ---- products --------------------------------------------------------

    #[instrument(skip(self), fields(organization_id = %organization_id))]
    pub async fn list_products(
        &self,
        organization_id: Uuid,
        page: u64,
        limit: u64,
    ) -> Result<Page<product::Model>, ServiceError> {
        let paginator = ProductEntity::find()
            .filter(product::Column::OrganizationId.eq(organization_id))
            .order_by_asc(product::Column::CreatedAt)
            .paginate(&*self.db_pool, limit.max(1));

        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok(Page { items, total })
    }

    #[instrument(skip(self, request), fields(organization_id = %organization_id))]
    pub async fn create_product(
        &self,
        organization_id: Uuid,
        request: CreateProductRequest,
    ) -> Result<product::Model, ServiceError> {
        request.validate()?;

        let created = ProductActiveModel {
            id: Set(Uuid::new_v4()),
            organization_id: Set(organization_id),
            name: Set(request.name.trim().to_string()),
            description: Set(request.description),
            ..Default::default()
        }
        .insert(&*self.db_pool)
        .await?;

        info!(product_id = %created.id, "Product created");
        Ok(created)
    }

    pub async fn get_product(
        &self,
        organization_id: Uuid,
        product_id: Uuid,
    ) -> Result<product::Model, ServiceError> {
        ProductEntity::find_by_id(product_id)
            .filter(product::Column::OrganizationId.eq(organization_id))
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", product_id)))
    }

    #[instrument(skip(self, request), fields(organization_id = %organization_id, product_id = %product_id))]
    pub async fn update_product(
        &self,
        organization_id: Uuid,
        product_id: Uuid,
        request: UpdateProductRequest,
    ) -> Result<product::Model, ServiceError> {
        request.validate()?;
        let existing = self.get_product(organization_id, product_id).await?;

        let mut active: ProductActiveModel = existing.into();
        if let Some(name) = request.name {
            active.name = Set(name.trim().to_string());
        }
        if let Some(description) = request.description {
            active.description = Set(Some(description));
        }
        active.updated_at = Set(Some(Utc::now()));

        Ok(active.update(&*self.db_pool).await?)
    }

    /// Delete a product, refused while estimate details still reference it.
    #[instrument(skip(self), fields(organization_id = %organization_id, product_id = %product_id))]
    pub async fn delete_product(
        &self,
        organization_id: Uuid,
        product_id: Uuid,
    ) -> Result<(), ServiceError> {
        let existing = self.get_product(organization_id, product_id).await?;

        let references = EstimateDetailEntity::find()
            .filter(estimate_detail::Column::ProductId.eq(product_id))
            .count(&*self.db_pool)
            .await?;
        if references > 0 {
            return Err(ServiceError::ValidationError(format!(
                "Product {} is referenced by {} estimate detail(s) and cannot be deleted",
                product_id, references
            )));
        }

        existing.delete(&*self.db_pool).await?;
        info!(product_id = %product_id, "Product deleted");
        Ok(())
    }
}

fn validate_project_status(status: Option<String>) -> Result<String, ServiceError> {
    let status = status.unwrap_or_else(|| "active".to_string());
    if PROJECT_STATUSES.contains(&status.as_str()) {
        Ok(status)
    } else {
        Err(ServiceError::InvalidStatus(format!(
            "Unknown project status '{}'; expected one of: {}",
            status,
            PROJECT_STATUSES.join(", ")
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_status_defaults_to_active() {
        assert_eq!(validate_project_status(None).unwrap(), "active");
    }

    #[test]
    fn project_status_rejects_unknown_values() {
        assert!(validate_project_status(Some("cancelled".into())).is_err());
    }

    #[test]
    fn customer_request_rejects_empty_name() {
        let request = CreateCustomerRequest {
            name: "".into(),
            email: None,
            phone_number: None,
            address: None,
        };
        assert!(request.validate().is_err());
    }
}
