use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Timber API",
        version = "1.0.0",
        description = r#"
# Timber API

Backend for a woodworking shop. Multi-tenant: users belong to organizations,
and every catalog row, estimate and job card is scoped to one organization.

## Features

- **Accounts**: registration with email verification, password reset, JWT auth
- **Organizations**: role-based membership (owner/admin/member), subscriptions
- **Catalogs**: per-organization customers, projects and products
- **Estimates**: header + ordered component line items, written as one unit
- **Job cards**: shop-floor tickets with measurements derived from estimates

## Authentication

All endpoints except registration, login, email verification, password reset
and `/health` require a bearer token:

```
Authorization: Bearer <your-jwt-token>
```

## Pagination

List endpoints accept `page` (default 1) and `limit` (default 20).
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "estimates", description = "Estimate aggregate endpoints"),
    ),
    paths(
        crate::handlers::estimates::list_estimates,
        crate::handlers::estimates::get_estimate,
        crate::handlers::estimates::create_estimate,
        crate::handlers::estimates::update_estimate,
        crate::handlers::estimates::delete_estimate,
    ),
    components(
        schemas(
            // Common types
            crate::ApiResponse<serde_json::Value>,
            crate::PaginatedResponse<serde_json::Value>,
            crate::ListQuery,

            // Accounts
            crate::handlers::auth::UserView,
            crate::handlers::auth::AuthResponse,
            crate::handlers::auth::MessageResponse,
            crate::services::users::RegisterRequest,
            crate::services::users::LoginRequest,
            crate::services::users::UpdateProfileRequest,
            crate::services::users::PasswordResetRequest,
            crate::services::users::PasswordResetConfirmRequest,
            crate::services::users::PasswordChangeRequest,

            // Organizations
            crate::services::organizations::CreateOrganizationRequest,
            crate::services::organizations::UpdateOrganizationRequest,
            crate::services::organizations::CreateSubscriptionRequest,
            crate::services::organizations::OrganizationResponse,
            crate::services::organizations::MemberResponse,

            // Catalogs
            crate::services::catalog::CreateCustomerRequest,
            crate::services::catalog::UpdateCustomerRequest,
            crate::services::catalog::CreateProjectRequest,
            crate::services::catalog::UpdateProjectRequest,
            crate::services::catalog::CreateProductRequest,
            crate::services::catalog::UpdateProductRequest,

            // Estimates
            crate::services::estimates::CreateEstimateRequest,
            crate::services::estimates::CreateEstimateDetail,
            crate::services::estimates::UpdateEstimateRequest,
            crate::services::estimates::UpdateEstimateDetail,
            crate::services::estimates::EstimateHeaderResponse,
            crate::services::estimates::EstimateDetailView,
            crate::services::estimates::EstimateWithDetailsResponse,
            crate::handlers::estimates::EstimateUpdateResponse,

            // Job cards
            crate::services::job_cards::CreateJobCardRequest,
            crate::services::job_cards::UpdateJobCardRequest,
            crate::services::job_cards::JobCardResponse,

            // Statistics
            crate::services::statistics::GlobalCounts,
            crate::services::statistics::GlobalStatistics,
            crate::services::statistics::UserInfo,
            crate::services::statistics::UserStatistics,
            crate::services::statistics::StatisticsResponse,

            // Error types
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDocV1;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/api/docs")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}
