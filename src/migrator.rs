use anyhow::Result;
use sea_orm::{ConnectOptions, Database};
use sea_orm_migration::prelude::*;
use std::time::Duration;
use tracing::{error, info};

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_users_table::Migration),
            Box::new(m20240101_000002_create_organizations_table::Migration),
            Box::new(m20240101_000003_create_organization_members_table::Migration),
            Box::new(m20240101_000004_create_subscriptions_table::Migration),
            Box::new(m20240101_000005_create_customers_table::Migration),
            Box::new(m20240101_000006_create_projects_table::Migration),
            Box::new(m20240101_000007_create_products_table::Migration),
            Box::new(m20240101_000008_create_estimate_headers_table::Migration),
            Box::new(m20240101_000009_create_estimate_details_table::Migration),
            Box::new(m20240101_000010_create_job_cards_table::Migration),
        ]
    }
}

mod m20240101_000001_create_users_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_users_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // Create users table
            manager
                .create_table(
                    Table::create()
                        .table(Users::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Users::Id).uuid().primary_key().not_null())
                        .col(
                            ColumnDef::new(Users::Username)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(Users::Email)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                        .col(ColumnDef::new(Users::FirstName).string().null())
                        .col(ColumnDef::new(Users::LastName).string().null())
                        .col(ColumnDef::new(Users::PhoneNumber).string().null())
                        .col(
                            ColumnDef::new(Users::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(Users::IsEmailVerified)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(ColumnDef::new(Users::EmailVerificationToken).uuid().null())
                        .col(ColumnDef::new(Users::PasswordResetToken).uuid().null())
                        .col(ColumnDef::new(Users::PasswordResetExpires).timestamp().null())
                        .col(ColumnDef::new(Users::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Users::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_users_email_verification_token")
                        .table(Users::Table)
                        .col(Users::EmailVerificationToken)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_users_password_reset_token")
                        .table(Users::Table)
                        .col(Users::PasswordResetToken)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // Drop users table
            manager
                .drop_table(Table::drop().table(Users::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Users {
        Table,
        Id,
        Username,
        Email,
        PasswordHash,
        FirstName,
        LastName,
        PhoneNumber,
        IsActive,
        IsEmailVerified,
        EmailVerificationToken,
        PasswordResetToken,
        PasswordResetExpires,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000002_create_organizations_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_organizations_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // Create organizations table
            manager
                .create_table(
                    Table::create()
                        .table(Organizations::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Organizations::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Organizations::Name)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Organizations::Description).string().null())
                        .col(ColumnDef::new(Organizations::CreatedBy).uuid().null())
                        .col(
                            ColumnDef::new(Organizations::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(Organizations::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Organizations::UpdatedAt).timestamp().null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_organizations_created_by")
                                .from(Organizations::Table, Organizations::CreatedBy)
                                .to(Users::Table, Users::Id)
                                .on_delete(ForeignKeyAction::SetNull)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_organizations_created_by")
                        .table(Organizations::Table)
                        .col(Organizations::CreatedBy)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // Drop organizations table
            manager
                .drop_table(Table::drop().table(Organizations::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Organizations {
        Table,
        Id,
        Name,
        Description,
        CreatedBy,
        IsActive,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Users {
        Table,
        Id,
    }
}

mod m20240101_000003_create_organization_members_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_organization_members_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // Create organization_members table
            manager
                .create_table(
                    Table::create()
                        .table(OrganizationMembers::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(OrganizationMembers::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(OrganizationMembers::OrganizationId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(OrganizationMembers::UserId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(OrganizationMembers::Role)
                                .string()
                                .not_null()
                                .default("member"),
                        )
                        .col(
                            ColumnDef::new(OrganizationMembers::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(OrganizationMembers::JoinedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_organization_members_organization_id")
                                .from(
                                    OrganizationMembers::Table,
                                    OrganizationMembers::OrganizationId,
                                )
                                .to(Organizations::Table, Organizations::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_organization_members_user_id")
                                .from(OrganizationMembers::Table, OrganizationMembers::UserId)
                                .to(Users::Table, Users::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            // One membership row per (organization, user) pair
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_organization_members_org_user")
                        .table(OrganizationMembers::Table)
                        .col(OrganizationMembers::OrganizationId)
                        .col(OrganizationMembers::UserId)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_organization_members_user_id")
                        .table(OrganizationMembers::Table)
                        .col(OrganizationMembers::UserId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // Drop organization_members table
            manager
                .drop_table(Table::drop().table(OrganizationMembers::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum OrganizationMembers {
        Table,
        Id,
        OrganizationId,
        UserId,
        Role,
        IsActive,
        JoinedAt,
    }

    #[derive(DeriveIden)]
    enum Organizations {
        Table,
        Id,
    }

    #[derive(DeriveIden)]
    enum Users {
        Table,
        Id,
    }
}

mod m20240101_000004_create_subscriptions_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000004_create_subscriptions_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // Create subscriptions table
            manager
                .create_table(
                    Table::create()
                        .table(Subscriptions::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Subscriptions::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Subscriptions::OrganizationId)
                                .uuid()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Subscriptions::PlanName).string().not_null())
                        .col(
                            ColumnDef::new(Subscriptions::HasExpired)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(Subscriptions::StartedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Subscriptions::UpdatedAt).timestamp().null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_subscriptions_organization_id")
                                .from(Subscriptions::Table, Subscriptions::OrganizationId)
                                .to(Organizations::Table, Organizations::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_subscriptions_organization_id")
                        .table(Subscriptions::Table)
                        .col(Subscriptions::OrganizationId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // Drop subscriptions table
            manager
                .drop_table(Table::drop().table(Subscriptions::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Subscriptions {
        Table,
        Id,
        OrganizationId,
        PlanName,
        HasExpired,
        StartedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Organizations {
        Table,
        Id,
    }
}

mod m20240101_000005_create_customers_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000005_create_customers_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // Create customers table
            manager
                .create_table(
                    Table::create()
                        .table(Customers::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Customers::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Customers::OrganizationId).uuid().not_null())
                        .col(ColumnDef::new(Customers::Name).string().not_null())
                        .col(ColumnDef::new(Customers::Email).string().null())
                        .col(ColumnDef::new(Customers::PhoneNumber).string().null())
                        .col(ColumnDef::new(Customers::Address).string().null())
                        .col(ColumnDef::new(Customers::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Customers::UpdatedAt).timestamp().null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_customers_organization_id")
                                .from(Customers::Table, Customers::OrganizationId)
                                .to(Organizations::Table, Organizations::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_customers_organization_id")
                        .table(Customers::Table)
                        .col(Customers::OrganizationId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // Drop customers table
            manager
                .drop_table(Table::drop().table(Customers::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Customers {
        Table,
        Id,
        OrganizationId,
        Name,
        Email,
        PhoneNumber,
        Address,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Organizations {
        Table,
        Id,
    }
}

mod m20240101_000006_create_projects_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000006_create_projects_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // Create projects table
            manager
                .create_table(
                    Table::create()
                        .table(Projects::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Projects::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Projects::OrganizationId).uuid().not_null())
                        .col(ColumnDef::new(Projects::CustomerId).uuid().null())
                        .col(ColumnDef::new(Projects::Name).string().not_null())
                        .col(ColumnDef::new(Projects::Description).string().null())
                        .col(
                            ColumnDef::new(Projects::Status)
                                .string()
                                .not_null()
                                .default("active"),
                        )
                        .col(ColumnDef::new(Projects::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Projects::UpdatedAt).timestamp().null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_projects_organization_id")
                                .from(Projects::Table, Projects::OrganizationId)
                                .to(Organizations::Table, Organizations::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_projects_customer_id")
                                .from(Projects::Table, Projects::CustomerId)
                                .to(Customers::Table, Customers::Id)
                                .on_delete(ForeignKeyAction::SetNull)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_projects_organization_id")
                        .table(Projects::Table)
                        .col(Projects::OrganizationId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_projects_customer_id")
                        .table(Projects::Table)
                        .col(Projects::CustomerId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // Drop projects table
            manager
                .drop_table(Table::drop().table(Projects::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Projects {
        Table,
        Id,
        OrganizationId,
        CustomerId,
        Name,
        Description,
        Status,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Organizations {
        Table,
        Id,
    }

    #[derive(DeriveIden)]
    enum Customers {
        Table,
        Id,
    }
}

mod m20240101_000007_create_products_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000007_create_products_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // Create products table
            manager
                .create_table(
                    Table::create()
                        .table(Products::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Products::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Products::OrganizationId).uuid().not_null())
                        .col(ColumnDef::new(Products::Name).string().not_null())
                        .col(ColumnDef::new(Products::Description).string().null())
                        .col(ColumnDef::new(Products::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Products::UpdatedAt).timestamp().null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_products_organization_id")
                                .from(Products::Table, Products::OrganizationId)
                                .to(Organizations::Table, Organizations::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_products_organization_id")
                        .table(Products::Table)
                        .col(Products::OrganizationId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // Drop products table
            manager
                .drop_table(Table::drop().table(Products::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Products {
        Table,
        Id,
        OrganizationId,
        Name,
        Description,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Organizations {
        Table,
        Id,
    }
}

mod m20240101_000008_create_estimate_headers_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000008_create_estimate_headers_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // Create estimate_headers table
            manager
                .create_table(
                    Table::create()
                        .table(EstimateHeaders::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(EstimateHeaders::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(EstimateHeaders::ProjectId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(EstimateHeaders::Status)
                                .string()
                                .not_null()
                                .default("draft"),
                        )
                        .col(
                            ColumnDef::new(EstimateHeaders::TransportHandlingCost)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(EstimateHeaders::Discount)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(EstimateHeaders::ApproximateTax)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(EstimateHeaders::EstimatedTotal)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(EstimateHeaders::Description).string().null())
                        .col(
                            ColumnDef::new(EstimateHeaders::AdditionalNotes)
                                .string()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(EstimateHeaders::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(ColumnDef::new(EstimateHeaders::UpdatedAt).timestamp().null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_estimate_headers_project_id")
                                .from(EstimateHeaders::Table, EstimateHeaders::ProjectId)
                                .to(Projects::Table, Projects::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_estimate_headers_project_id")
                        .table(EstimateHeaders::Table)
                        .col(EstimateHeaders::ProjectId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_estimate_headers_created_at")
                        .table(EstimateHeaders::Table)
                        .col(EstimateHeaders::CreatedAt)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // Drop estimate_headers table
            manager
                .drop_table(Table::drop().table(EstimateHeaders::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum EstimateHeaders {
        Table,
        Id,
        ProjectId,
        Status,
        TransportHandlingCost,
        Discount,
        ApproximateTax,
        EstimatedTotal,
        Description,
        AdditionalNotes,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Projects {
        Table,
        Id,
    }
}

mod m20240101_000009_create_estimate_details_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000009_create_estimate_details_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // Create estimate_details table
            manager
                .create_table(
                    Table::create()
                        .table(EstimateDetails::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(EstimateDetails::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(EstimateDetails::EstimateHeaderId)
                                .uuid()
                                .not_null(),
                        )
                        .col(ColumnDef::new(EstimateDetails::ProductId).uuid().not_null())
                        .col(
                            ColumnDef::new(EstimateDetails::ComponentName)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(EstimateDetails::OverallLength)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(EstimateDetails::OverallBreadth)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(EstimateDetails::OverallHeight)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(EstimateDetails::LaborCharges)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(EstimateDetails::PolishingCharges)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(EstimateDetails::ComponentLength)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(EstimateDetails::ComponentBreadth)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(EstimateDetails::ComponentThickness)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(EstimateDetails::ComponentCft)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(EstimateDetails::ComponentCostPerCft)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(EstimateDetails::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(ColumnDef::new(EstimateDetails::UpdatedAt).timestamp().null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_estimate_details_estimate_header_id")
                                .from(
                                    EstimateDetails::Table,
                                    EstimateDetails::EstimateHeaderId,
                                )
                                .to(EstimateHeaders::Table, EstimateHeaders::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_estimate_details_product_id")
                                .from(EstimateDetails::Table, EstimateDetails::ProductId)
                                .to(Products::Table, Products::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_estimate_details_estimate_header_id")
                        .table(EstimateDetails::Table)
                        .col(EstimateDetails::EstimateHeaderId)
                        .to_owned(),
                )
                .await?;

            // Serves the job-card measurement join on (header, product)
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_estimate_details_header_product")
                        .table(EstimateDetails::Table)
                        .col(EstimateDetails::EstimateHeaderId)
                        .col(EstimateDetails::ProductId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // Drop estimate_details table
            manager
                .drop_table(Table::drop().table(EstimateDetails::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum EstimateDetails {
        Table,
        Id,
        EstimateHeaderId,
        ProductId,
        ComponentName,
        OverallLength,
        OverallBreadth,
        OverallHeight,
        LaborCharges,
        PolishingCharges,
        ComponentLength,
        ComponentBreadth,
        ComponentThickness,
        ComponentCft,
        ComponentCostPerCft,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum EstimateHeaders {
        Table,
        Id,
    }

    #[derive(DeriveIden)]
    enum Products {
        Table,
        Id,
    }
}

mod m20240101_000010_create_job_cards_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000010_create_job_cards_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // Create job_cards table
            manager
                .create_table(
                    Table::create()
                        .table(JobCards::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(JobCards::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(JobCards::OrganizationId).uuid().not_null())
                        .col(ColumnDef::new(JobCards::EstimateHeaderId).uuid().null())
                        .col(ColumnDef::new(JobCards::ProductId).uuid().null())
                        .col(
                            ColumnDef::new(JobCards::Status)
                                .string()
                                .not_null()
                                .default("pending"),
                        )
                        .col(ColumnDef::new(JobCards::Description).string().null())
                        .col(ColumnDef::new(JobCards::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(JobCards::UpdatedAt).timestamp().null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_job_cards_organization_id")
                                .from(JobCards::Table, JobCards::OrganizationId)
                                .to(Organizations::Table, Organizations::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_job_cards_estimate_header_id")
                                .from(JobCards::Table, JobCards::EstimateHeaderId)
                                .to(EstimateHeaders::Table, EstimateHeaders::Id)
                                .on_delete(ForeignKeyAction::SetNull)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_job_cards_product_id")
                                .from(JobCards::Table, JobCards::ProductId)
                                .to(Products::Table, Products::Id)
                                .on_delete(ForeignKeyAction::SetNull)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_job_cards_organization_id")
                        .table(JobCards::Table)
                        .col(JobCards::OrganizationId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_job_cards_estimate_header_id")
                        .table(JobCards::Table)
                        .col(JobCards::EstimateHeaderId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // Drop job_cards table
            manager
                .drop_table(Table::drop().table(JobCards::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum JobCards {
        Table,
        Id,
        OrganizationId,
        EstimateHeaderId,
        ProductId,
        Status,
        Description,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Organizations {
        Table,
        Id,
    }

    #[derive(DeriveIden)]
    enum EstimateHeaders {
        Table,
        Id,
    }

    #[derive(DeriveIden)]
    enum Products {
        Table,
        Id,
    }
}

// Database migration CLI runner
pub async fn run_migration(db_url: &str) -> Result<()> {
    info!("Setting up database connection for migrations");

    let mut opt = ConnectOptions::new(db_url);
    opt.max_connections(10)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(30))
        .acquire_timeout(Duration::from_secs(30))
        .idle_timeout(Duration::from_secs(300))
        .max_lifetime(Duration::from_secs(1800))
        .sqlx_logging(true);

    let db = Database::connect(opt).await?;

    info!("Running database migrations");

    let result = Migrator::up(&db, None).await;

    match result {
        Ok(_) => {
            info!("Migrations completed successfully");
            Ok(())
        }
        Err(e) => {
            error!("Migration failed: {}", e);
            Err(e.into())
        }
    }
}
