use std::sync::Arc;

use crate::db::DbPool;
use crate::mailer::Mailer;
use crate::services::catalog::CatalogService;
use crate::services::estimates::EstimateService;
use crate::services::job_cards::JobCardService;
use crate::services::organizations::OrganizationService;
use crate::services::statistics::StatisticsService;
use crate::services::users::UserService;

pub mod auth;
pub mod customers;
pub mod estimates;
pub mod job_cards;
pub mod organizations;
pub mod products;
pub mod projects;
pub mod statistics;

/// Service container carried inside [`crate::AppState`]. Every handler
/// reaches its domain logic through here.
#[derive(Clone)]
pub struct AppServices {
    pub users: Arc<UserService>,
    pub organizations: Arc<OrganizationService>,
    pub catalog: Arc<CatalogService>,
    pub estimates: Arc<EstimateService>,
    pub job_cards: Arc<JobCardService>,
    pub statistics: Arc<StatisticsService>,
}

impl AppServices {
    pub fn new(db_pool: Arc<DbPool>, mailer: Mailer) -> Self {
        Self {
            users: Arc::new(UserService::new(db_pool.clone(), mailer)),
            organizations: Arc::new(OrganizationService::new(db_pool.clone())),
            catalog: Arc::new(CatalogService::new(db_pool.clone())),
            estimates: Arc::new(EstimateService::new(db_pool.clone())),
            job_cards: Arc::new(JobCardService::new(db_pool.clone())),
            statistics: Arc::new(StatisticsService::new(db_pool)),
        }
    }
}
