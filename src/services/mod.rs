//! Business logic services

pub mod audit;
pub mod auth;
pub mod catalog;
pub mod circulation;
pub mod members;
pub mod policy;
pub mod stats;

use std::sync::Arc;

use crate::{config::AppConfig, error::AppResult, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub catalog: catalog::CatalogService,
    pub members: members::MembersService,
    pub circulation: circulation::CirculationService,
    pub stats: stats::StatsService,
}

impl Services {
    /// Create all services over the given repository.
    /// Fails when the lending configuration names an unknown tier.
    pub fn new(repository: Repository, config: &AppConfig) -> AppResult<Self> {
        let policy = Arc::new(policy::LoanPolicy::from_config(&config.lending)?);
        let audit = audit::AuditLogger::new(repository.audit.clone());

        Ok(Self {
            auth: auth::AuthService::new(config.auth.clone()),
            catalog: catalog::CatalogService::new(repository.clone(), audit.clone()),
            members: members::MembersService::new(repository.clone(), audit.clone()),
            circulation: circulation::CirculationService::new(repository.clone(), policy, audit),
            stats: stats::StatsService::new(repository, config.lending.fine_rate),
        })
    }
}
