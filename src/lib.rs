pub mod client;
pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod interceptor;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;
pub mod utils;

use crate::config::Config;
use crate::error::Result;
use crate::middleware::fault::FaultInjector;
use crate::routes::passthrough::Passthrough;
use crate::services::{
    assessment_service::AssessmentService, candidate_service::CandidateService,
    job_service::JobService,
};
use crate::store::LocalStore;

#[derive(Clone)]
pub struct AppState {
    pub store: LocalStore,
    pub faults: FaultInjector,
    pub passthrough: Passthrough,
    pub job_service: JobService,
    pub candidate_service: CandidateService,
    pub assessment_service: AssessmentService,
}

impl AppState {
    pub fn new(store: LocalStore, config: &Config) -> Result<Self> {
        let faults = FaultInjector::from_config(config);
        let passthrough = Passthrough::new(config.passthrough_url.clone())?;

        let job_service = JobService::new(&store);
        let candidate_service = CandidateService::new(&store);
        let assessment_service = AssessmentService::new(&store);

        Ok(Self {
            store,
            faults,
            passthrough,
            job_service,
            candidate_service,
            assessment_service,
        })
    }
}
