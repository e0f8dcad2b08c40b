//! Application state shared across handlers

use std::sync::Arc;

use axum::extract::FromRef;
use sqlx::PgPool;

use crate::config::Config;
use crate::directory::DirectoryService;
use crate::loan::LoanService;
use crate::middleware::AccessPolicy;
use crate::payment::PaymentService;
use crate::repository::{LoanRepository, PgLoanRepository};
use crate::services::DashboardService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub loan_service: Arc<LoanService>,
    pub payment_service: Arc<PaymentService>,
    pub dashboard_service: Arc<DashboardService>,
    pub directory_service: Arc<DirectoryService>,
    pub access_policy: Arc<AccessPolicy>,
}

impl AppState {
    /// Wire every service over one pool, with the Postgres loan repository
    pub fn new(db_pool: PgPool, config: &Config) -> Self {
        let repository: Arc<dyn LoanRepository> = Arc::new(PgLoanRepository::new(db_pool.clone()));
        Self::with_repository(
            db_pool,
            repository,
            &config.media_base_url,
            AccessPolicy::from_config(config),
        )
    }

    /// Wire the services over an explicit loan repository
    pub fn with_repository(
        db_pool: PgPool,
        repository: Arc<dyn LoanRepository>,
        media_base_url: &str,
        access_policy: AccessPolicy,
    ) -> Self {
        Self {
            loan_service: Arc::new(LoanService::new(repository.clone(), media_base_url)),
            payment_service: Arc::new(PaymentService::new(repository.clone())),
            dashboard_service: Arc::new(DashboardService::new(repository)),
            directory_service: Arc::new(DirectoryService::new(db_pool.clone())),
            access_policy: Arc::new(access_policy),
            db_pool,
        }
    }
}

impl FromRef<AppState> for PgPool {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.db_pool.clone()
    }
}

impl FromRef<AppState> for Arc<LoanService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.loan_service.clone()
    }
}

impl FromRef<AppState> for Arc<PaymentService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.payment_service.clone()
    }
}

impl FromRef<AppState> for Arc<DashboardService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.dashboard_service.clone()
    }
}

impl FromRef<AppState> for Arc<DirectoryService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.directory_service.clone()
    }
}

impl FromRef<AppState> for Arc<AccessPolicy> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.access_policy.clone()
    }
}
