//! Route definitions for the loan book API

mod dashboard;
mod directory;
mod loan;

use axum::{routing::get, Router};

pub use dashboard::dashboard_routes;
pub use directory::directory_routes;
pub use loan::loan_routes;

use crate::handlers::health_check;
use crate::state::AppState;

/// Every API route plus `/health`, still expecting the shared state
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .merge(loan_routes())
        .merge(dashboard_routes())
        .merge(directory_routes())
}

/// The API with state bound and the request middleware applied
pub fn app(state: AppState) -> Router {
    api_router()
        .with_state(state)
        .layer(axum::middleware::from_fn(crate::middleware::security_headers))
        .layer(axum::middleware::from_fn(crate::middleware::request_tracing))
}
