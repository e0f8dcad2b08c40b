//! Dashboard route definitions

use axum::{routing::get, Router};

use crate::handlers::loan_summary;
use crate::state::AppState;

pub fn dashboard_routes() -> Router<AppState> {
    Router::new().route("/api/dashboard/loan-summary/", get(loan_summary))
}
