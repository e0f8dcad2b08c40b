//! Dashboard handlers

use std::sync::Arc;

use axum::{extract::State, Json};

use crate::services::{DashboardService, LoanSummary};

/// Active loan count and total; always 200
pub async fn loan_summary(State(service): State<Arc<DashboardService>>) -> Json<LoanSummary> {
    Json(service.loan_summary().await)
}
