//! Dashboard service - headline figures over active loans

use std::sync::Arc;

use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::repository::LoanRepository;

/// Loan summary card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanSummary {
    pub active_loans_count: i64,
    pub total_active_loans_amount: f64,
}

impl LoanSummary {
    pub fn empty() -> Self {
        Self {
            active_loans_count: 0,
            total_active_loans_amount: 0.0,
        }
    }
}

#[derive(Clone)]
pub struct DashboardService {
    repository: Arc<dyn LoanRepository>,
}

impl DashboardService {
    pub fn new(repository: Arc<dyn LoanRepository>) -> Self {
        Self { repository }
    }

    /// Count and total of loans with storage status ACTIVE across both variants.
    /// Never fails: a storage error is logged and reported as an empty summary.
    pub async fn loan_summary(&self) -> LoanSummary {
        match self.repository.active_loan_totals().await {
            Ok(totals) => LoanSummary {
                active_loans_count: totals.count,
                total_active_loans_amount: totals.amount.to_f64().unwrap_or(0.0),
            },
            Err(err) => {
                tracing::error!(error = %err, "Failed to compute loan summary");
                LoanSummary::empty()
            }
        }
    }
}
