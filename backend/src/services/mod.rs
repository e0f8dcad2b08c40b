//! Business logic services that span both loan variants

mod dashboard;

pub use dashboard::{DashboardService, LoanSummary};
