//! Persistence boundary for the loan views and the payment schedule
//!
//! Services talk to storage only through [`LoanRepository`]. The Postgres
//! implementation lives in [`postgres`].

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::loan::model::{Loan, LoanDraft, LoanKind, LoanRecord, LoanRef};
use crate::models::Trustee;
use crate::payment::model::Payment;

pub mod postgres;

pub use postgres::PgLoanRepository;

/// Repository failures
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("inconsistent row: {0}")]
    Corrupt(String),
}

/// Count and sum of loans whose storage status is ACTIVE
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActiveLoanTotals {
    pub count: i64,
    pub amount: Decimal,
}

#[async_trait]
pub trait LoanRepository: Send + Sync {
    /// Loans of one variant with storage status ACTIVE, ordered by start date then creation time
    async fn list_active(&self, kind: LoanKind) -> Result<Vec<LoanRecord>, RepositoryError>;

    /// Loan of either variant by id
    async fn find_loan(&self, loan_id: Uuid) -> Result<Option<LoanRecord>, RepositoryError>;

    async fn find_trustee(&self, trustee_id: Uuid) -> Result<Option<Trustee>, RepositoryError>;

    /// Upsert the borrower, insert the loan and its schedule; all or nothing
    async fn create_loan(&self, draft: LoanDraft) -> Result<Loan, RepositoryError>;

    /// Write back the editable fields of an existing loan
    async fn save_loan(&self, loan: &Loan) -> Result<(), RepositoryError>;

    /// Mark PENDING payments due on or before `as_of` as PAID in full.
    /// Only rows still PENDING are touched; returns how many changed.
    async fn settle_due_payments(
        &self,
        loan: LoanRef,
        as_of: NaiveDate,
    ) -> Result<u64, RepositoryError>;

    /// Payments of a loan ordered by due date
    async fn payments_for(&self, loan: LoanRef) -> Result<Vec<Payment>, RepositoryError>;

    async fn active_loan_totals(&self) -> Result<ActiveLoanTotals, RepositoryError>;
}
