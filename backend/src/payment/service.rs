//! Payment service layer - payment schedule reads with overdue settlement

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::decimal::to_money;
use crate::error::{ApiError, ApiResult};
use crate::loan::model::LoanRef;
use crate::loan::service::LOAN_NOT_FOUND;
use crate::payment::model::{LoanPayments, Payment, PaymentRow, PaymentStatus, PaymentSummary};
use crate::repository::LoanRepository;

#[derive(Clone)]
pub struct PaymentService {
    repository: Arc<dyn LoanRepository>,
}

impl PaymentService {
    pub fn new(repository: Arc<dyn LoanRepository>) -> Self {
        Self { repository }
    }

    /// Payments of a loan as of today. Reading settles overdue payments first.
    pub async fn get_payments(&self, loan_id: Uuid) -> ApiResult<LoanPayments> {
        self.payments_as_of(loan_id, Utc::now().date_naive()).await
    }

    pub async fn payments_as_of(&self, loan_id: Uuid, today: NaiveDate) -> ApiResult<LoanPayments> {
        let loan = self
            .repository
            .find_loan(loan_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(LOAN_NOT_FOUND.to_string()))?
            .loan
            .loan_ref();

        self.settle_overdue(loan, today).await?;

        let payments = self.repository.payments_for(loan).await?;

        Ok(LoanPayments {
            loan_id,
            summary: summarize(&payments),
            payments: payments.iter().map(to_row).collect(),
        })
    }

    /// Mark every pending payment due on or before `today` as paid in full
    pub async fn settle_overdue(&self, loan: LoanRef, today: NaiveDate) -> ApiResult<u64> {
        let settled = self.repository.settle_due_payments(loan, today).await?;
        if settled > 0 {
            tracing::info!(
                loan_id = %loan.loan_id,
                loan_type = loan.kind.as_str(),
                settled,
                "Settled overdue payments"
            );
        }
        Ok(settled)
    }
}

pub fn summarize(payments: &[Payment]) -> PaymentSummary {
    let total_amount: Decimal = payments.iter().map(|p| p.amount).sum();
    let paid_amount: Decimal = payments.iter().map(|p| p.amount_paid).sum();

    PaymentSummary {
        total_amount: to_money(total_amount),
        paid_amount: to_money(paid_amount),
        total_payments: payments.len(),
        paid_payments: payments
            .iter()
            .filter(|p| p.status == PaymentStatus::Paid)
            .count(),
    }
}

fn to_row(payment: &Payment) -> PaymentRow {
    PaymentRow {
        payment_id: payment.payment_id,
        due_date: payment.due_date,
        amount_due: to_money(payment.amount),
        amount_paid: to_money(payment.amount_paid),
        status: payment.status,
    }
}
