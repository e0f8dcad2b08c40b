//! Payment models

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::loan::model::LoanRef;

/// Payment status as persisted
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "payment_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentStatus {
    Pending,
    Paid,
}

/// One scheduled payment of a loan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payment {
    pub payment_id: Uuid,
    pub loan: LoanRef,
    pub due_date: NaiveDate,
    pub amount: Decimal,
    pub amount_paid: Decimal,
    pub status: PaymentStatus,
    pub paid_at: Option<DateTime<Utc>>,
    pub check_number: Option<String>,
}

impl Payment {
    /// A pending payment whose due date has arrived
    pub fn is_due(&self, today: NaiveDate) -> bool {
        self.status == PaymentStatus::Pending && self.due_date <= today
    }
}

/// Row of the payments table in API form
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentRow {
    pub payment_id: Uuid,
    pub due_date: NaiveDate,
    pub amount_due: Decimal,
    pub amount_paid: Decimal,
    pub status: PaymentStatus,
}

/// Totals over a loan's payments
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentSummary {
    pub total_amount: Decimal,
    pub paid_amount: Decimal,
    pub total_payments: usize,
    pub paid_payments: usize,
}

/// Response of the payments endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoanPayments {
    pub loan_id: Uuid,
    pub summary: PaymentSummary,
    pub payments: Vec<PaymentRow>,
}
