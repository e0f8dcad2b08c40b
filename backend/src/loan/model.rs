//! Loan models: the two product variants and their unified read shapes

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::loan::status::DisplayStatus;
use crate::models::{BorrowerParty, TrusteeParty};

/// Loan product variant
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq, Hash)]
#[sqlx(type_name = "loan_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum LoanKind {
    Checks,
    StandingOrder,
}

impl LoanKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanKind::Checks => "checks",
            LoanKind::StandingOrder => "standing_order",
        }
    }

    /// Parse the creation-payload vocabulary
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "checks" => Some(LoanKind::Checks),
            "standing_order" => Some(LoanKind::StandingOrder),
            _ => None,
        }
    }

    /// Whether the list endpoint's `type` filter admits this variant
    pub fn admitted_by(&self, type_filter: Option<&str>) -> bool {
        let Some(filter) = type_filter.map(str::trim).filter(|f| !f.is_empty()) else {
            return true;
        };
        match self {
            LoanKind::Checks => matches!(filter, "all" | "checks"),
            LoanKind::StandingOrder => {
                matches!(filter, "all" | "standing_orders" | "standing_order")
            }
        }
    }
}

/// Storage status as persisted
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "loan_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum LoanStatus {
    Pending,
    Active,
    Paid,
    Rejected,
}

/// Fields specific to a checks loan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckTerms {
    pub num_payments: i32,
    pub check_details: Option<String>,
    pub predefined_schedule: bool,
}

/// Fields specific to a standing-order loan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandingOrderTerms {
    pub monthly_amount: Decimal,
    pub charge_day: i32,
    pub stop_date: Option<NaiveDate>,
}

/// Variant-specific part of a loan
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum LoanTerms {
    Checks(CheckTerms),
    StandingOrder(StandingOrderTerms),
}

/// A stored loan of either variant
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Loan {
    pub loan_id: Uuid,
    pub borrower_id: Uuid,
    pub trustee_id: Option<Uuid>,
    pub amount: Decimal,
    pub start_date: NaiveDate,
    pub status: LoanStatus,
    pub form_file: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub terms: LoanTerms,
}

impl Loan {
    pub fn kind(&self) -> LoanKind {
        match self.terms {
            LoanTerms::Checks(_) => LoanKind::Checks,
            LoanTerms::StandingOrder(_) => LoanKind::StandingOrder,
        }
    }

    pub fn loan_ref(&self) -> LoanRef {
        LoanRef {
            kind: self.kind(),
            loan_id: self.loan_id,
        }
    }
}

/// Tagged reference to exactly one loan of exactly one variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LoanRef {
    pub kind: LoanKind,
    pub loan_id: Uuid,
}

/// A loan joined with the parties needed to display it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoanRecord {
    pub loan: Loan,
    pub borrower: BorrowerParty,
    pub trustee: Option<TrusteeParty>,
}

// ===== Read shapes =====

/// Borrower block of the unified loan shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BorrowerView {
    pub name: String,
    pub phone: String,
    pub email: String,
}

/// Trustee block of the unified loan shape; both fields null without a trustee
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrusteeView {
    pub name: Option<String>,
    pub community: Option<String>,
}

/// Unified loan shape used by the list endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoanListItem {
    pub loan_id: Uuid,
    pub loan_type: LoanKind,
    pub amount: Decimal,
    pub start_date: NaiveDate,
    pub status: DisplayStatus,
    pub borrower: BorrowerView,
    pub trustee: TrusteeView,
}

/// Variant-specific block of the detail shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum LoanDetails {
    Checks {
        num_payments: i32,
        check_details: Option<String>,
        predefined_schedule: bool,
    },
    StandingOrder {
        monthly_amount: Decimal,
        charge_day: i32,
        stop_date: Option<NaiveDate>,
    },
}

/// Unified loan shape used by the detail and update endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoanDetail {
    #[serde(flatten)]
    pub summary: LoanListItem,
    pub created_at: DateTime<Utc>,
    pub form_file_url: Option<String>,
    pub trustee_id: Option<Uuid>,
    pub details: LoanDetails,
}

/// Query for the unified loan list
#[derive(Debug, Default, Deserialize)]
pub struct ListLoansQuery {
    #[serde(rename = "type")]
    pub loan_type: Option<String>,
    pub search: Option<String>,
}

// ===== Creation =====

/// Response DTO for loan creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateLoanResponse {
    pub loan_id: Uuid,
    pub loan_type: LoanKind,
    pub status: LoanStatus,
}

/// Borrower values written by the id-number upsert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BorrowerUpsert {
    pub id_number: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub trustee_id: Option<Uuid>,
}

/// One generated installment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Installment {
    pub due_date: NaiveDate,
    pub amount: Decimal,
}

/// Everything the creation transaction writes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoanDraft {
    pub loan_id: Uuid,
    pub borrower: BorrowerUpsert,
    pub trustee_id: Option<Uuid>,
    pub amount: Decimal,
    pub start_date: NaiveDate,
    pub status: LoanStatus,
    pub form_file: Option<String>,
    pub terms: LoanTerms,
    pub schedule: Vec<Installment>,
}
