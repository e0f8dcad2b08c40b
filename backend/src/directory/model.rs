//! Request bodies for direct entity CRUD

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::decimal::fits_money_column;
use crate::loan::edit::AMOUNT_TOO_LARGE;
use crate::loan::model::{CheckTerms, LoanStatus, LoanTerms, StandingOrderTerms};

/// Non-negative and small enough for a `NUMERIC(12, 2)` column
fn storable_amount(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        let mut error = ValidationError::new("non_negative");
        error.message = Some("Ensure this value is greater than or equal to 0.".into());
        return Err(error);
    }
    if !fits_money_column(*value) {
        let mut error = ValidationError::new("max_digits");
        error.message = Some(AMOUNT_TOO_LARGE.into());
        return Err(error);
    }
    Ok(())
}

fn blank_or_email(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || validator::validate_email(value) {
        return Ok(());
    }
    let mut error = ValidationError::new("email");
    error.message = Some("Enter a valid email address.".into());
    Err(error)
}

fn default_true() -> bool {
    true
}

fn default_status() -> LoanStatus {
    LoanStatus::Pending
}

/// Create/replace payload for a trustee
#[derive(Debug, Deserialize, Validate)]
pub struct TrusteeRequest {
    pub user_id: Uuid,
    #[validate(length(min = 1, max = 100, message = "Ensure this field has 1 to 100 characters."))]
    pub community: String,
    pub notes: Option<String>,
}

/// Create/replace payload for a borrower
#[derive(Debug, Deserialize, Validate)]
pub struct BorrowerRequest {
    pub user_id: Option<Uuid>,
    pub trustee_id: Option<Uuid>,
    #[validate(length(min = 1, max = 20, message = "Ensure this field has 1 to 20 characters."))]
    pub id_number: String,
    #[serde(default)]
    #[validate(length(max = 150, message = "Ensure this field has no more than 150 characters."))]
    pub first_name: String,
    #[serde(default)]
    #[validate(length(max = 150, message = "Ensure this field has no more than 150 characters."))]
    pub last_name: String,
    #[serde(default)]
    #[validate(length(max = 20, message = "Ensure this field has no more than 20 characters."))]
    pub phone: String,
    #[serde(default)]
    #[validate(custom = "blank_or_email")]
    pub email: String,
    #[serde(default)]
    #[validate(length(max = 255, message = "Ensure this field has no more than 255 characters."))]
    pub address: String,
}

/// Fields shared by both loan variants in CRUD payloads
#[derive(Debug, Deserialize, Validate)]
pub struct LoanBaseRequest {
    pub borrower_id: Uuid,
    pub trustee_id: Option<Uuid>,
    #[validate(custom = "storable_amount")]
    pub amount: Decimal,
    pub start_date: NaiveDate,
    #[serde(default = "default_status")]
    pub status: LoanStatus,
    #[validate(length(max = 255, message = "Ensure this field has no more than 255 characters."))]
    pub form_file: Option<String>,
}

/// Create/replace payload for a checks loan
#[derive(Debug, Deserialize, Validate)]
pub struct CheckLoanRequest {
    #[serde(flatten)]
    #[validate]
    pub base: LoanBaseRequest,
    #[validate(range(min = 1, message = "Ensure this value is greater than or equal to 1."))]
    pub num_payments: i32,
    pub check_details: Option<String>,
    #[serde(default = "default_true")]
    pub predefined_schedule: bool,
}

impl CheckLoanRequest {
    pub fn terms(&self) -> LoanTerms {
        LoanTerms::Checks(CheckTerms {
            num_payments: self.num_payments,
            check_details: self.check_details.clone(),
            predefined_schedule: self.predefined_schedule,
        })
    }
}

/// Create/replace payload for a standing-order loan
#[derive(Debug, Deserialize, Validate)]
pub struct StandingOrderLoanRequest {
    #[serde(flatten)]
    #[validate]
    pub base: LoanBaseRequest,
    #[validate(custom = "storable_amount")]
    pub monthly_amount: Decimal,
    #[validate(range(min = 1, max = 31, message = "Ensure this value is between 1 and 31."))]
    pub charge_day: i32,
    pub stop_date: Option<NaiveDate>,
}

impl StandingOrderLoanRequest {
    pub fn terms(&self) -> LoanTerms {
        LoanTerms::StandingOrder(StandingOrderTerms {
            monthly_amount: self.monthly_amount,
            charge_day: self.charge_day,
            stop_date: self.stop_date,
        })
    }
}
