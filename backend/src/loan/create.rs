//! Validation and drafting of new loans
//!
//! The creation body is read field by field from raw JSON so that a mistyped
//! value is reported under its own name together with every other problem.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::decimal::{per_part, to_money};
use crate::error::{ApiError, FieldErrors};
use crate::loan::edit::{
    expect_object, parse_amount, parse_date, parse_payment_count, parse_uuid, take_optional,
    take_required, REQUIRED,
};
use crate::loan::model::{
    BorrowerUpsert, CheckTerms, LoanDraft, LoanKind, LoanStatus, LoanTerms, StandingOrderTerms,
};
use crate::payment::schedule::installments;

pub const INVALID_LOAN_TYPE: &str = "Invalid loan type";
pub const NOT_A_STRING: &str = "Not a valid string.";
pub const NOT_A_BOOLEAN: &str = "Must be a valid boolean.";

/// A creation request that passed field validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLoan {
    pub kind: LoanKind,
    pub trustee_id: Uuid,
    pub borrower: BorrowerUpsert,
    pub amount: Decimal,
    pub start_date: NaiveDate,
    pub number_of_payments: i64,
    pub check_details: Option<String>,
    pub predefined_schedule: bool,
    pub stop_date: Option<NaiveDate>,
    pub form_file: Option<String>,
}

/// Check every creation field, collecting all problems
///
/// Expected shape: `{loan_type, trustee_id, borrower: {...}, loan: {...}}`.
/// Errors are keyed by the flat field name.
pub fn validate(payload: &Value) -> Result<NewLoan, ApiError> {
    let root = expect_object(payload)?;
    let mut errors = FieldErrors::new();

    let kind = take_required(&mut errors, root, "loan_type", parse_loan_type);
    let trustee_id = take_required(&mut errors, root, "trustee_id", parse_uuid);

    let empty = Map::new();
    let borrower = section(&mut errors, root, "borrower").unwrap_or(&empty);
    let loan = section(&mut errors, root, "loan").unwrap_or(&empty);

    let id_number = take_required(&mut errors, borrower, "id_number", parse_id_number);
    let first_name = text(&mut errors, borrower, "first_name");
    let last_name = text(&mut errors, borrower, "last_name");
    let phone = text(&mut errors, borrower, "phone");
    let email = text(&mut errors, borrower, "email");
    let address = text(&mut errors, borrower, "address");

    let amount = take_required(&mut errors, loan, "amount", parse_amount).map(to_money);
    let number_of_payments =
        take_required(&mut errors, loan, "number_of_payments", parse_payment_count);
    let start_date = take_required(&mut errors, loan, "start_date", parse_date);
    let check_details = take_optional(&mut errors, loan, "check_details", parse_text);
    let predefined_schedule = take_optional(&mut errors, loan, "predefined_schedule", parse_bool);
    let stop_date = take_optional(&mut errors, loan, "stop_date", parse_date);
    let form_file = take_optional(&mut errors, loan, "form_file", parse_text);

    errors.into_result()?;

    match (kind, trustee_id, id_number, amount, number_of_payments, start_date) {
        (Some(kind), Some(trustee_id), Some(id_number), Some(amount), Some(number_of_payments), Some(start_date)) => {
            Ok(NewLoan {
                kind,
                trustee_id,
                borrower: BorrowerUpsert {
                    id_number,
                    first_name,
                    last_name,
                    phone,
                    email,
                    address,
                    trustee_id: Some(trustee_id),
                },
                amount,
                start_date,
                number_of_payments,
                check_details,
                predefined_schedule: predefined_schedule.unwrap_or(true),
                stop_date,
                form_file: form_file.filter(|file| !file.is_empty()),
            })
        }
        _ => Err(ApiError::InternalError(
            "creation request validated with missing fields".to_string(),
        )),
    }
}

/// A nested object of the payload; absent or null counts as empty
fn section<'a>(
    errors: &mut FieldErrors,
    root: &'a Map<String, Value>,
    field: &str,
) -> Option<&'a Map<String, Value>> {
    match root.get(field) {
        None | Some(Value::Null) => None,
        Some(value) => match expect_object(value) {
            Ok(object) => Some(object),
            Err(_) => {
                errors.add(field, "Invalid data. Expected a dictionary.");
                None
            }
        },
    }
}

/// Optional contact text, trimmed, blank when absent
fn text(errors: &mut FieldErrors, object: &Map<String, Value>, field: &str) -> String {
    take_optional(errors, object, field, parse_text).unwrap_or_default()
}

fn parse_loan_type(value: &Value) -> Result<LoanKind, String> {
    value
        .as_str()
        .and_then(LoanKind::parse)
        .ok_or_else(|| INVALID_LOAN_TYPE.to_string())
}

fn parse_id_number(value: &Value) -> Result<String, String> {
    let id_number = parse_text(value)?;
    if id_number.is_empty() {
        return Err(REQUIRED.to_string());
    }
    Ok(id_number)
}

fn parse_text(value: &Value) -> Result<String, String> {
    value
        .as_str()
        .map(|text| text.trim().to_string())
        .ok_or_else(|| NOT_A_STRING.to_string())
}

fn parse_bool(value: &Value) -> Result<bool, String> {
    value.as_bool().ok_or_else(|| NOT_A_BOOLEAN.to_string())
}

/// Everything the creation transaction writes for a validated request
pub fn draft(new_loan: NewLoan) -> Result<LoanDraft, ApiError> {
    let (terms, with_schedule) = match new_loan.kind {
        LoanKind::Checks => (
            LoanTerms::Checks(CheckTerms {
                num_payments: i32::try_from(new_loan.number_of_payments).map_err(|_| {
                    ApiError::InternalError(format!(
                        "payment count {} out of range",
                        new_loan.number_of_payments
                    ))
                })?,
                check_details: new_loan.check_details,
                predefined_schedule: new_loan.predefined_schedule,
            }),
            new_loan.predefined_schedule,
        ),
        LoanKind::StandingOrder => {
            let monthly_amount = per_part(new_loan.amount, new_loan.number_of_payments)
                .ok_or_else(|| {
                    ApiError::InternalError(format!(
                        "cannot split {} over {} payments",
                        new_loan.amount, new_loan.number_of_payments
                    ))
                })?;
            (
                LoanTerms::StandingOrder(StandingOrderTerms {
                    monthly_amount,
                    charge_day: new_loan.start_date.day() as i32,
                    stop_date: new_loan.stop_date,
                }),
                true,
            )
        }
    };

    let schedule = if with_schedule {
        installments(
            new_loan.amount,
            new_loan.start_date,
            new_loan.number_of_payments,
        )
    } else {
        Vec::new()
    };

    Ok(LoanDraft {
        loan_id: Uuid::new_v4(),
        borrower: new_loan.borrower,
        trustee_id: Some(new_loan.trustee_id),
        amount: new_loan.amount,
        start_date: new_loan.start_date,
        status: LoanStatus::Active,
        form_file: new_loan.form_file,
        terms,
        schedule,
    })
}

pub(crate) fn payment_count_i32(count: i64) -> Result<i32, ApiError> {
    i32::try_from(count).map_err(|_| ApiError::field("number_of_payments", "Invalid value"))
}
