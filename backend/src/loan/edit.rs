//! Parsing of the loan edit payload
//!
//! The edit endpoint accepts exactly five fields. Anything else is rejected
//! before the known fields are looked at; otherwise every field is checked
//! and all problems are reported together.

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::decimal::fits_money_column;
use crate::error::{ApiError, FieldErrors};
use crate::loan::status::DisplayStatus;

/// Fields the edit payload may carry
pub const EDITABLE_FIELDS: [&str; 5] = [
    "amount",
    "start_date",
    "number_of_payments",
    "trustee_id",
    "status",
];

/// Upper bound on the number of payments of one loan
pub const MAX_PAYMENTS: i64 = 1200;

pub const REQUIRED: &str = "This field is required.";
pub const NOT_NULL: &str = "This field may not be null.";
pub const AMOUNT_NOT_POSITIVE: &str = "Must be greater than 0";
pub const AMOUNT_TOO_LARGE: &str = "Ensure that there are no more than 10 digits before the decimal point.";
pub const PAYMENTS_BELOW_ONE: &str = "Must be at least 1";
pub const TRUSTEE_NOT_FOUND: &str = "Trustee not found";
pub const BAD_DATE: &str = "Date has wrong format. Use YYYY-MM-DD.";
pub const UNEXPECTED_FIELD: &str = "Unexpected field";

/// A fully validated edit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoanEdit {
    pub amount: Decimal,
    pub start_date: NaiveDate,
    pub number_of_payments: i64,
    pub trustee_id: Uuid,
    pub status: DisplayStatus,
}

/// Edit fields as far as they could be parsed, plus the problems found so far
#[derive(Debug, Default)]
pub struct EditForm {
    pub amount: Option<Decimal>,
    pub start_date: Option<NaiveDate>,
    pub number_of_payments: Option<i64>,
    pub trustee_id: Option<Uuid>,
    pub status: Option<DisplayStatus>,
    pub errors: FieldErrors,
}

impl EditForm {
    /// Parse a raw request body. Unexpected keys short-circuit into their own error map.
    pub fn parse(payload: &Value) -> Result<Self, ApiError> {
        let object = expect_object(payload)?;
        unexpected_fields(object).into_result()?;

        let mut errors = FieldErrors::new();
        let amount = take_required(&mut errors, object, "amount", parse_amount);
        let start_date = take_required(&mut errors, object, "start_date", parse_date);
        let number_of_payments =
            take_required(&mut errors, object, "number_of_payments", parse_payment_count);
        let trustee_id = take_required(&mut errors, object, "trustee_id", parse_uuid);
        let status = take_required(&mut errors, object, "status", parse_status);

        Ok(EditForm {
            amount,
            start_date,
            number_of_payments,
            trustee_id,
            status,
            errors,
        })
    }

    /// Record that the submitted trustee does not exist
    pub fn reject_trustee(&mut self) {
        self.trustee_id = None;
        self.errors.add("trustee_id", TRUSTEE_NOT_FOUND);
    }

    /// Turn the form into a validated edit, or the collected field errors
    pub fn finish(self) -> Result<LoanEdit, ApiError> {
        self.errors.into_result()?;

        match (
            self.amount,
            self.start_date,
            self.number_of_payments,
            self.trustee_id,
            self.status,
        ) {
            (Some(amount), Some(start_date), Some(number_of_payments), Some(trustee_id), Some(status)) => {
                Ok(LoanEdit {
                    amount,
                    start_date,
                    number_of_payments,
                    trustee_id,
                    status,
                })
            }
            _ => Err(ApiError::InternalError(
                "edit form finished without errors but with missing fields".to_string(),
            )),
        }
    }
}

/// One "Unexpected field" error per key outside [`EDITABLE_FIELDS`]
pub fn unexpected_fields(object: &Map<String, Value>) -> FieldErrors {
    let mut errors = FieldErrors::new();
    for key in object.keys() {
        if !EDITABLE_FIELDS.contains(&key.as_str()) {
            errors.add(key.as_str(), UNEXPECTED_FIELD);
        }
    }
    errors
}

/// The body as a JSON object, or a `non_field_errors` validation error
pub(crate) fn expect_object(payload: &Value) -> Result<&Map<String, Value>, ApiError> {
    payload.as_object().ok_or_else(|| {
        ApiError::field(
            "non_field_errors",
            format!(
                "Invalid data. Expected a dictionary, but got {}.",
                json_type_name(payload)
            ),
        )
    })
}

/// Parse a field that must be present and non-null, recording any problem under its name
pub(crate) fn take_required<T>(
    errors: &mut FieldErrors,
    object: &Map<String, Value>,
    field: &str,
    parse: fn(&Value) -> Result<T, String>,
) -> Option<T> {
    let outcome = match object.get(field) {
        None => Err(REQUIRED.to_string()),
        Some(Value::Null) => Err(NOT_NULL.to_string()),
        Some(value) => parse(value),
    };
    record(errors, field, outcome)
}

/// Parse a field that may be absent or null
pub(crate) fn take_optional<T>(
    errors: &mut FieldErrors,
    object: &Map<String, Value>,
    field: &str,
    parse: fn(&Value) -> Result<T, String>,
) -> Option<T> {
    match object.get(field) {
        None | Some(Value::Null) => None,
        Some(value) => record(errors, field, parse(value)),
    }
}

fn record<T>(errors: &mut FieldErrors, field: &str, outcome: Result<T, String>) -> Option<T> {
    match outcome {
        Ok(value) => Some(value),
        Err(message) => {
            errors.add(field, message);
            None
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

/// Amounts arrive either as JSON numbers or as decimal strings
pub fn parse_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(number) => {
            let text = number.to_string();
            Decimal::from_str(&text)
                .or_else(|_| Decimal::from_scientific(&text))
                .ok()
        }
        Value::String(text) => Decimal::from_str(text.trim()).ok(),
        _ => None,
    }
}

pub(crate) fn parse_amount(value: &Value) -> Result<Decimal, String> {
    let amount = parse_decimal(value).ok_or_else(|| "A valid number is required.".to_string())?;
    if amount <= Decimal::ZERO {
        return Err(AMOUNT_NOT_POSITIVE.to_string());
    }
    if !fits_money_column(amount) {
        return Err(AMOUNT_TOO_LARGE.to_string());
    }
    Ok(amount)
}

/// `YYYY-MM-DD`
pub fn parse_iso_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").ok()
}

pub(crate) fn parse_date(value: &Value) -> Result<NaiveDate, String> {
    value
        .as_str()
        .and_then(parse_iso_date)
        .ok_or_else(|| BAD_DATE.to_string())
}

/// Payment count bounds shared by creation and edit
pub fn check_payment_count(count: i64) -> Result<i64, String> {
    if count < 1 {
        return Err(PAYMENTS_BELOW_ONE.to_string());
    }
    if count > MAX_PAYMENTS {
        return Err(format!(
            "Ensure this value is less than or equal to {}.",
            MAX_PAYMENTS
        ));
    }
    Ok(count)
}

pub(crate) fn parse_payment_count(value: &Value) -> Result<i64, String> {
    let count = match value {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.trim().parse::<i64>().ok(),
        _ => None,
    }
    .ok_or_else(|| "A valid integer is required.".to_string())?;

    check_payment_count(count)
}

pub(crate) fn parse_uuid(value: &Value) -> Result<Uuid, String> {
    value
        .as_str()
        .and_then(|text| Uuid::parse_str(text.trim()).ok())
        .ok_or_else(|| "Must be a valid UUID.".to_string())
}

fn parse_status(value: &Value) -> Result<DisplayStatus, String> {
    match value {
        Value::String(text) => {
            DisplayStatus::parse(text).ok_or_else(|| format!("\"{}\" is not a valid choice.", text))
        }
        other => Err(format!("\"{}\" is not a valid choice.", other)),
    }
}
