//! Centralized API error handling
//!
//! This module provides a unified error type for API responses with proper
//! HTTP status code mapping. Bodies follow the loan book's wire contract:
//! `{"detail": "..."}` for single-message errors and a field -> messages map
//! for validation failures.

use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use crate::repository::RepositoryError;

/// Message shown to callers whenever the real cause must stay server-side
pub const GENERIC_ERROR_MESSAGE: &str = "An error occurred";

/// Field-keyed validation messages, collected rather than fail-fast
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a map holding a single message
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// `Ok(())` when nothing was collected, otherwise a validation error
    pub fn into_result(self) -> Result<(), ApiError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(self))
        }
    }
}

/// API error type with HTTP status code mapping
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("Validation failed on {}", .0.fields().collect::<Vec<_>>().join(", "))]
    Validation(FieldErrors),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl ApiError {
    /// Shorthand for a one-field validation error
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::Validation(FieldErrors::single(field, message))
    }

    /// Get the error code string
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Validation(_) => "VALIDATION_ERROR",
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::InternalError(_) => "INTERNAL_ERROR",
            ApiError::DatabaseError(_) => "DATABASE_ERROR",
        }
    }

    /// Get the HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Validation(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::InternalError(_) | ApiError::DatabaseError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();

        let body = match self {
            ApiError::Validation(errors) => {
                tracing::debug!(code = %error_code, fields = ?errors, "Validation failed");
                serde_json::to_value(errors).unwrap_or_else(|_| json!({}))
            }
            ApiError::InternalError(message) | ApiError::DatabaseError(message) => {
                tracing::error!(error = %message, code = %error_code, "Server error occurred");
                json!({ "detail": GENERIC_ERROR_MESSAGE })
            }
            ApiError::NotFound(message)
            | ApiError::BadRequest(message)
            | ApiError::Unauthorized(message)
            | ApiError::Forbidden(message) => {
                tracing::debug!(error = %message, code = %error_code, "Client error occurred");
                json!({ "detail": message })
            }
        };

        (status, Json(body)).into_response()
    }
}

// Convenience conversions from common error types

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Not found".to_string()),
            _ => ApiError::DatabaseError(err.to_string()),
        }
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        ApiError::DatabaseError(err.to_string())
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        let mut errors = FieldErrors::new();
        collect_validation_errors(&err, &mut errors);
        ApiError::Validation(errors)
    }
}

/// Flattened payloads report nested struct failures under the inner field name
fn collect_validation_errors(err: &validator::ValidationErrors, out: &mut FieldErrors) {
    use validator::ValidationErrorsKind;

    for (field, kind) in err.errors() {
        match kind {
            ValidationErrorsKind::Field(failures) => {
                for failure in failures {
                    let message = failure
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid value ({})", failure.code));
                    out.add(*field, message);
                }
            }
            ValidationErrorsKind::Struct(nested) => collect_validation_errors(nested, out),
            ValidationErrorsKind::List(items) => {
                for nested in items.values() {
                    collect_validation_errors(nested, out);
                }
            }
        }
    }
}

/// Integrity constraint a database write tripped over
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstraintViolation {
    Unique(String),
    ForeignKey(String),
    Check(String),
}

impl ConstraintViolation {
    /// Column named by a default Postgres constraint name such as `borrowers_id_number_key`
    pub fn column(&self, table: &str) -> Option<String> {
        let (name, suffix) = match self {
            ConstraintViolation::Unique(name) => (name, "_key"),
            ConstraintViolation::ForeignKey(name) => (name, "_fkey"),
            ConstraintViolation::Check(name) => (name, "_check"),
        };
        name.strip_prefix(table)?
            .strip_prefix('_')?
            .strip_suffix(suffix)
            .map(str::to_string)
    }
}

/// Classify `err` when it is an integrity violation
pub fn constraint_violation(err: &sqlx::Error) -> Option<ConstraintViolation> {
    let sqlx::Error::Database(db) = err else {
        return None;
    };
    let constraint = db.constraint().unwrap_or_default().to_string();
    match db.code().as_deref() {
        Some("23505") => Some(ConstraintViolation::Unique(constraint)),
        Some("23503") => Some(ConstraintViolation::ForeignKey(constraint)),
        Some("23514") => Some(ConstraintViolation::Check(constraint)),
        _ => None,
    }
}

/// Result type alias using ApiError
pub type ApiResult<T> = Result<T, ApiError>;
