//! API handlers for the loan book

pub mod dashboard;
pub mod directory;
pub mod health;
pub mod loan;

pub use dashboard::*;
pub use directory::*;
pub use health::*;
pub use loan::*;

use axum::extract::rejection::JsonRejection;
use axum::Json;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};

/// Unwrap a JSON body, reporting malformed input as a 400 with a `detail`
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

/// Parse an entity id from a path segment; unknown and malformed ids look the same
pub(crate) fn entity_id(raw: &str, entity: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| ApiError::NotFound(format!("{} not found", entity)))
}
