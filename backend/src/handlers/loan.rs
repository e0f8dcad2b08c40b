//! Unified loan handlers

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;

use crate::error::ApiResult;
use crate::handlers::json_body;
use crate::loan::service::loan_id_from_path;
use crate::loan::{
    CreateLoanResponse, ListLoansQuery, LoanDetail, LoanListItem, LoanService,
};
use crate::middleware::AdminAccess;
use crate::payment::{LoanPayments, PaymentService};

/// List active loans of both variants
pub async fn list_loans(
    State(service): State<Arc<LoanService>>,
    Query(query): Query<ListLoansQuery>,
) -> ApiResult<Json<Vec<LoanListItem>>> {
    let loans = service
        .list_loans(query.loan_type.as_deref(), query.search.as_deref())
        .await?;
    Ok(Json(loans))
}

/// Create a loan together with its borrower and schedule
pub async fn create_loan(
    _admin: AdminAccess,
    State(service): State<Arc<LoanService>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<CreateLoanResponse>)> {
    let payload = json_body(payload)?;
    let created = service.create_loan(&payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get_loan(
    State(service): State<Arc<LoanService>>,
    Path(loan_id): Path<String>,
) -> ApiResult<Json<LoanDetail>> {
    let loan_id = loan_id_from_path(&loan_id)?;
    Ok(Json(service.loan_detail(loan_id).await?))
}

/// Full-field edit of a loan
pub async fn update_loan(
    _admin: AdminAccess,
    State(service): State<Arc<LoanService>>,
    Path(loan_id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<LoanDetail>> {
    let loan_id = loan_id_from_path(&loan_id)?;
    let payload = json_body(payload)?;
    Ok(Json(service.update_loan(loan_id, &payload).await?))
}

/// Payment schedule of a loan; settles overdue payments as a side effect
pub async fn get_loan_payments(
    State(service): State<Arc<PaymentService>>,
    Path(loan_id): Path<String>,
) -> ApiResult<Json<LoanPayments>> {
    let loan_id = loan_id_from_path(&loan_id)?;
    Ok(Json(service.get_payments(loan_id).await?))
}
