//! Entity CRUD handlers

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};

use crate::directory::{
    BorrowerRequest, CheckLoanRequest, DirectoryService, StandingOrderLoanRequest, TrusteeRequest,
};
use crate::error::ApiResult;
use crate::handlers::{entity_id, json_body};
use crate::loan::{Loan, LoanKind};
use crate::middleware::AdminAccess;
use crate::models::{Borrower, Role, RoleRequest, Trustee, UserProfile, UserProfileRequest};

// ===== Roles =====

pub async fn list_roles(State(service): State<Arc<DirectoryService>>) -> ApiResult<Json<Vec<Role>>> {
    Ok(Json(service.list_roles().await?))
}

pub async fn create_role(
    _admin: AdminAccess,
    State(service): State<Arc<DirectoryService>>,
    payload: Result<Json<RoleRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Role>)> {
    let created = service.create_role(json_body(payload)?).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get_role(
    State(service): State<Arc<DirectoryService>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Role>> {
    let id = entity_id(&id, "Role")?;
    Ok(Json(service.get_role(id).await?))
}

pub async fn update_role(
    _admin: AdminAccess,
    State(service): State<Arc<DirectoryService>>,
    Path(id): Path<String>,
    payload: Result<Json<RoleRequest>, JsonRejection>,
) -> ApiResult<Json<Role>> {
    let id = entity_id(&id, "Role")?;
    Ok(Json(service.update_role(id, json_body(payload)?).await?))
}

pub async fn delete_role(
    _admin: AdminAccess,
    State(service): State<Arc<DirectoryService>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = entity_id(&id, "Role")?;
    service.delete_role(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ===== User profiles =====

pub async fn list_user_profiles(State(service): State<Arc<DirectoryService>>) -> ApiResult<Json<Vec<UserProfile>>> {
    Ok(Json(service.list_user_profiles().await?))
}

pub async fn create_user_profile(
    _admin: AdminAccess,
    State(service): State<Arc<DirectoryService>>,
    payload: Result<Json<UserProfileRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<UserProfile>)> {
    let created = service.create_user_profile(json_body(payload)?).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get_user_profile(
    State(service): State<Arc<DirectoryService>>,
    Path(id): Path<String>,
) -> ApiResult<Json<UserProfile>> {
    let id = entity_id(&id, "User profile")?;
    Ok(Json(service.get_user_profile(id).await?))
}

pub async fn update_user_profile(
    _admin: AdminAccess,
    State(service): State<Arc<DirectoryService>>,
    Path(id): Path<String>,
    payload: Result<Json<UserProfileRequest>, JsonRejection>,
) -> ApiResult<Json<UserProfile>> {
    let id = entity_id(&id, "User profile")?;
    Ok(Json(service.update_user_profile(id, json_body(payload)?).await?))
}

pub async fn delete_user_profile(
    _admin: AdminAccess,
    State(service): State<Arc<DirectoryService>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = entity_id(&id, "User profile")?;
    service.delete_user_profile(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ===== Trustees =====

pub async fn list_trustees(State(service): State<Arc<DirectoryService>>) -> ApiResult<Json<Vec<Trustee>>> {
    Ok(Json(service.list_trustees().await?))
}

pub async fn create_trustee(
    _admin: AdminAccess,
    State(service): State<Arc<DirectoryService>>,
    payload: Result<Json<TrusteeRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Trustee>)> {
    let created = service.create_trustee(json_body(payload)?).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get_trustee(
    State(service): State<Arc<DirectoryService>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Trustee>> {
    let id = entity_id(&id, "Trustee")?;
    Ok(Json(service.get_trustee(id).await?))
}

pub async fn update_trustee(
    _admin: AdminAccess,
    State(service): State<Arc<DirectoryService>>,
    Path(id): Path<String>,
    payload: Result<Json<TrusteeRequest>, JsonRejection>,
) -> ApiResult<Json<Trustee>> {
    let id = entity_id(&id, "Trustee")?;
    Ok(Json(service.update_trustee(id, json_body(payload)?).await?))
}

pub async fn delete_trustee(
    _admin: AdminAccess,
    State(service): State<Arc<DirectoryService>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = entity_id(&id, "Trustee")?;
    service.delete_trustee(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ===== Borrowers =====

pub async fn list_borrowers(State(service): State<Arc<DirectoryService>>) -> ApiResult<Json<Vec<Borrower>>> {
    Ok(Json(service.list_borrowers().await?))
}

pub async fn create_borrower(
    _admin: AdminAccess,
    State(service): State<Arc<DirectoryService>>,
    payload: Result<Json<BorrowerRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Borrower>)> {
    let created = service.create_borrower(json_body(payload)?).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get_borrower(
    State(service): State<Arc<DirectoryService>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Borrower>> {
    let id = entity_id(&id, "Borrower")?;
    Ok(Json(service.get_borrower(id).await?))
}

pub async fn update_borrower(
    _admin: AdminAccess,
    State(service): State<Arc<DirectoryService>>,
    Path(id): Path<String>,
    payload: Result<Json<BorrowerRequest>, JsonRejection>,
) -> ApiResult<Json<Borrower>> {
    let id = entity_id(&id, "Borrower")?;
    Ok(Json(service.update_borrower(id, json_body(payload)?).await?))
}

pub async fn delete_borrower(
    _admin: AdminAccess,
    State(service): State<Arc<DirectoryService>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = entity_id(&id, "Borrower")?;
    service.delete_borrower(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ===== Check loans =====

pub async fn list_check_loans(State(service): State<Arc<DirectoryService>>) -> ApiResult<Json<Vec<Loan>>> {
    Ok(Json(service.list_check_loans().await?))
}

pub async fn create_check_loan(
    _admin: AdminAccess,
    State(service): State<Arc<DirectoryService>>,
    payload: Result<Json<CheckLoanRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Loan>)> {
    let created = service.create_check_loan(json_body(payload)?).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get_check_loan(
    State(service): State<Arc<DirectoryService>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Loan>> {
    let id = entity_id(&id, "Loan")?;
    Ok(Json(service.get_check_loan(id).await?))
}

pub async fn update_check_loan(
    _admin: AdminAccess,
    State(service): State<Arc<DirectoryService>>,
    Path(id): Path<String>,
    payload: Result<Json<CheckLoanRequest>, JsonRejection>,
) -> ApiResult<Json<Loan>> {
    let id = entity_id(&id, "Loan")?;
    Ok(Json(service.update_check_loan(id, json_body(payload)?).await?))
}

pub async fn delete_check_loan(
    _admin: AdminAccess,
    State(service): State<Arc<DirectoryService>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = entity_id(&id, "Loan")?;
    service.delete_loan(id, LoanKind::Checks).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ===== Standing order loans =====

pub async fn list_standing_order_loans(State(service): State<Arc<DirectoryService>>) -> ApiResult<Json<Vec<Loan>>> {
    Ok(Json(service.list_standing_order_loans().await?))
}

pub async fn create_standing_order_loan(
    _admin: AdminAccess,
    State(service): State<Arc<DirectoryService>>,
    payload: Result<Json<StandingOrderLoanRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Loan>)> {
    let created = service.create_standing_order_loan(json_body(payload)?).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get_standing_order_loan(
    State(service): State<Arc<DirectoryService>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Loan>> {
    let id = entity_id(&id, "Loan")?;
    Ok(Json(service.get_standing_order_loan(id).await?))
}

pub async fn update_standing_order_loan(
    _admin: AdminAccess,
    State(service): State<Arc<DirectoryService>>,
    Path(id): Path<String>,
    payload: Result<Json<StandingOrderLoanRequest>, JsonRejection>,
) -> ApiResult<Json<Loan>> {
    let id = entity_id(&id, "Loan")?;
    Ok(Json(service.update_standing_order_loan(id, json_body(payload)?).await?))
}

pub async fn delete_standing_order_loan(
    _admin: AdminAccess,
    State(service): State<Arc<DirectoryService>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = entity_id(&id, "Loan")?;
    service.delete_loan(id, LoanKind::StandingOrder).await?;
    Ok(StatusCode::NO_CONTENT)
}
