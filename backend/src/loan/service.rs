//! Loan service layer - list, detail, edit and creation of loans of both variants

use std::sync::Arc;

use serde_json::Value;
use uuid::Uuid;

use crate::decimal::{per_part, to_money};
use crate::error::{ApiError, ApiResult};
use crate::loan::create;
use crate::loan::edit::{EditForm, LoanEdit};
use crate::loan::model::{
    CreateLoanResponse, LoanDetail, LoanKind, LoanListItem, LoanRecord, LoanTerms,
};
use crate::loan::normalize::{matches_search, to_detail, to_list_item};
use crate::repository::LoanRepository;

pub const LOAN_NOT_FOUND: &str = "Loan not found";

/// Loan ids arrive as raw path segments; anything unparseable is simply unknown
pub fn loan_id_from_path(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| ApiError::NotFound(LOAN_NOT_FOUND.to_string()))
}

/// Loan service for the unified loan views
#[derive(Clone)]
pub struct LoanService {
    repository: Arc<dyn LoanRepository>,
    media_base_url: String,
}

impl LoanService {
    pub fn new(repository: Arc<dyn LoanRepository>, media_base_url: impl Into<String>) -> Self {
        Self {
            repository,
            media_base_url: media_base_url.into(),
        }
    }

    /// Active loans of both variants, checks first, filtered by type and free text
    pub async fn list_loans(
        &self,
        type_filter: Option<&str>,
        search: Option<&str>,
    ) -> ApiResult<Vec<LoanListItem>> {
        let mut items = Vec::new();

        for kind in [LoanKind::Checks, LoanKind::StandingOrder] {
            if !kind.admitted_by(type_filter) {
                continue;
            }
            let records = self.repository.list_active(kind).await?;
            items.extend(records.iter().map(to_list_item));
        }

        if let Some(needle) = search {
            items.retain(|item| matches_search(item, needle));
        }

        Ok(items)
    }

    pub async fn loan_detail(&self, loan_id: Uuid) -> ApiResult<LoanDetail> {
        let record = self.find_record(loan_id).await?;
        Ok(to_detail(&record, &self.media_base_url))
    }

    /// Full-field edit. Every problem is reported at once; nothing is written on failure.
    pub async fn update_loan(&self, loan_id: Uuid, payload: &Value) -> ApiResult<LoanDetail> {
        let mut form = EditForm::parse(payload)?;

        if let Some(trustee_id) = form.trustee_id {
            if self.repository.find_trustee(trustee_id).await?.is_none() {
                form.reject_trustee();
            }
        }

        let edit = form.finish()?;
        let record = self.find_record(loan_id).await?;
        let mut loan = record.loan;
        apply_edit(&mut loan.terms, &edit)?;

        loan.amount = to_money(edit.amount);
        loan.start_date = edit.start_date;
        loan.trustee_id = Some(edit.trustee_id);
        loan.status = edit.status.to_storage();

        self.repository.save_loan(&loan).await?;

        tracing::info!(
            loan_id = %loan_id,
            loan_type = loan.kind().as_str(),
            status = ?loan.status,
            "Loan updated"
        );

        self.loan_detail(loan_id).await
    }

    /// Create a loan, upserting its borrower and generating its schedule in one transaction
    pub async fn create_loan(&self, payload: &Value) -> ApiResult<CreateLoanResponse> {
        let new_loan = create::validate(payload)?;

        if self
            .repository
            .find_trustee(new_loan.trustee_id)
            .await?
            .is_none()
        {
            return Err(ApiError::NotFound("Trustee not found".to_string()));
        }

        let draft = create::draft(new_loan)?;
        let loan_id = draft.loan_id;

        let loan = self.repository.create_loan(draft).await.map_err(|err| {
            tracing::error!(loan_id = %loan_id, error = %err, "Loan creation failed");
            ApiError::InternalError(format!("loan creation failed: {}", err))
        })?;

        tracing::info!(
            loan_id = %loan.loan_id,
            borrower_id = %loan.borrower_id,
            loan_type = loan.kind().as_str(),
            "Loan created"
        );

        Ok(CreateLoanResponse {
            loan_id: loan.loan_id,
            loan_type: loan.kind(),
            status: loan.status,
        })
    }

    async fn find_record(&self, loan_id: Uuid) -> ApiResult<LoanRecord> {
        self.repository
            .find_loan(loan_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(LOAN_NOT_FOUND.to_string()))
    }
}

/// Variant-specific part of an edit
fn apply_edit(terms: &mut LoanTerms, edit: &LoanEdit) -> ApiResult<()> {
    match terms {
        LoanTerms::Checks(checks) => {
            checks.num_payments = create::payment_count_i32(edit.number_of_payments)?;
        }
        LoanTerms::StandingOrder(order) => {
            order.monthly_amount = per_part(edit.amount, edit.number_of_payments)
                .ok_or_else(|| ApiError::field("monthly_amount", "Invalid value"))?;
        }
    }
    Ok(())
}
