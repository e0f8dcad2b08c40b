//! Loan normalizer: variant-erased read shapes built from stored loans

use crate::decimal::to_money;
use crate::loan::model::{
    BorrowerView, LoanDetail, LoanDetails, LoanListItem, LoanRecord, LoanTerms, TrusteeView,
};
use crate::loan::status::DisplayStatus;
use crate::models::{BorrowerParty, TrusteeParty};

/// First candidate that is non-blank after trimming, or an empty string
fn first_present<'a>(candidates: impl IntoIterator<Item = Option<&'a str>>) -> String {
    candidates
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|value| !value.is_empty())
        .unwrap_or_default()
        .to_string()
}

/// Borrower contact fields, preferring the borrower's own values over the linked user's
pub fn borrower_view(party: &BorrowerParty) -> BorrowerView {
    let borrower = &party.borrower;
    let user = party.user.as_ref();

    let own_name = format!("{} {}", borrower.first_name.trim(), borrower.last_name.trim());
    let user_name = user.map(|u| u.full_name());

    BorrowerView {
        name: first_present([Some(own_name.as_str()), user_name.as_deref()]),
        phone: first_present([
            Some(borrower.phone.as_str()),
            user.and_then(|u| u.phone.as_deref()),
        ]),
        email: first_present([Some(borrower.email.as_str()), user.map(|u| u.email.as_str())]),
    }
}

/// Trustee display block. The name is the linked user's first name only.
pub fn trustee_view(party: Option<&TrusteeParty>) -> TrusteeView {
    match party {
        Some(party) => TrusteeView {
            name: Some(party.first_name.clone()),
            community: Some(party.trustee.community.clone()),
        },
        None => TrusteeView {
            name: None,
            community: None,
        },
    }
}

/// List shape of a loan
pub fn to_list_item(record: &LoanRecord) -> LoanListItem {
    let loan = &record.loan;
    LoanListItem {
        loan_id: loan.loan_id,
        loan_type: loan.kind(),
        amount: to_money(loan.amount),
        start_date: loan.start_date,
        status: DisplayStatus::from(loan.status),
        borrower: borrower_view(&record.borrower),
        trustee: trustee_view(record.trustee.as_ref()),
    }
}

/// Detail shape of a loan; `media_base_url` turns the stored form reference into a URL
pub fn to_detail(record: &LoanRecord, media_base_url: &str) -> LoanDetail {
    let loan = &record.loan;
    let details = match &loan.terms {
        LoanTerms::Checks(terms) => LoanDetails::Checks {
            num_payments: terms.num_payments,
            check_details: terms.check_details.clone(),
            predefined_schedule: terms.predefined_schedule,
        },
        LoanTerms::StandingOrder(terms) => LoanDetails::StandingOrder {
            monthly_amount: to_money(terms.monthly_amount),
            charge_day: terms.charge_day,
            stop_date: terms.stop_date,
        },
    };

    LoanDetail {
        summary: to_list_item(record),
        created_at: loan.created_at,
        form_file_url: loan
            .form_file
            .as_deref()
            .and_then(|file| form_file_url(media_base_url, file)),
        trustee_id: loan.trustee_id,
        details,
    }
}

/// Absolute URL of an uploaded form
pub fn form_file_url(media_base_url: &str, file: &str) -> Option<String> {
    let file = file.trim();
    if file.is_empty() {
        return None;
    }
    if file.starts_with("http://") || file.starts_with("https://") {
        return Some(file.to_string());
    }
    Some(format!(
        "{}/{}",
        media_base_url.trim_end_matches('/'),
        file.trim_start_matches('/')
    ))
}

/// Whether a normalized loan matches a free-text search
pub fn matches_search(item: &LoanListItem, needle: &str) -> bool {
    let needle = needle.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }

    [
        Some(item.borrower.name.as_str()),
        Some(item.borrower.phone.as_str()),
        Some(item.borrower.email.as_str()),
        item.trustee.name.as_deref(),
        item.trustee.community.as_deref(),
    ]
    .into_iter()
    .map(|field| field.unwrap_or_default().to_lowercase())
    .any(|field| field.contains(&needle))
}
