//! HTTP tests for the unified loan endpoints

mod common;

use axum::http::{Method, StatusCode};
use rust_decimal_macros::dec;
use serde_json::json;
use uuid::Uuid;

use common::{
    create_loan, get, loan_payload, post, put, send_raw, test_app, InMemoryLoanRepository,
};
use loanbook_server::loan::{LoanStatus, LoanTerms};
use loanbook_server::middleware::AccessPolicy;
use loanbook_server::models::LinkedUser;

fn edit_payload(trustee_id: Uuid) -> serde_json::Value {
    json!({
        "amount": "1500.00",
        "start_date": "2025-02-01",
        "number_of_payments": 10,
        "trustee_id": trustee_id,
        "status": "ACTIVE"
    })
}

#[tokio::test]
async fn created_checks_loan_appears_in_list() {
    let repo = InMemoryLoanRepository::new();
    let trustee_id = repo.seed_trustee("Moshe", "Ramot");
    let app = test_app(repo.clone(), AccessPolicy::allow_any());

    let (status, created) = post(
        &app,
        "/api/loans/",
        loan_payload("checks", trustee_id, "123456789", "052-1111111"),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["loan_type"], "checks");
    assert_eq!(created["status"], "ACTIVE");

    let (status, list) = get(&app, "/api/loans/").await;
    assert_eq!(status, StatusCode::OK);
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["loan_id"], created["loan_id"]);
    assert_eq!(list[0]["loan_type"], "checks");
    assert_eq!(list[0]["amount"], "1200.00");
    assert_eq!(list[0]["status"], "ACTIVE");
    assert_eq!(list[0]["start_date"], "2025-01-01");
    assert_eq!(list[0]["borrower"]["name"], "Avi Cohen");
    assert_eq!(list[0]["trustee"]["name"], "Moshe");
    assert_eq!(list[0]["trustee"]["community"], "Ramot");
}

#[tokio::test]
async fn list_hides_loans_not_stored_as_active() {
    let repo = InMemoryLoanRepository::new();
    let trustee_id = repo.seed_trustee("Moshe", "Ramot");
    let app = test_app(repo.clone(), AccessPolicy::allow_any());

    let paid = create_loan(&app, loan_payload("checks", trustee_id, "1", "050")).await;
    let pending = create_loan(&app, loan_payload("standing_order", trustee_id, "2", "050")).await;
    let active = create_loan(&app, loan_payload("checks", trustee_id, "3", "050")).await;
    repo.set_status(paid, LoanStatus::Paid);
    repo.set_status(pending, LoanStatus::Pending);

    let (_, list) = get(&app, "/api/loans/").await;
    let ids: Vec<&str> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["loan_id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec![active.to_string().as_str()]);

    let (status, detail) = get(&app, &format!("/api/loans/{}/", paid)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["status"], "CLOSED");

    let (_, detail) = get(&app, &format!("/api/loans/{}/", pending)).await;
    assert_eq!(detail["status"], "ACTIVE");
}

#[tokio::test]
async fn type_filter_and_search() {
    let repo = InMemoryLoanRepository::new();
    let ramot = repo.seed_trustee("Moshe", "Ramot");
    let gilo = repo.seed_trustee("David", "Gilo");
    let app = test_app(repo.clone(), AccessPolicy::allow_any());

    create_loan(&app, loan_payload("checks", ramot, "111", "052-1111111")).await;
    let mut order = loan_payload("standing_order", gilo, "222", "054-2222222");
    order["borrower"]["first_name"] = json!("Sara");
    order["borrower"]["last_name"] = json!("Levi");
    order["borrower"]["email"] = json!("sara@example.com");
    create_loan(&app, order).await;

    let count = |body: &serde_json::Value| body.as_array().unwrap().len();

    let (_, all) = get(&app, "/api/loans/?type=all").await;
    assert_eq!(count(&all), 2);
    assert_eq!(all[0]["loan_type"], "checks");
    assert_eq!(all[1]["loan_type"], "standing_order");

    let (_, checks) = get(&app, "/api/loans/?type=checks").await;
    assert_eq!(count(&checks), 1);
    assert_eq!(checks[0]["loan_type"], "checks");

    for filter in ["standing_orders", "standing_order"] {
        let (_, orders) = get(&app, &format!("/api/loans/?type={}", filter)).await;
        assert_eq!(count(&orders), 1, "{}", filter);
        assert_eq!(orders[0]["loan_type"], "standing_order");
    }

    let (_, none) = get(&app, "/api/loans/?type=mortgage").await;
    assert_eq!(count(&none), 0);

    let (_, by_name) = get(&app, "/api/loans/?search=LEVI").await;
    assert_eq!(count(&by_name), 1);
    assert_eq!(by_name[0]["borrower"]["name"], "Sara Levi");

    let (_, by_community) = get(&app, "/api/loans/?search=ramot").await;
    assert_eq!(count(&by_community), 1);
    assert_eq!(by_community[0]["trustee"]["community"], "Ramot");

    let (_, by_phone) = get(&app, "/api/loans/?type=checks&search=2222").await;
    assert_eq!(count(&by_phone), 0);
}

#[tokio::test]
async fn blank_borrower_fields_fall_back_to_linked_user() {
    let repo = InMemoryLoanRepository::new();
    let trustee_id = repo.seed_trustee("Moshe", "Ramot");
    let app = test_app(repo.clone(), AccessPolicy::allow_any());

    let mut payload = loan_payload("checks", trustee_id, "999", "");
    payload["borrower"]["first_name"] = json!("");
    payload["borrower"]["last_name"] = json!("");
    payload["borrower"]["email"] = json!("");
    let loan_id = create_loan(&app, payload).await;
    repo.link_user(
        "999",
        LinkedUser {
            first_name: "Dana".to_string(),
            last_name: "Katz".to_string(),
            email: "dana@example.com".to_string(),
            phone: Some("050-7777777".to_string()),
        },
    );

    let (_, detail) = get(&app, &format!("/api/loans/{}/", loan_id)).await;
    assert_eq!(detail["borrower"]["name"], "Dana Katz");
    assert_eq!(detail["borrower"]["phone"], "050-7777777");
    assert_eq!(detail["borrower"]["email"], "dana@example.com");
}

#[tokio::test]
async fn detail_shape_carries_variant_fields() {
    let repo = InMemoryLoanRepository::new();
    let trustee_id = repo.seed_trustee("Moshe", "Ramot");
    let app = test_app(repo.clone(), AccessPolicy::allow_any());

    let mut payload = loan_payload("standing_order", trustee_id, "321", "050");
    payload["loan"]["start_date"] = json!("2025-03-15");
    payload["loan"]["form_file"] = json!("forms/signed.pdf");
    let loan_id = create_loan(&app, payload).await;

    let (status, detail) = get(&app, &format!("/api/loans/{}/", loan_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["loan_type"], "standing_order");
    assert_eq!(detail["trustee_id"], trustee_id.to_string());
    assert_eq!(
        detail["form_file_url"],
        "http://localhost:8000/media/forms/signed.pdf"
    );
    assert_eq!(detail["details"]["monthly_amount"], "100.00");
    assert_eq!(detail["details"]["charge_day"], 15);
    assert!(detail["details"]["stop_date"].is_null());
    assert!(detail["created_at"].is_string());
}

#[tokio::test]
async fn unknown_loan_is_not_found() {
    let repo = InMemoryLoanRepository::new();
    let app = test_app(repo, AccessPolicy::allow_any());

    for path in [
        format!("/api/loans/{}/", Uuid::new_v4()),
        "/api/loans/12345/".to_string(),
        format!("/api/loans/{}/payments", Uuid::new_v4()),
    ] {
        let (status, body) = get(&app, &path).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{}", path);
        assert_eq!(body, json!({ "detail": "Loan not found" }));
    }
}

#[tokio::test]
async fn update_with_zero_amount_reports_only_amount_and_changes_nothing() {
    let repo = InMemoryLoanRepository::new();
    let trustee_id = repo.seed_trustee("Moshe", "Ramot");
    let app = test_app(repo.clone(), AccessPolicy::allow_any());
    let loan_id = create_loan(&app, loan_payload("checks", trustee_id, "1", "050")).await;
    let before = repo.loan(loan_id).unwrap();

    let mut payload = edit_payload(trustee_id);
    payload["amount"] = json!(0);
    let (status, body) = put(&app, &format!("/api/loans/{}/", loan_id), payload).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "amount": ["Must be greater than 0"] }));
    assert_eq!(repo.loan(loan_id).unwrap(), before);
}

#[tokio::test]
async fn update_with_unexpected_field_is_rejected() {
    let repo = InMemoryLoanRepository::new();
    let trustee_id = repo.seed_trustee("Moshe", "Ramot");
    let app = test_app(repo.clone(), AccessPolicy::allow_any());
    let loan_id = create_loan(&app, loan_payload("checks", trustee_id, "1", "050")).await;

    let mut payload = edit_payload(trustee_id);
    payload["foo"] = json!("bar");
    let (status, body) = put(&app, &format!("/api/loans/{}/", loan_id), payload).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["foo"], json!(["Unexpected field"]));
}

#[tokio::test]
async fn update_collects_every_field_error() {
    let repo = InMemoryLoanRepository::new();
    let trustee_id = repo.seed_trustee("Moshe", "Ramot");
    let app = test_app(repo.clone(), AccessPolicy::allow_any());
    let loan_id = create_loan(&app, loan_payload("checks", trustee_id, "1", "050")).await;

    let payload = json!({
        "amount": "-3",
        "start_date": "2025-02-01",
        "number_of_payments": 0,
        "trustee_id": Uuid::new_v4(),
        "status": "LATE"
    });
    let (status, body) = put(&app, &format!("/api/loans/{}/", loan_id), payload).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["amount"], json!(["Must be greater than 0"]));
    assert_eq!(body["number_of_payments"], json!(["Must be at least 1"]));
    assert_eq!(body["trustee_id"], json!(["Trustee not found"]));
    assert_eq!(body["status"], json!(["\"LATE\" is not a valid choice."]));
    assert!(body.get("start_date").is_none());
}

#[tokio::test]
async fn valid_update_of_unknown_loan_is_not_found() {
    let repo = InMemoryLoanRepository::new();
    let trustee_id = repo.seed_trustee("Moshe", "Ramot");
    let app = test_app(repo, AccessPolicy::allow_any());

    let (status, body) = put(
        &app,
        &format!("/api/loans/{}/", Uuid::new_v4()),
        edit_payload(trustee_id),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Loan not found");
}

#[tokio::test]
async fn update_applies_fields_and_maps_status() {
    let repo = InMemoryLoanRepository::new();
    let ramot = repo.seed_trustee("Moshe", "Ramot");
    let gilo = repo.seed_trustee("David", "Gilo");
    let app = test_app(repo.clone(), AccessPolicy::allow_any());
    let loan_id = create_loan(&app, loan_payload("checks", ramot, "1", "050")).await;

    let mut payload = edit_payload(gilo);
    payload["status"] = json!("CLOSED");
    let (status, detail) = put(&app, &format!("/api/loans/{}/", loan_id), payload).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["amount"], "1500.00");
    assert_eq!(detail["start_date"], "2025-02-01");
    assert_eq!(detail["status"], "CLOSED");
    assert_eq!(detail["trustee"]["community"], "Gilo");
    assert_eq!(detail["details"]["num_payments"], 10);

    let stored = repo.loan(loan_id).unwrap();
    assert_eq!(stored.status, LoanStatus::Paid);
    assert_eq!(stored.trustee_id, Some(gilo));

    let mut overdue = edit_payload(gilo);
    overdue["status"] = json!("OVERDUE");
    let (status, detail) = put(&app, &format!("/api/loans/{}/", loan_id), overdue).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["status"], "ACTIVE");
    assert_eq!(repo.loan(loan_id).unwrap().status, LoanStatus::Active);
}

#[tokio::test]
async fn standing_order_update_recomputes_monthly_amount() {
    let repo = InMemoryLoanRepository::new();
    let trustee_id = repo.seed_trustee("Moshe", "Ramot");
    let app = test_app(repo.clone(), AccessPolicy::allow_any());
    let loan_id = create_loan(&app, loan_payload("standing_order", trustee_id, "1", "050")).await;

    let (status, detail) = put(
        &app,
        &format!("/api/loans/{}/", loan_id),
        edit_payload(trustee_id),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["details"]["monthly_amount"], "150.00");

    match repo.loan(loan_id).unwrap().terms {
        LoanTerms::StandingOrder(terms) => assert_eq!(terms.monthly_amount, dec!(150)),
        other => panic!("unexpected terms {:?}", other),
    }
}

#[tokio::test]
async fn borrower_upsert_keeps_one_row_with_latest_phone() {
    let repo = InMemoryLoanRepository::new();
    let trustee_id = repo.seed_trustee("Moshe", "Ramot");
    let app = test_app(repo.clone(), AccessPolicy::allow_any());

    create_loan(&app, loan_payload("checks", trustee_id, "123456789", "052-1111111")).await;
    create_loan(
        &app,
        loan_payload("standing_order", trustee_id, "123456789", "054-9999999"),
    )
    .await;

    let borrowers = repo.borrowers();
    assert_eq!(borrowers.len(), 1);
    assert_eq!(borrowers[0].phone, "054-9999999");
    assert_eq!(repo.loans().len(), 2);
    assert!(repo
        .loans()
        .iter()
        .all(|loan| loan.borrower_id == borrowers[0].borrower_id));
}

#[tokio::test]
async fn creation_validation_errors() {
    let repo = InMemoryLoanRepository::new();
    let trustee_id = repo.seed_trustee("Moshe", "Ramot");
    let app = test_app(repo.clone(), AccessPolicy::allow_any());

    let mut payload = loan_payload("mortgage", trustee_id, "1", "050");
    payload["loan"]["amount"] = json!("0");
    payload["loan"]["number_of_payments"] = json!(0);
    payload["loan"]["start_date"] = json!("2025/01/01");
    let (status, body) = post(&app, "/api/loans/", payload).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["loan_type"], json!(["Invalid loan type"]));
    assert_eq!(body["amount"], json!(["Must be greater than 0"]));
    assert_eq!(body["number_of_payments"], json!(["Must be at least 1"]));
    assert_eq!(
        body["start_date"],
        json!(["Date has wrong format. Use YYYY-MM-DD."])
    );
    assert!(repo.loans().is_empty());
    assert!(repo.borrowers().is_empty());
}

#[tokio::test]
async fn creation_with_unknown_trustee_is_not_found() {
    let repo = InMemoryLoanRepository::new();
    let app = test_app(repo.clone(), AccessPolicy::allow_any());

    let (status, body) = post(
        &app,
        "/api/loans/",
        loan_payload("checks", Uuid::new_v4(), "1", "050"),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "detail": "Trustee not found" }));
    assert!(repo.borrowers().is_empty());
}

#[tokio::test]
async fn creation_failure_is_generic_and_writes_nothing() {
    let repo = InMemoryLoanRepository::new();
    let trustee_id = repo.seed_trustee("Moshe", "Ramot");
    repo.fail_writes();
    let app = test_app(repo.clone(), AccessPolicy::allow_any());

    let (status, body) = post(
        &app,
        "/api/loans/",
        loan_payload("checks", trustee_id, "1", "050"),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "detail": "An error occurred" }));
    assert!(repo.loans().is_empty());
    assert!(repo.borrowers().is_empty());
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let repo = InMemoryLoanRepository::new();
    let app = test_app(repo, AccessPolicy::allow_any());

    let (status, body) = send_raw(&app, Method::POST, "/api/loans/", "{\"loan_type\": ").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn mistyped_creation_fields_are_reported_per_field() {
    let repo = InMemoryLoanRepository::new();
    let trustee_id = repo.seed_trustee("Moshe", "Ramot");
    let app = test_app(repo.clone(), AccessPolicy::allow_any());

    let mut payload = loan_payload("checks", trustee_id, "1", "050");
    payload["trustee_id"] = json!("abc");
    payload["loan"]["amount"] = json!(0);
    let (status, body) = post(&app, "/api/loans/", payload).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({
            "amount": ["Must be greater than 0"],
            "trustee_id": ["Must be a valid UUID."]
        })
    );
    assert!(repo.loans().is_empty());
}

#[tokio::test]
async fn amount_too_large_for_storage_is_a_field_error() {
    let repo = InMemoryLoanRepository::new();
    let trustee_id = repo.seed_trustee("Moshe", "Ramot");
    let app = test_app(repo.clone(), AccessPolicy::allow_any());

    let mut payload = loan_payload("checks", trustee_id, "1", "050");
    payload["loan"]["amount"] = json!("10000000000");
    let (status, body) = post(&app, "/api/loans/", payload).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["amount"].is_array());

    let loan_id = create_loan(&app, loan_payload("checks", trustee_id, "2", "050")).await;
    let mut edit = edit_payload(trustee_id);
    edit["amount"] = json!(1e12);
    let (status, body) = put(&app, &format!("/api/loans/{}/", loan_id), edit).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["amount"].is_array());
}

#[tokio::test]
async fn small_amount_over_many_payments_is_stored() {
    let repo = InMemoryLoanRepository::new();
    let trustee_id = repo.seed_trustee("Moshe", "Ramot");
    let app = test_app(repo.clone(), AccessPolicy::allow_any());

    let mut payload = loan_payload("checks", trustee_id, "1", "050");
    payload["loan"]["amount"] = json!("6.00");
    payload["loan"]["number_of_payments"] = json!(1200);
    create_loan(&app, payload).await;

    let payments = repo.payments();
    assert_eq!(payments.len(), 1200);
    assert!(payments.iter().all(|p| p.amount >= dec!(0)));
    let total: rust_decimal::Decimal = payments.iter().map(|p| p.amount).sum();
    assert_eq!(total, dec!(6.00));
}
