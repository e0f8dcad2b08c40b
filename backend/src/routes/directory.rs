//! Entity CRUD route definitions

use axum::{routing::get, Router};

use crate::handlers::*;
use crate::state::AppState;

pub fn directory_routes() -> Router<AppState> {
    Router::new()
        .route("/api/roles/", get(list_roles).post(create_role))
        .route(
            "/api/roles/:id/",
            get(get_role).put(update_role).delete(delete_role),
        )
        .route(
            "/api/user-profiles/",
            get(list_user_profiles).post(create_user_profile),
        )
        .route(
            "/api/user-profiles/:id/",
            get(get_user_profile)
                .put(update_user_profile)
                .delete(delete_user_profile),
        )
        .route("/api/trustees/", get(list_trustees).post(create_trustee))
        .route(
            "/api/trustees/:id/",
            get(get_trustee).put(update_trustee).delete(delete_trustee),
        )
        .route("/api/borrowers/", get(list_borrowers).post(create_borrower))
        .route(
            "/api/borrowers/:id/",
            get(get_borrower).put(update_borrower).delete(delete_borrower),
        )
        .route(
            "/api/loans/checks/",
            get(list_check_loans).post(create_check_loan),
        )
        .route(
            "/api/loans/checks/:id/",
            get(get_check_loan)
                .put(update_check_loan)
                .delete(delete_check_loan),
        )
        .route(
            "/api/loans/standing-order/",
            get(list_standing_order_loans).post(create_standing_order_loan),
        )
        .route(
            "/api/loans/standing-order/:id/",
            get(get_standing_order_loan)
                .put(update_standing_order_loan)
                .delete(delete_standing_order_loan),
        )
}
