//! Party and account models shared across the loan book

use serde::{Deserialize, Serialize};
use sqlx::types::chrono::{DateTime, Utc};
use uuid::Uuid;

pub mod account;
pub use account::*;

/// Trustee supervising borrowers and loans for a community
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Trustee {
    pub trustee_id: Uuid,
    pub user_id: Uuid,
    pub community: String,
    pub notes: Option<String>,
}

/// Borrower record; contact fields may be blank when they live on the linked user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Borrower {
    pub borrower_id: Uuid,
    pub user_id: Option<Uuid>,
    pub trustee_id: Option<Uuid>,
    pub id_number: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub created_at: DateTime<Utc>,
}

/// Contact data held by a borrower's linked user identity
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkedUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Phone from the user's profile row, when one exists
    pub phone: Option<String>,
}

impl LinkedUser {
    /// "First Last", trimmed; empty when both parts are blank
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }
}

/// A borrower together with its linked identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BorrowerParty {
    pub borrower: Borrower,
    pub user: Option<LinkedUser>,
}

/// A trustee together with the display fields of its linked user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrusteeParty {
    pub trustee: Trustee,
    pub first_name: String,
}
