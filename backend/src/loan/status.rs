//! Mapping between the storage status vocabulary and the one callers see
//!
//! | storage  | display |     | display | storage |
//! |----------|---------|     |---------|---------|
//! | PENDING  | ACTIVE  |     | ACTIVE  | ACTIVE  |
//! | ACTIVE   | ACTIVE  |     | CLOSED  | PAID    |
//! | PAID     | CLOSED  |     | OVERDUE | ACTIVE  |
//! | REJECTED | ACTIVE  |
//!
//! PENDING and REJECTED have no display value of their own yet, and OVERDUE
//! has no storage value; both directions are lossy until the status model
//! is settled.

use serde::{Deserialize, Serialize};

use crate::loan::model::LoanStatus;

/// Status vocabulary exposed to API callers
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum DisplayStatus {
    Active,
    Closed,
    Overdue,
}

impl DisplayStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayStatus::Active => "ACTIVE",
            DisplayStatus::Closed => "CLOSED",
            DisplayStatus::Overdue => "OVERDUE",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "ACTIVE" => Some(DisplayStatus::Active),
            "CLOSED" => Some(DisplayStatus::Closed),
            "OVERDUE" => Some(DisplayStatus::Overdue),
            _ => None,
        }
    }

    /// Storage value written when a caller submits this status
    pub fn to_storage(self) -> LoanStatus {
        match self {
            DisplayStatus::Active | DisplayStatus::Overdue => LoanStatus::Active,
            DisplayStatus::Closed => LoanStatus::Paid,
        }
    }
}

impl From<LoanStatus> for DisplayStatus {
    fn from(status: LoanStatus) -> Self {
        match status {
            LoanStatus::Paid => DisplayStatus::Closed,
            LoanStatus::Pending | LoanStatus::Active | LoanStatus::Rejected => {
                DisplayStatus::Active
            }
        }
    }
}
