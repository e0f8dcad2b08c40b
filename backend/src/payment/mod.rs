//! Loan payments: schedule generation and the payments view

pub mod model;
pub mod schedule;
pub mod service;

pub use model::*;
pub use service::PaymentService;
