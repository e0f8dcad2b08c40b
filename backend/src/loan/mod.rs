//! Loans of both product variants behind one unified view

pub mod create;
pub mod edit;
pub mod model;
pub mod normalize;
pub mod service;
pub mod status;

pub use model::*;
pub use service::LoanService;
pub use status::DisplayStatus;
