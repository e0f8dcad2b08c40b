//! Loan book back office
//!
//! Tracks loans of two product variants (repaid by checks or by standing
//! order), their borrowers and trustees, and the monthly payment schedule.

pub mod config;
pub mod db;
pub mod decimal;
pub mod directory;
pub mod error;
pub mod handlers;
pub mod loan;
pub mod middleware;
pub mod models;
pub mod payment;
pub mod repository;
pub mod routes;
pub mod services;
pub mod state;
