//! Middleware for the loan book API
//!
//! Request tracing, security headers and the admin access toggle.

pub mod auth;
mod security;
mod tracing;

pub use auth::{AccessPolicy, AdminAccess};
pub use security::{hsts_header, security_headers};
pub use tracing::{request_tracing, REQUEST_ID_HEADER};
