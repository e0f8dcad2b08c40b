//! Access control middleware
//!
//! The loan book runs in one of two modes. In `allow_any` mode every request
//! passes. In `admin` mode mutating endpoints require the configured admin
//! bearer token.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use std::sync::Arc;

use crate::config::{ApiAccess, Config};
use crate::error::ApiError;

/// Access mode plus the token accepted as admin
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    pub mode: ApiAccess,
    admin_token: Option<String>,
}

impl AccessPolicy {
    pub fn new(mode: ApiAccess, admin_token: Option<String>) -> Self {
        Self { mode, admin_token }
    }

    pub fn allow_any() -> Self {
        Self::new(ApiAccess::AllowAny, None)
    }

    pub fn admin_only(token: impl Into<String>) -> Self {
        Self::new(ApiAccess::AdminOnly, Some(token.into()))
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.api_access, config.admin_token.clone())
    }

    /// Whether `token` is the admin token
    pub fn accepts(&self, token: &str) -> bool {
        match &self.admin_token {
            Some(expected) => constant_time_eq(expected.as_bytes(), token.as_bytes()),
            None => false,
        }
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Extractor guarding mutating endpoints
///
/// # Example
///
/// ```rust,ignore
/// async fn delete_role(_admin: AdminAccess, Path(id): Path<Uuid>) -> ApiResult<StatusCode> {
///     ...
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct AdminAccess;

#[async_trait]
impl<S> FromRequestParts<S> for AdminAccess
where
    Arc<AccessPolicy>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let policy = Arc::<AccessPolicy>::from_ref(state);
        if policy.mode == ApiAccess::AllowAny {
            return Ok(AdminAccess);
        }

        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| {
                    ApiError::Unauthorized(
                        "Authentication credentials were not provided.".to_string(),
                    )
                })?;

        if !policy.accepts(bearer.token()) {
            tracing::warn!(path = %parts.uri.path(), "Rejected admin token");
            return Err(ApiError::Forbidden(
                "You do not have permission to perform this action.".to_string(),
            ));
        }

        Ok(AdminAccess)
    }
}
