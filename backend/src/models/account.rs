//! Roles and user profiles

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Named role (Admin, Trustee, Borrower, Donor, ...)
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Role {
    pub id: Uuid,
    pub name: String,
    pub description: String,
}

/// Per-user profile: role assignment and phone number
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub role_id: Option<Uuid>,
    pub phone: Option<String>,
}

/// Create/replace payload for a role
#[derive(Debug, Deserialize, Validate)]
pub struct RoleRequest {
    #[validate(length(min = 1, max = 50, message = "Ensure this field has 1 to 50 characters."))]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Create/replace payload for a user profile
#[derive(Debug, Deserialize, Validate)]
pub struct UserProfileRequest {
    pub user_id: Uuid,
    pub role_id: Option<Uuid>,
    #[validate(length(max = 20, message = "Ensure this field has no more than 20 characters."))]
    pub phone: Option<String>,
}
