//! Business Type Definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

// ============================================================================
// Business Entity
// ============================================================================

#[derive(Debug, Clone, FromRow, Serialize, utoipa::ToSchema)]
pub struct Business {
    pub id: Uuid,
    pub owner_user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Staff roster entry with the professional's public identity.
#[derive(Debug, Clone, FromRow, Serialize, utoipa::ToSchema)]
pub struct StaffMember {
    pub user_id: Uuid,
    pub username: String,
    pub display_name: String,
    pub added_at: DateTime<Utc>,
}

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct CreateBusinessRequest {
    #[validate(length(min = 2, max = 100, message = "Name must be 2-100 characters"))]
    pub name: String,
    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,
    #[validate(length(max = 200, message = "Address must be at most 200 characters"))]
    pub address: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateBusinessRequest {
    #[validate(length(min = 2, max = 100, message = "Name must be 2-100 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,
    #[validate(length(max = 200, message = "Address must be at most 200 characters"))]
    pub address: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddStaffRequest {
    /// The user to link as a professional at this business.
    pub user_id: Uuid,
}
