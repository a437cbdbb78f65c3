//! Database models for the role system.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use super::role::Role;

/// A role granted to a user.
///
/// Grants are created by account lifecycle events (registration, business
/// creation, staff linking), never edited directly.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RoleGrant {
    pub user_id: Uuid,
    pub role: Role,
    pub granted_by: Option<Uuid>,
    pub granted_at: DateTime<Utc>,
}
