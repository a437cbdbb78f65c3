//! Database queries for role grants.
//!
//! Runtime queries (no compile-time `DATABASE_URL` required). Grants that
//! must be atomic with another write (registration, staff linking) are
//! issued inside the owning handler's transaction instead.

use sqlx::PgPool;
use tracing::error;
use uuid::Uuid;

use super::models::RoleGrant;
use super::role::Role;

/// Log and return a database error with context.
macro_rules! db_error {
    ($query:expr, $($field:tt)*) => {
        |e| {
            error!(query = $query, $($field)*, error = %e, "Database query failed");
            e
        }
    };
}

/// All roles granted to a user, ascending by grant time.
pub async fn list_granted_roles(pool: &PgPool, user_id: Uuid) -> sqlx::Result<Vec<Role>> {
    sqlx::query_scalar::<_, Role>(
        "SELECT role FROM role_grants WHERE user_id = $1 ORDER BY granted_at ASC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
    .map_err(db_error!("list_granted_roles", user_id = %user_id))
}

/// Full grant rows for a user, including who granted them and when.
pub async fn list_role_grants(pool: &PgPool, user_id: Uuid) -> sqlx::Result<Vec<RoleGrant>> {
    sqlx::query_as::<_, RoleGrant>(
        r"
        SELECT user_id, role, granted_by, granted_at
        FROM role_grants
        WHERE user_id = $1
        ORDER BY granted_at ASC
        ",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
    .map_err(db_error!("list_role_grants", user_id = %user_id))
}

/// Drop the professional grant for a user who no longer staffs any
/// business. A single statement so the check and the delete are atomic.
pub async fn revoke_professional_if_unstaffed(pool: &PgPool, user_id: Uuid) -> sqlx::Result<bool> {
    let result = sqlx::query(
        r"
        DELETE FROM role_grants
        WHERE user_id = $1
          AND role = 'professional'
          AND NOT EXISTS (SELECT 1 FROM business_staff WHERE user_id = $1)
        ",
    )
    .bind(user_id)
    .execute(pool)
    .await
    .map_err(db_error!("revoke_professional_if_unstaffed", user_id = %user_id))?;

    Ok(result.rows_affected() > 0)
}
