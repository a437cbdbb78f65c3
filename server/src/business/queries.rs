//! Database queries for businesses and staff links.

use sqlx::PgPool;
use tracing::error;
use uuid::Uuid;

use super::types::{Business, StaffMember};

/// Log and return a database error with context.
macro_rules! db_error {
    ($query:expr, $($field:tt)*) => {
        |e| {
            error!(query = $query, $($field)*, error = %e, "Database query failed");
            e
        }
    };
}

/// Find a business by ID.
pub async fn find_business(pool: &PgPool, id: Uuid) -> sqlx::Result<Option<Business>> {
    sqlx::query_as::<_, Business>("SELECT * FROM businesses WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(db_error!("find_business", business_id = %id))
}

/// List all businesses, newest first.
pub async fn list_businesses(pool: &PgPool) -> sqlx::Result<Vec<Business>> {
    sqlx::query_as::<_, Business>("SELECT * FROM businesses ORDER BY created_at DESC")
        .fetch_all(pool)
        .await
}

/// The staff roster of a business, in link order.
pub async fn list_staff(pool: &PgPool, business_id: Uuid) -> sqlx::Result<Vec<StaffMember>> {
    sqlx::query_as::<_, StaffMember>(
        r"
        SELECT bs.user_id, u.username, u.display_name, bs.added_at
        FROM business_staff bs
        INNER JOIN users u ON u.id = bs.user_id
        WHERE bs.business_id = $1
        ORDER BY bs.added_at ASC
        ",
    )
    .bind(business_id)
    .fetch_all(pool)
    .await
    .map_err(db_error!("list_staff", business_id = %business_id))
}

/// Whether a user is linked as staff at a business.
pub async fn is_staff(pool: &PgPool, business_id: Uuid, user_id: Uuid) -> sqlx::Result<bool> {
    let result: (bool,) = sqlx::query_as(
        "SELECT EXISTS(SELECT 1 FROM business_staff WHERE business_id = $1 AND user_id = $2)",
    )
    .bind(business_id)
    .bind(user_id)
    .fetch_one(pool)
    .await
    .map_err(db_error!("is_staff", business_id = %business_id, user_id = %user_id))?;

    Ok(result.0)
}

/// Remove a staff link. Returns whether a row was removed.
pub async fn remove_staff_link(
    pool: &PgPool,
    business_id: Uuid,
    user_id: Uuid,
) -> sqlx::Result<bool> {
    let result = sqlx::query("DELETE FROM business_staff WHERE business_id = $1 AND user_id = $2")
        .bind(business_id)
        .bind(user_id)
        .execute(pool)
        .await
        .map_err(db_error!("remove_staff_link", business_id = %business_id, user_id = %user_id))?;

    Ok(result.rows_affected() > 0)
}
