//! Database queries for the business ledger.

use chrono::NaiveDate;
use sqlx::PgPool;
use tracing::error;
use uuid::Uuid;

use super::types::{LedgerEntry, LedgerEntryKind, LedgerSummary};

/// Log and return a database error with context.
macro_rules! db_error {
    ($query:expr, $($field:tt)*) => {
        |e| {
            error!(query = $query, $($field)*, error = %e, "Database query failed");
            e
        }
    };
}

/// Record a ledger entry.
#[allow(clippy::too_many_arguments)]
pub async fn insert_entry(
    pool: &PgPool,
    business_id: Uuid,
    appointment_id: Option<Uuid>,
    recorded_by: Uuid,
    kind: LedgerEntryKind,
    amount_cents: i64,
    description: &str,
    occurred_on: NaiveDate,
) -> sqlx::Result<LedgerEntry> {
    sqlx::query_as::<_, LedgerEntry>(
        r"
        INSERT INTO ledger_entries
            (business_id, appointment_id, recorded_by, kind, amount_cents, description, occurred_on)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        ",
    )
    .bind(business_id)
    .bind(appointment_id)
    .bind(recorded_by)
    .bind(kind)
    .bind(amount_cents)
    .bind(description)
    .bind(occurred_on)
    .fetch_one(pool)
    .await
    .map_err(db_error!("insert_entry", business_id = %business_id))
}

/// Entries for a business, newest first.
pub async fn list_entries(pool: &PgPool, business_id: Uuid) -> sqlx::Result<Vec<LedgerEntry>> {
    sqlx::query_as::<_, LedgerEntry>(
        r"
        SELECT * FROM ledger_entries
        WHERE business_id = $1
        ORDER BY occurred_on DESC, created_at DESC
        ",
    )
    .bind(business_id)
    .fetch_all(pool)
    .await
    .map_err(db_error!("list_entries", business_id = %business_id))
}

#[derive(sqlx::FromRow)]
struct SummaryRow {
    payments_cents: i64,
    expenses_cents: i64,
    entry_count: i64,
}

/// Totals per kind and overall entry count for a business.
pub async fn summarize(pool: &PgPool, business_id: Uuid) -> sqlx::Result<LedgerSummary> {
    let row: SummaryRow = sqlx::query_as(
        r"
        SELECT
            COALESCE(SUM(amount_cents) FILTER (WHERE kind = 'payment'), 0) AS payments_cents,
            COALESCE(SUM(amount_cents) FILTER (WHERE kind = 'expense'), 0) AS expenses_cents,
            COUNT(*) AS entry_count
        FROM ledger_entries
        WHERE business_id = $1
        ",
    )
    .bind(business_id)
    .fetch_one(pool)
    .await
    .map_err(db_error!("summarize", business_id = %business_id))?;

    Ok(LedgerSummary {
        payments_cents: row.payments_cents,
        expenses_cents: row.expenses_cents,
        net_cents: row.payments_cents - row.expenses_cents,
        entry_count: row.entry_count,
    })
}
