//! Ledger Type Definitions

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// What a ledger entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "ledger_entry_kind", rename_all = "lowercase")]
pub enum LedgerEntryKind {
    /// Money in: a client paid for a service.
    Payment,
    /// Money out: rent, supplies, wages.
    Expense,
}

/// Ledger entry row.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LedgerEntry {
    pub id: Uuid,
    pub business_id: Uuid,
    pub appointment_id: Option<Uuid>,
    pub recorded_by: Uuid,
    pub kind: LedgerEntryKind,
    pub amount_cents: i64,
    pub description: String,
    pub occurred_on: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// Totals over a business ledger.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct LedgerSummary {
    pub payments_cents: i64,
    pub expenses_cents: i64,
    pub net_cents: i64,
    pub entry_count: i64,
}

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct RecordEntryRequest {
    pub kind: LedgerEntryKind,
    /// Amount in cents; always positive, the kind carries the sign.
    #[validate(range(min = 1, message = "Amount must be positive"))]
    pub amount_cents: i64,
    #[validate(length(min = 1, max = 200, message = "Description must be 1-200 characters"))]
    pub description: String,
    /// Optional appointment this payment settles.
    pub appointment_id: Option<Uuid>,
    /// Defaults to today when omitted.
    pub occurred_on: Option<NaiveDate>,
}
