//! Business ledger handlers.
//!
//! Payments can be recorded by anyone working the chair (owner or staff,
//! operating at professional rank or above); expenses and all reads are
//! owner territory.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;
use validator::Validate;

use crate::api::AppState;
use crate::auth::AuthUser;
use crate::business::{find_business, is_staff, Business};
use crate::permissions::{InsufficientRole, Role};

use super::queries::{insert_entry, list_entries, summarize};
use super::types::{LedgerEntry, LedgerEntryKind, LedgerSummary, RecordEntryRequest};

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Business not found")]
    BusinessNotFound,

    #[error("Only the business owner can do this")]
    NotOwner,

    #[error("Only staff of this business can record payments")]
    NotBusinessStaff,

    #[error(transparent)]
    Forbidden(#[from] InsufficientRole),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for LedgerError {
    fn into_response(self) -> Response {
        let (status, error) = match &self {
            Self::BusinessNotFound => (StatusCode::NOT_FOUND, "not_found"),
            Self::NotOwner => (StatusCode::FORBIDDEN, "not_owner"),
            Self::NotBusinessStaff => (StatusCode::FORBIDDEN, "not_staff"),
            Self::Forbidden(_) => (StatusCode::FORBIDDEN, "insufficient_role"),
            Self::Validation(_) => (StatusCode::BAD_REQUEST, "validation"),
            Self::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "database"),
        };
        let body = serde_json::json!({"error": error, "message": self.to_string()});
        (status, Json(body)).into_response()
    }
}

async fn load_business(state: &AppState, business_id: Uuid) -> Result<Business, LedgerError> {
    find_business(&state.db, business_id)
        .await?
        .ok_or(LedgerError::BusinessNotFound)
}

fn require_owner_of(auth: &AuthUser, business: &Business) -> Result<(), LedgerError> {
    auth.roles.require(Role::Owner)?;
    if business.owner_user_id != auth.id {
        return Err(LedgerError::NotOwner);
    }
    Ok(())
}

// ============================================================================
// Handlers
// ============================================================================

/// Record a payment or an expense.
///
/// `POST /api/businesses/{business_id}/ledger`
#[tracing::instrument(skip(state, body), fields(user_id = %auth.id))]
pub async fn record_entry(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(business_id): Path<Uuid>,
    Json(body): Json<RecordEntryRequest>,
) -> Result<(StatusCode, Json<LedgerEntry>), LedgerError> {
    body.validate()
        .map_err(|e| LedgerError::Validation(e.to_string()))?;

    let business = load_business(&state, business_id).await?;

    match body.kind {
        LedgerEntryKind::Payment => {
            // Owner working their own chair, or linked staff at
            // professional rank or above.
            auth.roles.require(Role::Professional)?;
            let works_there = business.owner_user_id == auth.id
                || is_staff(&state.db, business_id, auth.id).await?;
            if !works_there {
                return Err(LedgerError::NotBusinessStaff);
            }
        }
        LedgerEntryKind::Expense => require_owner_of(&auth, &business)?,
    }

    let occurred_on = body
        .occurred_on
        .unwrap_or_else(|| Utc::now().date_naive());

    let entry = insert_entry(
        &state.db,
        business_id,
        body.appointment_id,
        auth.id,
        body.kind,
        body.amount_cents,
        &body.description,
        occurred_on,
    )
    .await?;

    tracing::info!(
        business_id = %business_id,
        entry_id = %entry.id,
        kind = ?entry.kind,
        "Ledger entry recorded"
    );

    Ok((StatusCode::CREATED, Json(entry)))
}

/// List a business's ledger entries. Owner only.
///
/// `GET /api/businesses/{business_id}/ledger`
#[tracing::instrument(skip(state), fields(user_id = %auth.id))]
pub async fn get_entries(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(business_id): Path<Uuid>,
) -> Result<Json<Vec<LedgerEntry>>, LedgerError> {
    let business = load_business(&state, business_id).await?;
    require_owner_of(&auth, &business)?;

    Ok(Json(list_entries(&state.db, business_id).await?))
}

/// Totals over a business's ledger. Owner only.
///
/// `GET /api/businesses/{business_id}/ledger/summary`
#[tracing::instrument(skip(state), fields(user_id = %auth.id))]
pub async fn get_summary(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(business_id): Path<Uuid>,
) -> Result<Json<LedgerSummary>, LedgerError> {
    let business = load_business(&state, business_id).await?;
    require_owner_of(&auth, &business)?;

    Ok(Json(summarize(&state.db, business_id).await?))
}
