//! Per-business payment and expense tracking.

pub mod handlers;
pub mod queries;
pub mod types;

use axum::{
    routing::{get, post},
    Router,
};

use crate::api::AppState;

pub use types::{LedgerEntry, LedgerEntryKind, LedgerSummary};

/// Create ledger router, nested under
/// `/api/businesses/{business_id}/ledger`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::record_entry).get(handlers::get_entries))
        .route("/summary", get(handlers::get_summary))
}
