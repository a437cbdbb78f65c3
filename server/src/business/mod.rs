//! Business (tenant) management.

pub mod handlers;
pub mod queries;
pub mod types;

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::api::AppState;

pub use queries::{find_business, is_staff};
pub use types::Business;

/// Create business router. All routes require authentication (applied by
/// the parent router).
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::create_business).get(handlers::list_all))
        .route("/{business_id}", get(handlers::get_business))
        .route("/{business_id}", put(handlers::update_business))
        .route(
            "/{business_id}/staff",
            get(handlers::get_staff).post(handlers::add_staff),
        )
        .route(
            "/{business_id}/staff/{user_id}",
            delete(handlers::remove_staff),
        )
}
