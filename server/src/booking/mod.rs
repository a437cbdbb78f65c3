//! Appointment booking.

pub mod conflict;
pub mod handlers;
pub mod queries;
pub mod types;

use axum::{
    routing::{get, post},
    Router,
};

use crate::api::AppState;

pub use types::{Appointment, AppointmentStatus};

/// Create appointment router. All routes require authentication (applied
/// by the parent router).
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::create_appointment))
        .route("/{appointment_id}", get(handlers::get_appointment))
        .route("/{appointment_id}/cancel", post(handlers::cancel_appointment))
        .route(
            "/{appointment_id}/complete",
            post(handlers::complete_appointment),
        )
}
