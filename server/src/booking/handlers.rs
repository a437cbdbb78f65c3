//! Appointment booking handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bk_common::TimeSlot;
use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use uuid::Uuid;
use validator::Validate;

use crate::api::AppState;
use crate::auth::AuthUser;
use crate::business::{find_business, is_staff};
use crate::permissions::{has_permission, InsufficientRole, Role};

use super::conflict::find_conflict;
use super::queries::{
    find_appointment, list_appointments_for_client, list_appointments_for_professional,
    load_conflict_candidates, set_appointment_status,
};
use super::types::{Appointment, AppointmentStatus, CreateAppointmentRequest};

/// Advisory lock seed for appointment creation (see db layer docs).
const APPOINTMENT_CREATE_LOCK_SEED: i32 = 61;

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug, Error)]
pub enum BookingError {
    #[error("Appointment not found")]
    NotFound,

    #[error("Business not found")]
    BusinessNotFound,

    #[error("Professional does not work at this business")]
    ProfessionalNotAtBusiness,

    #[error("The requested slot conflicts with an existing appointment")]
    SlotConflict {
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
    },

    #[error("Appointments cannot start in the past")]
    SlotInPast,

    #[error("Appointments cannot be booked more than {0} days ahead")]
    HorizonExceeded(i64),

    #[error(transparent)]
    InvalidSlot(#[from] bk_common::Error),

    #[error("Not your appointment")]
    NotYours,

    #[error("Appointment is already cancelled")]
    AlreadyCancelled,

    #[error("Appointment is not open")]
    InvalidTransition,

    #[error(transparent)]
    Forbidden(#[from] InsufficientRole),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for BookingError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::NotFound => (
                StatusCode::NOT_FOUND,
                serde_json::json!({"error": "not_found", "message": self.to_string()}),
            ),
            Self::BusinessNotFound => (
                StatusCode::NOT_FOUND,
                serde_json::json!({"error": "business_not_found", "message": self.to_string()}),
            ),
            Self::ProfessionalNotAtBusiness => (
                StatusCode::BAD_REQUEST,
                serde_json::json!({"error": "professional_not_at_business", "message": self.to_string()}),
            ),
            Self::SlotConflict { starts_at, ends_at } => (
                StatusCode::CONFLICT,
                serde_json::json!({
                    "error": "slot_conflict",
                    "busy_from": starts_at,
                    "busy_until": ends_at,
                    "message": self.to_string()
                }),
            ),
            Self::SlotInPast | Self::HorizonExceeded(_) | Self::InvalidSlot(_) => (
                StatusCode::BAD_REQUEST,
                serde_json::json!({"error": "invalid_slot", "message": self.to_string()}),
            ),
            Self::NotYours => (
                StatusCode::FORBIDDEN,
                serde_json::json!({"error": "not_yours", "message": self.to_string()}),
            ),
            Self::AlreadyCancelled | Self::InvalidTransition => (
                StatusCode::CONFLICT,
                serde_json::json!({"error": "invalid_transition", "message": self.to_string()}),
            ),
            Self::Forbidden(_) => (
                StatusCode::FORBIDDEN,
                serde_json::json!({"error": "insufficient_role", "message": self.to_string()}),
            ),
            Self::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                serde_json::json!({"error": "validation", "message": msg}),
            ),
            Self::Database(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                serde_json::json!({"error": "database", "message": "Database error"}),
            ),
        };
        (status, Json(body)).into_response()
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Book an appointment.
///
/// The conflict check and the insert run in one transaction under a
/// per-professional advisory lock, so two clients racing for the same
/// slot cannot both win.
///
/// `POST /api/appointments`
#[tracing::instrument(skip(state, body), fields(user_id = %auth.id))]
pub async fn create_appointment(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<Appointment>), BookingError> {
    body.validate()
        .map_err(|e| BookingError::Validation(e.to_string()))?;
    auth.roles.require(Role::Client)?;

    let requested = TimeSlot::new(body.starts_at, body.ends_at)?;

    let now = Utc::now();
    if requested.starts_at <= now {
        return Err(BookingError::SlotInPast);
    }
    let horizon_days = state.config.booking_horizon_days;
    if requested.ends_at > now + Duration::days(horizon_days) {
        return Err(BookingError::HorizonExceeded(horizon_days));
    }

    let business = find_business(&state.db, body.business_id)
        .await?
        .ok_or(BookingError::BusinessNotFound)?;

    // The professional must actually take appointments there: linked
    // staff, or the owner working their own chair.
    let works_there = business.owner_user_id == body.professional_id
        || is_staff(&state.db, body.business_id, body.professional_id).await?;
    if !works_there {
        return Err(BookingError::ProfessionalNotAtBusiness);
    }

    let mut tx = state.db.begin().await?;

    // Serialize bookings per professional for the conflict scan
    sqlx::query("SELECT pg_advisory_xact_lock($1, hashtext($2))")
        .bind(APPOINTMENT_CREATE_LOCK_SEED)
        .bind(body.professional_id.to_string())
        .execute(&mut *tx)
        .await?;

    let candidates =
        load_conflict_candidates(&mut *tx, body.professional_id, requested.starts_at).await?;
    if let Some(conflict) = find_conflict(&requested, &candidates) {
        return Err(BookingError::SlotConflict {
            starts_at: conflict.starts_at,
            ends_at: conflict.ends_at,
        });
    }

    let appointment = sqlx::query_as::<_, Appointment>(
        r"
        INSERT INTO appointments
            (business_id, professional_id, client_id, service_name, starts_at, ends_at, notes)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        ",
    )
    .bind(body.business_id)
    .bind(body.professional_id)
    .bind(auth.id)
    .bind(&body.service_name)
    .bind(requested.starts_at)
    .bind(requested.ends_at)
    .bind(body.notes.as_deref())
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!(
        appointment_id = %appointment.id,
        professional_id = %appointment.professional_id,
        "Appointment booked"
    );

    Ok((StatusCode::CREATED, Json(appointment)))
}

/// The caller's appointments, as the active role sees them.
///
/// Operating as professional (or above): the calendar of assignments.
/// Operating as client: the bookings they made.
///
/// `GET /api/me/appointments`
#[tracing::instrument(skip(state), fields(user_id = %auth.id))]
pub async fn list_my_appointments(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<Appointment>>, BookingError> {
    let appointments = if has_permission(auth.roles.active, Role::Professional) {
        list_appointments_for_professional(&state.db, auth.id).await?
    } else {
        list_appointments_for_client(&state.db, auth.id).await?
    };
    Ok(Json(appointments))
}

/// Get one appointment. Visible to its client, its professional, and the
/// business owner.
///
/// `GET /api/appointments/{appointment_id}`
#[tracing::instrument(skip(state), fields(user_id = %auth.id))]
pub async fn get_appointment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Appointment>, BookingError> {
    let appointment = find_appointment(&state.db, appointment_id)
        .await?
        .ok_or(BookingError::NotFound)?;
    authorize_party(&state, &auth, &appointment).await?;
    Ok(Json(appointment))
}

/// Cancel an appointment.
///
/// `POST /api/appointments/{appointment_id}/cancel`
#[tracing::instrument(skip(state), fields(user_id = %auth.id))]
pub async fn cancel_appointment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Appointment>, BookingError> {
    let appointment = find_appointment(&state.db, appointment_id)
        .await?
        .ok_or(BookingError::NotFound)?;
    authorize_party(&state, &auth, &appointment).await?;

    match appointment.status {
        AppointmentStatus::Cancelled => return Err(BookingError::AlreadyCancelled),
        AppointmentStatus::Completed => return Err(BookingError::InvalidTransition),
        AppointmentStatus::Booked => {}
    }

    let updated =
        set_appointment_status(&state.db, appointment_id, AppointmentStatus::Cancelled).await?;
    tracing::info!(appointment_id = %appointment_id, "Appointment cancelled");
    Ok(Json(updated))
}

/// Mark an appointment completed. Professionals and owners only; the
/// booking client cannot complete their own appointment.
///
/// `POST /api/appointments/{appointment_id}/complete`
#[tracing::instrument(skip(state), fields(user_id = %auth.id))]
pub async fn complete_appointment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Appointment>, BookingError> {
    let appointment = find_appointment(&state.db, appointment_id)
        .await?
        .ok_or(BookingError::NotFound)?;

    if appointment.professional_id == auth.id {
        auth.roles.require(Role::Professional)?;
    } else {
        authorize_owner(&state, &auth, &appointment).await?;
    }

    if appointment.status != AppointmentStatus::Booked {
        return Err(BookingError::InvalidTransition);
    }

    let updated =
        set_appointment_status(&state.db, appointment_id, AppointmentStatus::Completed).await?;
    tracing::info!(appointment_id = %appointment_id, "Appointment completed");
    Ok(Json(updated))
}

// ============================================================================
// Authorization helpers
// ============================================================================

/// Allow the booking client, the assigned professional (operating at
/// professional rank), or the business owner (operating at owner rank).
async fn authorize_party(
    state: &AppState,
    auth: &AuthUser,
    appointment: &Appointment,
) -> Result<(), BookingError> {
    if appointment.client_id == auth.id {
        return Ok(());
    }
    if appointment.professional_id == auth.id {
        auth.roles.require(Role::Professional)?;
        return Ok(());
    }
    authorize_owner(state, auth, appointment).await
}

/// Allow only the owner of the appointment's business, operating as owner.
async fn authorize_owner(
    state: &AppState,
    auth: &AuthUser,
    appointment: &Appointment,
) -> Result<(), BookingError> {
    auth.roles.require(Role::Owner)?;
    let business = find_business(&state.db, appointment.business_id)
        .await?
        .ok_or(BookingError::BusinessNotFound)?;
    if business.owner_user_id != auth.id {
        return Err(BookingError::NotYours);
    }
    Ok(())
}
