//! Database queries for appointments.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::error;
use uuid::Uuid;

use super::types::{Appointment, AppointmentStatus};

/// Log and return a database error with context.
macro_rules! db_error {
    ($query:expr, $($field:tt)*) => {
        |e| {
            error!(query = $query, $($field)*, error = %e, "Database query failed");
            e
        }
    };
}

/// Find an appointment by ID.
pub async fn find_appointment(pool: &PgPool, id: Uuid) -> sqlx::Result<Option<Appointment>> {
    sqlx::query_as::<_, Appointment>("SELECT * FROM appointments WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(db_error!("find_appointment", appointment_id = %id))
}

/// Appointments booked by a client, soonest first.
pub async fn list_appointments_for_client(
    pool: &PgPool,
    client_id: Uuid,
) -> sqlx::Result<Vec<Appointment>> {
    sqlx::query_as::<_, Appointment>(
        "SELECT * FROM appointments WHERE client_id = $1 ORDER BY starts_at ASC",
    )
    .bind(client_id)
    .fetch_all(pool)
    .await
    .map_err(db_error!("list_appointments_for_client", client_id = %client_id))
}

/// Appointments assigned to a professional, soonest first.
pub async fn list_appointments_for_professional(
    pool: &PgPool,
    professional_id: Uuid,
) -> sqlx::Result<Vec<Appointment>> {
    sqlx::query_as::<_, Appointment>(
        "SELECT * FROM appointments WHERE professional_id = $1 ORDER BY starts_at ASC",
    )
    .bind(professional_id)
    .fetch_all(pool)
    .await
    .map_err(db_error!("list_appointments_for_professional", professional_id = %professional_id))
}

/// Move an appointment to a new status. Returns the updated row.
pub async fn set_appointment_status(
    pool: &PgPool,
    id: Uuid,
    status: AppointmentStatus,
) -> sqlx::Result<Appointment> {
    sqlx::query_as::<_, Appointment>(
        r"
        UPDATE appointments
        SET status = $2, updated_at = now()
        WHERE id = $1
        RETURNING *
        ",
    )
    .bind(id)
    .bind(status)
    .fetch_one(pool)
    .await
    .map_err(db_error!("set_appointment_status", appointment_id = %id))
}

/// Candidate rows for the conflict scan: the professional's non-cancelled
/// appointments that end after `window_start`. A coarse filter; the exact
/// overlap decision stays in [`super::conflict::find_conflict`].
pub async fn load_conflict_candidates(
    tx: &mut sqlx::PgConnection,
    professional_id: Uuid,
    window_start: DateTime<Utc>,
) -> sqlx::Result<Vec<Appointment>> {
    sqlx::query_as::<_, Appointment>(
        r"
        SELECT * FROM appointments
        WHERE professional_id = $1
          AND status <> 'cancelled'
          AND ends_at > $2
        ORDER BY starts_at ASC
        ",
    )
    .bind(professional_id)
    .bind(window_start)
    .fetch_all(tx)
    .await
    .map_err(db_error!("load_conflict_candidates", professional_id = %professional_id))
}
