//! Booking Type Definitions

use bk_common::TimeSlot;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Appointment lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "appointment_status", rename_all = "lowercase")]
pub enum AppointmentStatus {
    Booked,
    Completed,
    Cancelled,
}

/// Appointment row.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Appointment {
    pub id: Uuid,
    pub business_id: Uuid,
    pub professional_id: Uuid,
    pub client_id: Uuid,
    pub service_name: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    /// The calendar slot this appointment occupies. The database enforces
    /// `starts_at < ends_at`, so the literal is always a valid slot.
    #[must_use]
    pub const fn slot(&self) -> TimeSlot {
        TimeSlot {
            starts_at: self.starts_at,
            ends_at: self.ends_at,
        }
    }
}

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct CreateAppointmentRequest {
    pub business_id: Uuid,
    pub professional_id: Uuid,
    #[validate(length(min = 1, max = 100, message = "Service name must be 1-100 characters"))]
    pub service_name: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    #[validate(length(max = 1000, message = "Notes must be at most 1000 characters"))]
    pub notes: Option<String>,
}
