//! Shared error type for domain-level validation.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors produced when constructing shared domain values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A time slot whose end does not come after its start.
    #[error("invalid time slot: {starts_at} does not precede {ends_at}")]
    InvalidTimeSlot {
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
    },
}

/// Result alias for shared-type construction.
pub type Result<T> = std::result::Result<T, Error>;
