//! Schedule Types
//!
//! A [`TimeSlot`] is a half-open interval `[starts_at, ends_at)`. Half-open
//! semantics mean back-to-back slots share an instant without overlapping.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A half-open time interval on the booking calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    /// Inclusive start of the slot.
    pub starts_at: DateTime<Utc>,
    /// Exclusive end of the slot.
    pub ends_at: DateTime<Utc>,
}

impl TimeSlot {
    /// Construct a slot, rejecting empty or inverted intervals.
    pub fn new(starts_at: DateTime<Utc>, ends_at: DateTime<Utc>) -> Result<Self> {
        if starts_at >= ends_at {
            return Err(Error::InvalidTimeSlot { starts_at, ends_at });
        }
        Ok(Self { starts_at, ends_at })
    }

    /// Whether two slots occupy any common instant.
    ///
    /// Half-open intervals: a slot ending exactly when another begins does
    /// not overlap it.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.starts_at < other.ends_at && other.starts_at < self.ends_at
    }

    /// Length of the slot.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.ends_at - self.starts_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 2, hour, min, 0).unwrap()
    }

    #[test]
    fn test_rejects_inverted_interval() {
        assert!(TimeSlot::new(at(10, 0), at(9, 0)).is_err());
    }

    #[test]
    fn test_rejects_empty_interval() {
        assert!(TimeSlot::new(at(10, 0), at(10, 0)).is_err());
    }

    #[test]
    fn test_partial_overlap() {
        let a = TimeSlot::new(at(9, 0), at(10, 0)).unwrap();
        let b = TimeSlot::new(at(9, 30), at(10, 30)).unwrap();
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }

    #[test]
    fn test_containment_overlaps() {
        let outer = TimeSlot::new(at(9, 0), at(12, 0)).unwrap();
        let inner = TimeSlot::new(at(10, 0), at(10, 30)).unwrap();
        assert!(outer.overlaps(&inner));
        assert!(inner.overlaps(&outer));
    }

    #[test]
    fn test_back_to_back_does_not_overlap() {
        let morning = TimeSlot::new(at(9, 0), at(10, 0)).unwrap();
        let next = TimeSlot::new(at(10, 0), at(11, 0)).unwrap();
        assert!(!morning.overlaps(&next));
        assert!(!next.overlaps(&morning));
    }

    #[test]
    fn test_disjoint_does_not_overlap() {
        let a = TimeSlot::new(at(9, 0), at(9, 30)).unwrap();
        let b = TimeSlot::new(at(14, 0), at(15, 0)).unwrap();
        assert!(!a.overlaps(&b));
    }

    #[test]
    fn test_duration() {
        let slot = TimeSlot::new(at(9, 0), at(9, 45)).unwrap();
        assert_eq!(slot.duration(), Duration::minutes(45));
    }
}
