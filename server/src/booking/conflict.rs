//! Time-slot conflict detection.
//!
//! A straight linear scan over a professional's loaded calendar. Callers
//! run it inside the booking transaction, under the per-professional
//! advisory lock, so the scan sees a stable view.

use bk_common::TimeSlot;

use super::types::{Appointment, AppointmentStatus};

/// First appointment whose slot overlaps `requested`, if any.
///
/// Cancelled appointments free their slot and never conflict.
#[must_use]
pub fn find_conflict<'a>(
    requested: &TimeSlot,
    existing: &'a [Appointment],
) -> Option<&'a Appointment> {
    existing
        .iter()
        .find(|a| a.status != AppointmentStatus::Cancelled && a.slot().overlaps(requested))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use uuid::Uuid;

    fn at(hour: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 2, hour, min, 0).unwrap()
    }

    fn appointment(start: DateTime<Utc>, end: DateTime<Utc>, status: AppointmentStatus) -> Appointment {
        Appointment {
            id: Uuid::now_v7(),
            business_id: Uuid::now_v7(),
            professional_id: Uuid::now_v7(),
            client_id: Uuid::now_v7(),
            service_name: "Haircut".to_string(),
            starts_at: start,
            ends_at: end,
            status,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn slot(start: DateTime<Utc>, end: DateTime<Utc>) -> TimeSlot {
        TimeSlot::new(start, end).unwrap()
    }

    #[test]
    fn test_empty_calendar_has_no_conflict() {
        let requested = slot(at(10, 0), at(11, 0));
        assert!(find_conflict(&requested, &[]).is_none());
    }

    #[test]
    fn test_overlapping_booking_conflicts() {
        let existing = vec![appointment(at(10, 0), at(11, 0), AppointmentStatus::Booked)];
        let requested = slot(at(10, 30), at(11, 30));
        let conflict = find_conflict(&requested, &existing).unwrap();
        assert_eq!(conflict.id, existing[0].id);
    }

    #[test]
    fn test_identical_slot_conflicts() {
        let existing = vec![appointment(at(10, 0), at(11, 0), AppointmentStatus::Booked)];
        let requested = slot(at(10, 0), at(11, 0));
        assert!(find_conflict(&requested, &existing).is_some());
    }

    #[test]
    fn test_contained_slot_conflicts() {
        let existing = vec![appointment(at(9, 0), at(12, 0), AppointmentStatus::Booked)];
        let requested = slot(at(10, 0), at(10, 30));
        assert!(find_conflict(&requested, &existing).is_some());
    }

    #[test]
    fn test_back_to_back_slots_do_not_conflict() {
        let existing = vec![appointment(at(9, 0), at(10, 0), AppointmentStatus::Booked)];
        let requested = slot(at(10, 0), at(11, 0));
        assert!(find_conflict(&requested, &existing).is_none());
    }

    #[test]
    fn test_cancelled_appointment_frees_its_slot() {
        let existing = vec![appointment(at(10, 0), at(11, 0), AppointmentStatus::Cancelled)];
        let requested = slot(at(10, 0), at(11, 0));
        assert!(find_conflict(&requested, &existing).is_none());
    }

    #[test]
    fn test_completed_appointment_still_occupies_its_slot() {
        let existing = vec![appointment(at(10, 0), at(11, 0), AppointmentStatus::Completed)];
        let requested = slot(at(10, 30), at(11, 30));
        assert!(find_conflict(&requested, &existing).is_some());
    }

    #[test]
    fn test_scan_finds_conflict_among_many() {
        let existing = vec![
            appointment(at(8, 0), at(9, 0), AppointmentStatus::Booked),
            appointment(at(9, 0), at(10, 0), AppointmentStatus::Cancelled),
            appointment(at(13, 0), at(14, 0), AppointmentStatus::Booked),
        ];
        let requested = slot(at(13, 30), at(14, 30));
        let conflict = find_conflict(&requested, &existing).unwrap();
        assert_eq!(conflict.id, existing[2].id);
    }

    #[test]
    fn test_disjoint_calendar_has_no_conflict() {
        let existing = vec![
            appointment(at(8, 0), at(9, 0), AppointmentStatus::Booked),
            appointment(at(11, 0), at(12, 0), AppointmentStatus::Booked),
        ];
        let requested = slot(at(9, 30), at(10, 30));
        assert!(find_conflict(&requested, &existing).is_none());
    }
}
