//! Structural checks on schedules and appointments.
//!
//! The availability calculation never fails; it degrades to "no slots" on bad
//! configuration. These checks are what callers run before saving a schedule
//! or an appointment, so the bad configuration never reaches it.

use std::collections::HashSet;

use crate::error::{EngineError, Result};
use crate::model::{time_label, Appointment, Participant, Schedule};

fn schedule_error(schedule: &Schedule, reason: impl Into<String>) -> EngineError {
    EngineError::InvalidSchedule {
        id: schedule.id.to_string(),
        reason: reason.into(),
    }
}

/// Check a schedule's invariants, reporting the first violation found.
///
/// - slot duration and per-slot capacity are positive
/// - the default window opens before it closes
/// - every complete weekday override opens before it closes
/// - weekdays and override keys lie in 0..=6
pub fn validate_schedule(schedule: &Schedule) -> Result<()> {
    if schedule.slot_duration == 0 {
        return Err(schedule_error(schedule, "slot duration must be positive"));
    }
    if schedule.max_participants_per_slot == 0 {
        return Err(schedule_error(
            schedule,
            "max participants per slot must be positive",
        ));
    }
    if !schedule.default_window().is_valid() {
        return Err(schedule_error(
            schedule,
            format!(
                "opening time {} must precede closing time {}",
                time_label(schedule.start_time),
                time_label(schedule.end_time)
            ),
        ));
    }
    if let Some(day) = schedule.days_of_week.iter().find(|d| **d > 6) {
        return Err(schedule_error(schedule, format!("weekday {} out of range 0..=6", day)));
    }
    for (day, config) in &schedule.days_config {
        if *day > 6 {
            return Err(schedule_error(
                schedule,
                format!("override for weekday {} out of range 0..=6", day),
            ));
        }
        if let Some(window) = config.window() {
            if !window.is_valid() {
                return Err(schedule_error(
                    schedule,
                    format!("override for weekday {} has empty window {}", day, window),
                ));
            }
        }
    }
    Ok(())
}

/// Check an appointment against the schedule it is booked on.
pub fn validate_appointment(appointment: &Appointment, schedule: &Schedule) -> Result<()> {
    let fail = |reason: String| EngineError::InvalidAppointment {
        id: appointment.id.to_string(),
        reason,
    };

    if appointment.schedule_id != schedule.id {
        return Err(fail(format!(
            "booked on schedule {}, checked against {}",
            appointment.schedule_id, schedule.id
        )));
    }
    if appointment.participants.is_empty() {
        return Err(fail("no participants".to_string()));
    }

    let mut seen = HashSet::new();
    for participant in &appointment.participants {
        match participant {
            Participant::Walkin(name) if name.trim().is_empty() => {
                return Err(fail("walk-in participant without a name".to_string()));
            }
            Participant::Registered(id) if !seen.insert(id) => {
                return Err(fail(format!("user {} listed twice", id)));
            }
            _ => {}
        }
    }
    Ok(())
}
