//! Advisory capacity check run before an appointment is written.
//!
//! The check reads a capacity snapshot through [`available_slots`] and decides
//! whether the requested participants still fit. It does not reserve anything:
//! two requests checked against the same snapshot can both pass, and the store
//! will then hold more participants than the slot admits. Closing that gap
//! needs a capacity constraint where the appointment row is written.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use tracing::debug;

use crate::error::BookingError;
use crate::model::{Appointment, AppointmentId, Participant, Schedule};
use crate::slots::{available_slots, effective_window, has_started, slot_starts, weekday_index, SlotAvailability};

/// A proposed booking of one slot.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingRequest {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub participants: Vec<Participant>,
    /// When moving an existing appointment, its id; its own seats are not
    /// counted against it.
    pub exclude: Option<AppointmentId>,
}

impl BookingRequest {
    pub fn new(date: NaiveDate, time: NaiveTime, participants: Vec<Participant>) -> Self {
        Self {
            date,
            time,
            participants,
            exclude: None,
        }
    }

    pub fn moving(mut self, appointment: impl Into<AppointmentId>) -> Self {
        self.exclude = Some(appointment.into());
        self
    }

    fn seats(&self) -> u32 {
        u32::try_from(self.participants.len()).unwrap_or(u32::MAX)
    }
}

/// Decide whether `request` fits into `schedule` given the existing appointments.
///
/// On success returns the slot as it was before the booking, so the caller can
/// show how many seats were left.
///
/// # Errors
///
/// - [`BookingError::NoParticipants`] when the request names nobody
/// - [`BookingError::ScheduleInactive`] when the schedule is paused
/// - [`BookingError::DayClosed`] when the date offers no slot at all
/// - [`BookingError::NoSuchSlot`] when `time` is not a slot boundary that day
/// - [`BookingError::SlotInPast`] when the slot already started
/// - [`BookingError::InsufficientCapacity`] when the participants do not fit
pub fn check_booking(
    schedule: &Schedule,
    request: &BookingRequest,
    appointments: &[Appointment],
    now: NaiveDateTime,
) -> Result<SlotAvailability, BookingError> {
    let outcome = evaluate(schedule, request, appointments, now);
    if let Err(reason) = &outcome {
        debug!(schedule = %schedule.id, date = %request.date, time = %request.time, %reason, "booking refused");
    }
    outcome
}

fn evaluate(
    schedule: &Schedule,
    request: &BookingRequest,
    appointments: &[Appointment],
    now: NaiveDateTime,
) -> Result<SlotAvailability, BookingError> {
    if request.participants.is_empty() {
        return Err(BookingError::NoParticipants);
    }
    if !schedule.active {
        return Err(BookingError::ScheduleInactive);
    }

    let weekday = weekday_index(request.date);
    let boundaries = if schedule.is_open_on(weekday) {
        slot_starts(effective_window(schedule, weekday), schedule.slot_duration)
    } else {
        Vec::new()
    };
    if boundaries.is_empty() {
        return Err(BookingError::DayClosed(request.date));
    }
    if !boundaries.contains(&request.time) {
        return Err(BookingError::NoSuchSlot {
            date: request.date,
            time: request.time,
        });
    }

    if has_started(request.date, request.time, now) {
        return Err(BookingError::SlotInPast {
            date: request.date,
            time: request.time,
        });
    }

    let slots = available_slots(
        schedule,
        request.date,
        appointments,
        now,
        request.exclude.as_ref(),
    );
    let slot = slots
        .into_iter()
        .find(|s| s.time == request.time)
        .ok_or(BookingError::SlotInPast {
            date: request.date,
            time: request.time,
        })?;

    let requested = request.seats();
    if requested > slot.remaining {
        return Err(BookingError::InsufficientCapacity {
            requested,
            remaining: slot.remaining,
        });
    }
    Ok(slot)
}
