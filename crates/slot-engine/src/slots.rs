//! Slot availability for one schedule on one date.
//!
//! The day's effective window is cut into `slot_duration`-minute slots starting
//! at the opening time. A slot is offered only if it starts strictly before
//! closing; there is no partial trailing slot. Each offered slot carries the
//! seats left after counting the participants of appointments already booked
//! at exactly that date and time.
//!
//! The result is a snapshot. Nothing here reserves a seat, so two callers that
//! both read one free seat and then both write an appointment will overbook.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::model::{hhmm, time_label, Appointment, AppointmentId, DayOverride, DayWindow, Schedule, ScheduleId};

/// One offered slot and the seats it still has.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotAvailability {
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
    /// `HH:MM` label, the value stored in [`Appointment::time`].
    pub label: String,
    /// Seats left; zero means the slot exists but is full.
    pub remaining: u32,
}

impl SlotAvailability {
    pub fn is_full(&self) -> bool {
        self.remaining == 0
    }
}

/// Weekday number of `date`, 0 = Sunday through 6 = Saturday.
pub fn weekday_index(date: NaiveDate) -> u8 {
    // num_days_from_sunday is always 0..=6
    date.weekday().num_days_from_sunday() as u8
}

/// Minutes since midnight. Seconds are dropped, so "has it started" checks
/// compare whole minutes.
pub fn minute_of_day(t: NaiveTime) -> u32 {
    t.hour() * 60 + t.minute()
}

/// Whether a slot at `date` `time` has started by `now`, to the minute.
pub fn has_started(date: NaiveDate, time: NaiveTime, now: NaiveDateTime) -> bool {
    match date.cmp(&now.date()) {
        std::cmp::Ordering::Less => true,
        std::cmp::Ordering::Equal => minute_of_day(time) <= minute_of_day(now.time()),
        std::cmp::Ordering::Greater => false,
    }
}

/// Opening hours for `weekday`: the override when both of its ends are set,
/// the schedule default otherwise. Whether the weekday is open at all is not
/// considered here.
pub fn effective_window(schedule: &Schedule, weekday: u8) -> DayWindow {
    schedule
        .days_config
        .get(&weekday)
        .and_then(DayOverride::window)
        .unwrap_or_else(|| schedule.default_window())
}

/// Slot start times inside `window`, stepping by `duration_minutes`.
///
/// Empty when the window does not open before it closes or when the duration
/// is zero. Generation never wraps past midnight.
pub fn slot_starts(window: DayWindow, duration_minutes: u32) -> Vec<NaiveTime> {
    if duration_minutes == 0 || !window.is_valid() {
        return Vec::new();
    }

    let step = Duration::minutes(i64::from(duration_minutes));
    let mut starts = Vec::new();
    let mut current = window.start;
    while current < window.end {
        starts.push(current);
        let (next, wrapped_secs) = current.overflowing_add_signed(step);
        if wrapped_secs != 0 {
            break;
        }
        current = next;
    }
    starts
}

/// Seats taken on `schedule_id` at exactly `date` `time`.
///
/// Every participant counts as one seat whether registered or walk-in. The
/// appointment named by `exclude` is skipped.
pub fn seats_taken(
    appointments: &[Appointment],
    schedule_id: &ScheduleId,
    date: NaiveDate,
    time: NaiveTime,
    exclude: Option<&AppointmentId>,
) -> u32 {
    appointments
        .iter()
        .filter(|a| &a.schedule_id == schedule_id && a.date == date && a.time == time)
        .filter(|a| exclude != Some(&a.id))
        .fold(0u32, |acc, a| acc.saturating_add(a.seats()))
}

/// Compute the slots `schedule` offers on `date`, in chronological order.
///
/// # Arguments
///
/// * `schedule`: The schedule to cut into slots.
/// * `date`: The calendar date being booked.
/// * `appointments`: Existing appointments. Those on other schedules or at
///   other dates and times are ignored.
/// * `now`: Current local date-time. On `now`'s own date, slots starting at
///   or before its minute of the day are not offered.
/// * `exclude`: An appointment to leave out of the seat count, used when
///   that appointment is being moved.
///
/// Returns an empty list when the weekday is not open, when the effective
/// window is empty, or when the slot duration is zero. A full slot is still
/// listed, with `remaining == 0`.
pub fn available_slots(
    schedule: &Schedule,
    date: NaiveDate,
    appointments: &[Appointment],
    now: NaiveDateTime,
    exclude: Option<&AppointmentId>,
) -> Vec<SlotAvailability> {
    let weekday = weekday_index(date);
    if !schedule.is_open_on(weekday) {
        debug!(schedule = %schedule.id, %date, weekday, "weekday not open");
        return Vec::new();
    }

    let window = effective_window(schedule, weekday);
    trace!(schedule = %schedule.id, %date, %window, "effective window");

    let is_today = date == now.date();
    let slots: Vec<SlotAvailability> = slot_starts(window, schedule.slot_duration)
        .into_iter()
        .filter(|start| !(is_today && has_started(date, *start, now)))
        .map(|start| {
            let taken = seats_taken(appointments, &schedule.id, date, start, exclude);
            SlotAvailability {
                time: start,
                label: time_label(start),
                remaining: schedule.max_participants_per_slot.saturating_sub(taken),
            }
        })
        .collect();

    debug!(schedule = %schedule.id, %date, count = slots.len(), "slots computed");
    slots
}
