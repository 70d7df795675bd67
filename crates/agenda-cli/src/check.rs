//! Consistency report over a whole data file.
//!
//! Besides the structural checks, this looks for what the booking flow cannot
//! prevent on its own: slots that ended up holding more participants than the
//! schedule admits, and appointments at times the schedule no longer offers.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use slot_engine::model::{time_label, DataSet, ScheduleId};
use slot_engine::slots::{effective_window, seats_taken, slot_starts, weekday_index};
use slot_engine::validate::{validate_appointment, validate_schedule};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Problem {
    InvalidSchedule { message: String },
    InvalidAppointment { message: String },
    UnknownSchedule { appointment: String, schedule: String },
    OffSchedule { appointment: String, date: NaiveDate, time: String },
    Overbooked { schedule: String, date: NaiveDate, time: String, seats: u32, capacity: u32 },
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Problem::InvalidSchedule { message } | Problem::InvalidAppointment { message } => {
                f.write_str(message)
            }
            Problem::UnknownSchedule { appointment, schedule } => {
                write!(f, "Appointment '{}' references unknown schedule '{}'", appointment, schedule)
            }
            Problem::OffSchedule { appointment, date, time } => {
                write!(f, "Appointment '{}' at {} {} is not an offered slot", appointment, date, time)
            }
            Problem::Overbooked { schedule, date, time, seats, capacity } => write!(
                f,
                "Slot {} {} on '{}' holds {} participant(s), capacity {}",
                date, time, schedule, seats, capacity
            ),
        }
    }
}

/// Every problem found in `data`, schedules first, then appointments, then
/// overbooked slots in slot order.
pub fn check_data(data: &DataSet) -> Vec<Problem> {
    let mut problems: Vec<Problem> = data
        .schedules
        .iter()
        .filter_map(|s| validate_schedule(s).err())
        .map(|e| Problem::InvalidSchedule { message: e.to_string() })
        .collect();

    let mut slots: BTreeMap<(&ScheduleId, NaiveDate, NaiveTime), u32> = BTreeMap::new();
    for appointment in &data.appointments {
        let Some(schedule) = data.schedule(appointment.schedule_id.as_str()) else {
            problems.push(Problem::UnknownSchedule {
                appointment: appointment.id.to_string(),
                schedule: appointment.schedule_id.to_string(),
            });
            continue;
        };
        if let Err(e) = validate_appointment(appointment, schedule) {
            problems.push(Problem::InvalidAppointment { message: e.to_string() });
        }

        let weekday = weekday_index(appointment.date);
        let offered = schedule.is_open_on(weekday)
            && slot_starts(effective_window(schedule, weekday), schedule.slot_duration)
                .contains(&appointment.time);
        if !offered {
            problems.push(Problem::OffSchedule {
                appointment: appointment.id.to_string(),
                date: appointment.date,
                time: time_label(appointment.time),
            });
        }

        slots
            .entry((&schedule.id, appointment.date, appointment.time))
            .or_insert_with(|| {
                seats_taken(&data.appointments, &schedule.id, appointment.date, appointment.time, None)
            });
    }

    for ((schedule_id, date, time), seats) in slots {
        let Some(schedule) = data.schedule(schedule_id.as_str()) else {
            continue;
        };
        if seats > schedule.max_participants_per_slot {
            problems.push(Problem::Overbooked {
                schedule: schedule_id.to_string(),
                date,
                time: time_label(time),
                seats,
                capacity: schedule.max_participants_per_slot,
            });
        }
    }

    problems
}
