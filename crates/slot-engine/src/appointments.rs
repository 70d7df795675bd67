//! Read-side queries over booked appointments.

use chrono::{NaiveDate, NaiveDateTime};

use crate::model::{Appointment, Participant, User, UserId};

/// Shown for a registered participant whose account no longer exists.
pub const UNKNOWN_PARTICIPANT: &str = "Unknown";

/// Display name of a participant.
pub fn participant_name<'a>(participant: &'a Participant, users: &'a [User]) -> &'a str {
    match participant {
        Participant::Registered(id) => users
            .iter()
            .find(|u| &u.id == id)
            .map_or(UNKNOWN_PARTICIPANT, |u| u.name.as_str()),
        Participant::Walkin(name) => name.as_str(),
    }
}

/// Appointments `user` takes part in that start after `now`, soonest first.
pub fn upcoming_for_user<'a>(
    appointments: &'a [Appointment],
    user: &UserId,
    now: NaiveDateTime,
) -> Vec<&'a Appointment> {
    let mut upcoming: Vec<&Appointment> = appointments
        .iter()
        .filter(|a| a.has_participant(user) && a.starts_at() > now)
        .collect();
    upcoming.sort_by_key(|a| a.starts_at());
    upcoming
}

/// The appointment to remind `user` of: one dated the day after `now` that
/// has not started yet. Only registered participation counts, so a walk-in
/// typed with the user's id never matches. The earliest wins when there are
/// several.
pub fn tomorrow_reminder<'a>(
    appointments: &'a [Appointment],
    user: &UserId,
    now: NaiveDateTime,
) -> Option<&'a Appointment> {
    let tomorrow = now.date().succ_opt()?;
    appointments
        .iter()
        .filter(|a| a.date == tomorrow && a.has_participant(user) && a.starts_at() >= now)
        .min_by_key(|a| a.starts_at())
}

/// Narrowing applied to the administrator's appointment listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppointmentFilter {
    pub date: Option<NaiveDate>,
    /// Case-insensitive substring of any participant's name.
    pub name: Option<String>,
}

impl AppointmentFilter {
    pub fn matches(&self, appointment: &Appointment, users: &[User]) -> bool {
        if let Some(date) = self.date {
            if appointment.date != date {
                return false;
            }
        }
        match self.name.as_deref().map(str::trim) {
            Some(needle) if !needle.is_empty() => {
                let needle = needle.to_lowercase();
                appointment
                    .participants
                    .iter()
                    .any(|p| participant_name(p, users).to_lowercase().contains(&needle))
            }
            _ => true,
        }
    }
}

/// Appointments split around a point in time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Partitioned<'a> {
    /// Starting after `now`, soonest first.
    pub upcoming: Vec<&'a Appointment>,
    /// Starting at or before `now`, most recent first.
    pub past: Vec<&'a Appointment>,
}

/// Filter appointments and split them into upcoming and past.
pub fn partition_by_time<'a>(
    appointments: &'a [Appointment],
    users: &[User],
    filter: &AppointmentFilter,
    now: NaiveDateTime,
) -> Partitioned<'a> {
    let (mut upcoming, mut past): (Vec<&Appointment>, Vec<&Appointment>) = appointments
        .iter()
        .filter(|a| filter.matches(a, users))
        .partition(|a| a.starts_at() > now);

    upcoming.sort_by_key(|a| a.starts_at());
    past.sort_by_key(|a| std::cmp::Reverse(a.starts_at()));
    Partitioned { upcoming, past }
}
