//! # slot-engine
//!
//! Deterministic slot availability for recurring weekly booking schedules.
//!
//! A [`Schedule`] opens on a set of weekdays, between a default opening and
//! closing time that individual weekdays may override, and is cut into
//! fixed-length slots each admitting a bounded number of participants. Given a
//! date, the existing appointments and the current local time, the engine
//! reports which slots are still offered and how many seats each has left.
//!
//! Everything here is a pure function of its arguments. The current time is
//! always passed in; [`clock::local_now`] exists for the outer layers only.
//!
//! ## Modules
//!
//! - [`model`] — schedules, appointments, participants, users and their wire shape
//! - [`validate`] — structural checks on schedules and appointments
//! - [`slots`] — the availability calculation
//! - [`booking`] — advisory capacity check before writing an appointment
//! - [`calendar`] — bookable dates, month grid, opening-hours summary
//! - [`appointments`] — participant names, upcoming/past listings, reminders
//! - [`clock`] — local "now" in an IANA timezone
//! - [`error`] — Error types

pub mod appointments;
pub mod booking;
pub mod calendar;
pub mod clock;
pub mod error;
pub mod model;
pub mod slots;
pub mod validate;

pub use booking::{check_booking, BookingRequest};
pub use error::{BookingError, EngineError};
pub use model::{Appointment, DataSet, DayWindow, Participant, Schedule, User};
pub use slots::{available_slots, SlotAvailability};
pub use validate::validate_schedule;
