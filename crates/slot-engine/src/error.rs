//! Error types for slot-engine operations.

use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Invalid schedule '{id}': {reason}")]
    InvalidSchedule { id: String, reason: String },

    #[error("Invalid appointment '{id}': {reason}")]
    InvalidAppointment { id: String, reason: String },

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid data: {0}")]
    Data(String),
}

/// Reasons a proposed booking is refused by [`crate::booking::check_booking`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BookingError {
    #[error("schedule is paused")]
    ScheduleInactive,

    #[error("no slots are offered on {0}")]
    DayClosed(NaiveDate),

    #[error("{time} is not a slot boundary on {date}")]
    NoSuchSlot { date: NaiveDate, time: NaiveTime },

    #[error("slot {date} {time} has already started")]
    SlotInPast { date: NaiveDate, time: NaiveTime },

    #[error("booking needs at least one participant")]
    NoParticipants,

    #[error("slot has {remaining} seat(s) left, {requested} requested")]
    InsufficientCapacity { requested: u32, remaining: u32 },
}

pub type Result<T> = std::result::Result<T, EngineError>;
