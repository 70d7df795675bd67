//! Domain types shared by every engine module, and their stored JSON shape.
//!
//! Rows come from a hosted store that writes times of day as `"HH:MM"`, dates
//! as `"YYYY-MM-DD"` and field names in camelCase. The types below keep that
//! shape on the wire while exposing `chrono` values to Rust callers.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{EngineError, Result};

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

id_type!(
    /// Identifier of a [`Schedule`].
    ScheduleId
);
id_type!(
    /// Identifier of an [`Appointment`].
    AppointmentId
);
id_type!(
    /// Identifier of a registered [`User`].
    UserId
);

/// Parse a time of day written as `HH:MM` (or `HH:MM:SS`, as some rows store it).
pub fn parse_time(s: &str) -> Result<NaiveTime> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .map_err(|e| EngineError::Data(format!("invalid time of day '{}': {}", s, e)))
}

/// Parse a calendar date written as `YYYY-MM-DD`.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| EngineError::Data(format!("invalid date '{}': {}", s, e)))
}

/// Format a time of day as the `HH:MM` label shown to users.
pub fn time_label(t: NaiveTime) -> String {
    t.format("%H:%M").to_string()
}

/// Serde adapter for `NaiveTime` stored as `"HH:MM"`.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(t: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&super::time_label(*t))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse_time(&raw).map_err(de::Error::custom)
    }
}

/// Like [`hhmm`], for optional fields. Empty strings and `null` read as `None`.
pub mod hhmm_opt {
    use chrono::NaiveTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(t: &Option<NaiveTime>, s: S) -> Result<S::Ok, S::Error> {
        match t {
            Some(t) => s.serialize_str(&super::time_label(*t)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveTime>, D::Error> {
        match Option::<String>::deserialize(d)? {
            Some(raw) if !raw.trim().is_empty() => {
                super::parse_time(&raw).map(Some).map_err(de::Error::custom)
            }
            _ => Ok(None),
        }
    }
}

fn null_as_default<'de, D, T>(d: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}

fn default_true() -> bool {
    true
}

/// An opening/closing pair for one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayWindow {
    #[serde(with = "hhmm")]
    pub start: NaiveTime,
    #[serde(with = "hhmm")]
    pub end: NaiveTime,
}

impl DayWindow {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    /// A window is usable only when it opens strictly before it closes.
    pub fn is_valid(&self) -> bool {
        self.start < self.end
    }
}

impl fmt::Display for DayWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", time_label(self.start), time_label(self.end))
    }
}

/// Per-weekday replacement for the schedule's default hours.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayOverride {
    #[serde(default, with = "hhmm_opt")]
    pub start_time: Option<NaiveTime>,
    #[serde(default, with = "hhmm_opt")]
    pub end_time: Option<NaiveTime>,
}

impl DayOverride {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self {
            start_time: Some(start),
            end_time: Some(end),
        }
    }

    /// The override's window, only when both ends are set.
    pub fn window(&self) -> Option<DayWindow> {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => Some(DayWindow { start, end }),
            _ => None,
        }
    }
}

/// A recurring bookable resource: open weekdays, hours, slot size and capacity.
///
/// Weekdays are numbered 0 = Sunday through 6 = Saturday.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    pub id: ScheduleId,
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    /// Slot length in minutes.
    pub slot_duration: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub days_of_week: Vec<u8>,
    #[serde(default = "default_true")]
    pub active: bool,
    pub max_participants_per_slot: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observation: Option<String>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub days_config: BTreeMap<u8, DayOverride>,
}

impl Schedule {
    /// The schedule's hours when no weekday override applies.
    pub fn default_window(&self) -> DayWindow {
        DayWindow {
            start: self.start_time,
            end: self.end_time,
        }
    }

    pub fn is_open_on(&self, weekday: u8) -> bool {
        self.days_of_week.contains(&weekday)
    }
}

/// One occupant of a seat in a slot.
///
/// Stored rows write a registered user as a bare id string and a walk-in as
/// `{"manualName": "..."}`; both consume exactly one seat.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "ParticipantRepr", into = "ParticipantRepr")]
pub enum Participant {
    Registered(UserId),
    Walkin(String),
}

impl Participant {
    pub fn registered(id: impl Into<UserId>) -> Self {
        Participant::Registered(id.into())
    }

    pub fn walkin(name: impl Into<String>) -> Self {
        Participant::Walkin(name.into())
    }

    pub fn user_id(&self) -> Option<&UserId> {
        match self {
            Participant::Registered(id) => Some(id),
            Participant::Walkin(_) => None,
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum ParticipantRepr {
    Registered(UserId),
    Walkin {
        #[serde(rename = "manualName")]
        manual_name: String,
    },
}

impl From<ParticipantRepr> for Participant {
    fn from(repr: ParticipantRepr) -> Self {
        match repr {
            ParticipantRepr::Registered(id) => Participant::Registered(id),
            ParticipantRepr::Walkin { manual_name } => Participant::Walkin(manual_name),
        }
    }
}

impl From<Participant> for ParticipantRepr {
    fn from(p: Participant) -> Self {
        match p {
            Participant::Registered(id) => ParticipantRepr::Registered(id),
            Participant::Walkin(manual_name) => ParticipantRepr::Walkin { manual_name },
        }
    }
}

/// A booking of one slot by one or more participants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: AppointmentId,
    pub schedule_id: ScheduleId,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
    #[serde(default)]
    pub participants: Vec<Participant>,
    pub created_by: UserId,
}

impl Appointment {
    /// Seats this appointment occupies.
    pub fn seats(&self) -> u32 {
        u32::try_from(self.participants.len()).unwrap_or(u32::MAX)
    }

    pub fn starts_at(&self) -> NaiveDateTime {
        self.date.and_time(self.time)
    }

    pub fn has_participant(&self, user: &UserId) -> bool {
        self.participants.iter().any(|p| p.user_id() == Some(user))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    User,
}

/// A registered account. Credentials are never read into the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    #[serde(default)]
    pub username: String,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    pub id: String,
    pub title: String,
    pub content: String,
    pub date: NaiveDate,
    #[serde(default = "default_true")]
    pub active: bool,
    pub created_by: UserId,
}

/// Announcements on the board: every active one, in stored order. The date is
/// only displayed, so a post dated ahead is shown right away.
pub fn active_announcements(list: &[Announcement]) -> Vec<&Announcement> {
    list.iter().filter(|a| a.active).collect()
}

/// A snapshot of every table the engine reads, as exported from the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataSet {
    #[serde(default)]
    pub schedules: Vec<Schedule>,
    #[serde(default)]
    pub appointments: Vec<Appointment>,
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub announcements: Vec<Announcement>,
}

impl DataSet {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| EngineError::Data(e.to_string()))
    }

    pub fn schedule(&self, id: &str) -> Option<&Schedule> {
        self.schedules.iter().find(|s| s.id.as_str() == id)
    }

    pub fn appointment(&self, id: &str) -> Option<&Appointment> {
        self.appointments.iter().find(|a| a.id.as_str() == id)
    }
}
