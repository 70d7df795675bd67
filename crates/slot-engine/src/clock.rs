//! Local wall-clock time in an IANA timezone.
//!
//! Schedules and appointments are written in the venue's local time with no
//! offset, so "now" has to be expressed the same way before it is compared.

use chrono::{DateTime, NaiveDateTime, Utc};
use chrono_tz::Tz;

use crate::error::{EngineError, Result};

/// Timezone the venues operate in when none is configured.
pub const DEFAULT_TIMEZONE: &str = "America/Sao_Paulo";

pub fn parse_timezone(timezone: &str) -> Result<Tz> {
    timezone
        .parse()
        .map_err(|_| EngineError::InvalidTimezone(timezone.to_string()))
}

/// Convert an instant into local wall-clock time in `timezone`.
pub fn to_local(instant: DateTime<Utc>, timezone: &str) -> Result<NaiveDateTime> {
    let tz = parse_timezone(timezone)?;
    Ok(instant.with_timezone(&tz).naive_local())
}

/// The system clock's current time as local wall-clock time in `timezone`.
pub fn local_now(timezone: &str) -> Result<NaiveDateTime> {
    to_local(Utc::now(), timezone)
}
