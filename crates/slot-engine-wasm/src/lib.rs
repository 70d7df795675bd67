//! WASM bindings for slot-engine.
//!
//! Exposes slot availability, the booking check, the calendar helpers and the
//! tomorrow reminder to the booking front end via `wasm-bindgen`. All complex
//! types are passed as JSON strings in the same shape the hosted store returns
//! rows, so the front end can hand over what it fetched without reshaping it.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p slot-engine-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target web --out-dir web/src/wasm/ \
//!   target/wasm32-unknown-unknown/release/slot_engine_wasm.wasm
//! ```

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use slot_engine::booking::{check_booking, BookingRequest};
use slot_engine::model::{parse_date, parse_time, Appointment, AppointmentId, Participant, Schedule, UserId};
use wasm_bindgen::prelude::*;

// ---------------------------------------------------------------------------
// Serde-friendly DTOs for crossing the WASM boundary as JSON
// ---------------------------------------------------------------------------

/// Booking request as sent by the front end.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BookingRequestInput {
    date: String,
    time: String,
    participants: Vec<Participant>,
    #[serde(default)]
    exclude: Option<String>,
}

#[derive(Serialize)]
struct BookingOutcomeDto {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    remaining: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse a local datetime such as `2026-03-16T09:30:00` or `2026-03-16T09:30`.
fn parse_local_datetime(s: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M"))
        .map_err(|e| format!("Invalid datetime '{}': {}", s, e))
}

fn parse_day(s: &str) -> Result<NaiveDate, String> {
    parse_date(s).map_err(|e| e.to_string())
}

fn parse_schedule(json: &str) -> Result<Schedule, String> {
    serde_json::from_str(json).map_err(|e| format!("Invalid schedule JSON: {}", e))
}

fn parse_appointments(json: &str) -> Result<Vec<Appointment>, String> {
    serde_json::from_str(json).map_err(|e| format!("Invalid appointments JSON: {}", e))
}

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("Serialization error: {}", e))
}

fn js_err(message: String) -> JsValue {
    JsValue::from_str(&message)
}

// ---------------------------------------------------------------------------
// Plain implementations (testable off-wasm)
// ---------------------------------------------------------------------------

fn available_slots_impl(
    schedule_json: &str,
    date: &str,
    appointments_json: &str,
    now: &str,
    exclude: Option<&str>,
) -> Result<String, String> {
    let schedule = parse_schedule(schedule_json)?;
    let appointments = parse_appointments(appointments_json)?;
    let date = parse_day(date)?;
    let now = parse_local_datetime(now)?;
    let exclude = exclude.map(AppointmentId::from);

    let slots = slot_engine::available_slots(&schedule, date, &appointments, now, exclude.as_ref());
    to_json(&slots)
}

fn check_booking_impl(
    schedule_json: &str,
    request_json: &str,
    appointments_json: &str,
    now: &str,
) -> Result<String, String> {
    let schedule = parse_schedule(schedule_json)?;
    let appointments = parse_appointments(appointments_json)?;
    let input: BookingRequestInput =
        serde_json::from_str(request_json).map_err(|e| format!("Invalid request JSON: {}", e))?;
    let now = parse_local_datetime(now)?;

    let mut request = BookingRequest::new(
        parse_day(&input.date)?,
        parse_time(&input.time).map_err(|e| e.to_string())?,
        input.participants,
    );
    if let Some(id) = input.exclude {
        request = request.moving(id);
    }

    let dto = match check_booking(&schedule, &request, &appointments, now) {
        Ok(slot) => BookingOutcomeDto {
            ok: true,
            remaining: Some(slot.remaining),
            reason: None,
        },
        Err(reason) => BookingOutcomeDto {
            ok: false,
            remaining: None,
            reason: Some(reason.to_string()),
        },
    };
    to_json(&dto)
}

fn bookable_dates_impl(schedule_json: &str, today: &str, horizon_days: u32) -> Result<String, String> {
    let schedule = parse_schedule(schedule_json)?;
    let today = parse_day(today)?;
    let dates = slot_engine::calendar::bookable_dates(&schedule, today, horizon_days);
    to_json(&dates)
}

fn month_grid_impl(year: i32, month: u32) -> Result<String, String> {
    let grid = slot_engine::calendar::month_grid(year, month).ok_or_else(|| format!("Invalid month: {}", month))?;
    to_json(&grid)
}

fn tomorrow_reminder_impl(appointments_json: &str, user_id: &str, now: &str) -> Result<String, String> {
    let appointments = parse_appointments(appointments_json)?;
    let now = parse_local_datetime(now)?;
    let reminder = slot_engine::appointments::tomorrow_reminder(&appointments, &UserId::from(user_id), now);
    to_json(&reminder)
}

fn time_range_impl(schedule_json: &str) -> Result<String, String> {
    let schedule = parse_schedule(schedule_json)?;
    Ok(slot_engine::calendar::time_range_summary(&schedule).to_string())
}

fn validate_schedule_impl(schedule_json: &str) -> Result<(), String> {
    let schedule = parse_schedule(schedule_json)?;
    slot_engine::validate_schedule(&schedule).map_err(|e| e.to_string())
}

// ---------------------------------------------------------------------------
// WASM exports
// ---------------------------------------------------------------------------

/// Compute the slots a schedule offers on a date.
///
/// Returns a JSON array of `{time, label, remaining}` objects in chronological
/// order.
///
/// # Arguments
/// - `schedule_json` -- A schedule row
/// - `date` -- `YYYY-MM-DD`
/// - `appointments_json` -- JSON array of appointment rows
/// - `now` -- Local datetime, e.g. `2026-03-16T09:30:00`
/// - `exclude` -- Optional appointment id left out of the seat count
#[wasm_bindgen(js_name = "availableSlots")]
pub fn available_slots(
    schedule_json: &str,
    date: &str,
    appointments_json: &str,
    now: &str,
    exclude: Option<String>,
) -> Result<String, JsValue> {
    available_slots_impl(schedule_json, date, appointments_json, now, exclude.as_deref()).map_err(js_err)
}

/// Check whether a booking request still fits its slot.
///
/// Returns `{ok: true, remaining}` or `{ok: false, reason}`. Malformed input is
/// thrown as an error instead.
#[wasm_bindgen(js_name = "checkBooking")]
pub fn check_booking_js(
    schedule_json: &str,
    request_json: &str,
    appointments_json: &str,
    now: &str,
) -> Result<String, JsValue> {
    check_booking_impl(schedule_json, request_json, appointments_json, now).map_err(js_err)
}

/// Dates from `today` on which the schedule is open, as a JSON array of
/// `YYYY-MM-DD` strings.
#[wasm_bindgen(js_name = "bookableDates")]
pub fn bookable_dates(schedule_json: &str, today: &str, horizon_days: u32) -> Result<String, JsValue> {
    bookable_dates_impl(schedule_json, today, horizon_days).map_err(js_err)
}

/// One month for a Sunday-first calendar: `{leadingBlanks, days}` where
/// `days` are `YYYY-MM-DD` strings. Throws for a month outside 1..=12.
#[wasm_bindgen(js_name = "monthGrid")]
pub fn month_grid(year: i32, month: u32) -> Result<String, JsValue> {
    month_grid_impl(year, month).map_err(js_err)
}

/// The user's appointment tomorrow that has not started, as a JSON row, or
/// `null` when there is none.
#[wasm_bindgen(js_name = "tomorrowReminder")]
pub fn tomorrow_reminder(appointments_json: &str, user_id: &str, now: &str) -> Result<String, JsValue> {
    tomorrow_reminder_impl(appointments_json, user_id, now).map_err(js_err)
}

/// Opening-hours span shown on a schedule card, e.g. `"08:00 - 20:00"`.
#[wasm_bindgen(js_name = "scheduleTimeRange")]
pub fn schedule_time_range(schedule_json: &str) -> Result<String, JsValue> {
    time_range_impl(schedule_json).map_err(js_err)
}

/// Throws with a description of the first invalid field, if any.
#[wasm_bindgen(js_name = "validateSchedule")]
pub fn validate_schedule(schedule_json: &str) -> Result<(), JsValue> {
    validate_schedule_impl(schedule_json).map_err(js_err)
}

/// Current local datetime in an IANA timezone, formatted for `availableSlots`.
#[wasm_bindgen(js_name = "localNow")]
pub fn local_now(timezone: &str) -> Result<String, JsValue> {
    slot_engine::clock::local_now(timezone)
        .map(|now| now.format("%Y-%m-%dT%H:%M:%S").to_string())
        .map_err(|e| js_err(e.to_string()))
}
