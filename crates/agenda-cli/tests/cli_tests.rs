//! Integration tests for the `agenda` CLI binary.
//!
//! These tests use `assert_cmd` and `predicates` to run each subcommand against
//! JSON fixtures with a pinned `--now`, covering table and JSON output, the
//! environment fallbacks, and error reporting.

// `Command::cargo_bin` was deprecated in assert_cmd 2.1.2 in favor of
// `cargo::cargo_bin_cmd!`. Allow it until we migrate.
#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;

/// Helper: path to the main data fixture.
fn agenda_json_path() -> &'static str {
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/agenda.json")
}

/// Helper: path to a fixture whose 09:00 slot holds one participant too many.
fn overbooked_json_path() -> &'static str {
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/overbooked.json")
}

/// Helper: `agenda --data <fixture> --now <now>` with the environment cleared.
fn agenda(now: &str) -> Command {
    let mut cmd = Command::cargo_bin("agenda").unwrap();
    cmd.env_remove("AGENDA_DATA")
        .env_remove("AGENDA_TZ")
        .env_remove("RUST_LOG")
        .args(["--data", agenda_json_path(), "--now", now]);
    cmd
}

const BEFORE: &str = "2026-03-10T12:00";

// ─────────────────────────────────────────────────────────────────────────────
// slots
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn slots_table_marks_full_slots() {
    agenda(BEFORE)
        .args(["slots", "--schedule", "carrinho-centro", "--date", "2026-03-16"])
        .assert()
        .success()
        .stdout(predicate::str::contains("08:00  2 left"))
        .stdout(predicate::str::contains("09:00  full"))
        .stdout(predicate::str::contains("10:00  full"))
        .stdout(predicate::str::contains("11:00  2 left"));
}

#[test]
fn slots_json_is_parseable() {
    let output = agenda(BEFORE)
        .args(["--format", "json", "slots", "-s", "carrinho-centro", "-d", "2026-03-16"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let slots: serde_json::Value = serde_json::from_slice(&output.stdout).expect("stdout must be JSON");
    let slots = slots.as_array().unwrap();
    assert_eq!(slots.len(), 4);
    assert_eq!(slots[1]["label"], "09:00");
    assert_eq!(slots[1]["remaining"], 0);
}

#[test]
fn slots_use_weekday_override() {
    agenda(BEFORE)
        .args(["slots", "-s", "carrinho-centro", "-d", "2026-03-18"])
        .assert()
        .success()
        .stdout(predicate::str::contains("14:00  2 left"))
        .stdout(predicate::str::contains("15:00  2 left"))
        .stdout(predicate::str::contains("08:00").not());
}

#[test]
fn slots_hide_started_ones_today() {
    agenda("2026-03-16T09:30")
        .args(["slots", "-s", "carrinho-centro", "-d", "2026-03-16"])
        .assert()
        .success()
        .stdout(predicate::str::contains("08:00").not())
        .stdout(predicate::str::contains("09:00").not())
        .stdout(predicate::str::contains("10:00  full"));
}

#[test]
fn slots_exclude_frees_the_moved_appointment() {
    agenda(BEFORE)
        .args(["slots", "-s", "carrinho-centro", "-d", "2026-03-16", "--exclude", "a2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("10:00  2 left"));
}

#[test]
fn slots_exclude_must_name_an_existing_appointment() {
    agenda(BEFORE)
        .args(["slots", "-s", "carrinho-centro", "-d", "2026-03-16", "--exclude", "a9"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown appointment: a9"));
}

#[test]
fn slots_on_closed_day_say_so() {
    agenda(BEFORE)
        .args(["slots", "-s", "carrinho-centro", "-d", "2026-03-15"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No slots on 2026-03-15"));
}

// ─────────────────────────────────────────────────────────────────────────────
// dates / range
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn dates_skip_closed_weekdays() {
    agenda(BEFORE)
        .args(["dates", "-s", "carrinho-centro", "--days", "7"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2026-03-10 Tue"))
        .stdout(predicate::str::contains("2026-03-16 Mon"))
        .stdout(predicate::str::contains("2026-03-14").not())
        .stdout(predicate::str::contains("2026-03-15").not());
}

#[test]
fn range_spans_default_and_override() {
    agenda(BEFORE)
        .arg("range")
        .assert()
        .success()
        .stdout(predicate::str::contains("carrinho-centro  08:00 - 16:00  Carrinho Centro"))
        .stdout(predicate::str::contains("display-praca  09:00 - 11:00  Display Praça"));
}

// ─────────────────────────────────────────────────────────────────────────────
// book-check
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn book_check_accepts_pair_in_free_slot() {
    agenda(BEFORE)
        .args([
            "book-check", "-s", "carrinho-centro", "-d", "2026-03-16", "-t", "11:00",
            "--participant", "u1", "--walkin", "Maria",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("OK: 2 seat(s) left at 2026-03-16 11:00"));
}

#[test]
fn book_check_refuses_full_slot() {
    agenda(BEFORE)
        .args([
            "book-check", "-s", "carrinho-centro", "-d", "2026-03-16", "-t", "09:00",
            "--participant", "u3",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Booking refused: slot has 0 seat(s) left, 1 requested"));
}

#[test]
fn book_check_refuses_paused_schedule() {
    agenda(BEFORE)
        .args([
            "book-check", "-s", "display-praca", "-d", "2026-03-14", "-t", "09:00",
            "--participant", "u1",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("schedule is paused"));
}

#[test]
fn book_check_json_reports_reason_on_stdout() {
    agenda(BEFORE)
        .args([
            "--format", "json", "book-check", "-s", "carrinho-centro", "-d", "2026-03-16",
            "-t", "09:30", "--participant", "u1",
        ])
        .assert()
        .failure()
        .stdout(predicate::str::contains("\"ok\": false"))
        .stdout(predicate::str::contains("not a slot boundary"));
}

// ─────────────────────────────────────────────────────────────────────────────
// check
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn check_passes_on_clean_data() {
    agenda(BEFORE)
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("OK: 2 schedule(s), 3 appointment(s)"));
}

#[test]
fn check_flags_overbooked_slot() {
    Command::cargo_bin("agenda")
        .unwrap()
        .env_remove("RUST_LOG")
        .args(["--data", overbooked_json_path(), "--now", BEFORE, "check"])
        .assert()
        .failure()
        .stdout(predicate::str::contains(
            "Slot 2026-03-16 09:00 on 'carrinho-centro' holds 3 participant(s), capacity 2",
        ))
        .stderr(predicate::str::contains("1 problem(s) found"));
}

// ─────────────────────────────────────────────────────────────────────────────
// listings
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn upcoming_lists_user_appointments_with_names() {
    agenda(BEFORE)
        .args(["upcoming", "--user", "u1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2026-03-16 09:00  Carrinho Centro  Ana Souza, Bruno Lima"))
        .stdout(predicate::str::contains("2026-03-16 10:00  Carrinho Centro  Ana Souza, Maria"));
}

#[test]
fn appointments_filter_by_walkin_name() {
    agenda(BEFORE)
        .args(["appointments", "--name", "maria"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Upcoming (1)"))
        .stdout(predicate::str::contains("Past (0)"));
}

#[test]
fn appointments_split_around_now() {
    agenda(BEFORE)
        .arg("appointments")
        .assert()
        .success()
        .stdout(predicate::str::contains("Upcoming (2)"))
        .stdout(predicate::str::contains("Past (1)"));
}

#[test]
fn announcements_hide_inactive_ones() {
    agenda(BEFORE)
        .arg("announcements")
        .assert()
        .success()
        .stdout(predicate::str::contains("Nova agenda"))
        .stdout(predicate::str::contains("Rascunho").not());
}

#[test]
fn announcements_show_future_dated_posts_in_stored_order() {
    agenda(BEFORE)
        .arg("announcements")
        .assert()
        .success()
        .stdout(predicate::str::is_match("(?s)Nova agenda.*2026-04-02  Feriado").unwrap());
}

// ─────────────────────────────────────────────────────────────────────────────
// reminder
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn reminder_shows_earliest_appointment_tomorrow() {
    agenda("2026-03-15T20:00")
        .args(["reminder", "-u", "u1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Don't forget your appointment tomorrow:"))
        .stdout(predicate::str::contains("2026-03-16 09:00  Carrinho Centro  Ana Souza, Bruno Lima"));
}

#[test]
fn reminder_is_empty_two_days_ahead() {
    agenda("2026-03-14T20:00")
        .args(["reminder", "-u", "u1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No appointment tomorrow"));
}

#[test]
fn reminder_json_is_null_without_appointment() {
    agenda(BEFORE)
        .args(["--format", "json", "reminder", "-u", "u2"])
        .assert()
        .success()
        .stdout(predicate::str::diff("null\n"));
}

// ─────────────────────────────────────────────────────────────────────────────
// configuration and errors
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn data_path_falls_back_to_environment() {
    Command::cargo_bin("agenda")
        .unwrap()
        .env("AGENDA_DATA", agenda_json_path())
        .env_remove("RUST_LOG")
        .args(["--now", BEFORE, "range", "-s", "carrinho-centro"])
        .assert()
        .success()
        .stdout(predicate::str::contains("08:00 - 16:00"));
}

#[test]
fn unknown_schedule_is_an_error() {
    agenda(BEFORE)
        .args(["slots", "-s", "nope", "-d", "2026-03-16"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown schedule: nope"));
}

#[test]
fn missing_data_file_is_an_error() {
    Command::cargo_bin("agenda")
        .unwrap()
        .env_remove("AGENDA_DATA")
        .args(["--data", "/tmp/agenda-test-does-not-exist.json", "range"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read data file"));
}

#[test]
fn invalid_timezone_is_an_error() {
    agenda(BEFORE)
        .args(["--timezone", "Mars/Olympus", "range"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid timezone: Mars/Olympus"));
}

#[test]
fn invalid_now_is_an_error() {
    Command::cargo_bin("agenda")
        .unwrap()
        .args(["--data", agenda_json_path(), "--now", "tomorrow", "range"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid --now: tomorrow"));
}
