//! `agenda` CLI: inspect schedules, slot availability and bookings from an
//! exported data file.
//!
//! ## Usage
//!
//! ```sh
//! # Slots offered on a date, with seats left
//! agenda --data agenda.json slots --schedule carrinho-centro --date 2026-03-16
//!
//! # Same, pretending it is 09:30 that morning, as JSON
//! agenda --now 2026-03-16T09:30 --format json slots -s carrinho-centro -d 2026-03-16
//!
//! # Would this pair still fit?
//! agenda book-check -s carrinho-centro -d 2026-03-16 -t 10:00 --participant u1 --walkin "Maria"
//!
//! # Validate every schedule and appointment, flag overbooked slots
//! agenda check
//!
//! # Anything booked for u1 tomorrow?
//! agenda reminder -u u1
//! ```
//!
//! The data file is a JSON object with optional `schedules`, `appointments`,
//! `users` and `announcements` arrays in the store's row format.

mod check;

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use slot_engine::appointments::{
    participant_name, partition_by_time, tomorrow_reminder, upcoming_for_user, AppointmentFilter,
};
use slot_engine::booking::{check_booking, BookingRequest};
use slot_engine::calendar::{bookable_dates, time_range_summary, DEFAULT_HORIZON_DAYS};
use slot_engine::clock::{self, DEFAULT_TIMEZONE};
use slot_engine::model::{self, active_announcements, Appointment, DataSet, Participant, Schedule, UserId};
use slot_engine::slots::available_slots;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "agenda",
    version,
    about = "Schedule and slot availability CLI"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Exported data file (JSON)
    #[arg(long, env = "AGENDA_DATA", default_value = "agenda.json", global = true)]
    data: String,

    /// IANA timezone the venues operate in
    #[arg(long, env = "AGENDA_TZ", default_value = DEFAULT_TIMEZONE, global = true)]
    timezone: String,

    /// Use this local time instead of the clock (YYYY-MM-DDTHH:MM[:SS])
    #[arg(long, global = true)]
    now: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Table, global = true)]
    format: Format,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Table,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// List the slots a schedule offers on a date
    Slots {
        #[arg(short, long)]
        schedule: String,
        /// Date (YYYY-MM-DD)
        #[arg(short, long)]
        date: String,
        /// Appointment to leave out of the seat count
        #[arg(long)]
        exclude: Option<String>,
    },
    /// List the dates a schedule is open, starting today
    Dates {
        #[arg(short, long)]
        schedule: String,
        /// How many days ahead to look
        #[arg(long, default_value_t = DEFAULT_HORIZON_DAYS)]
        days: u32,
    },
    /// Check whether a booking would still fit its slot
    BookCheck {
        #[arg(short, long)]
        schedule: String,
        #[arg(short, long)]
        date: String,
        /// Slot start (HH:MM)
        #[arg(short, long)]
        time: String,
        /// Registered participant id (repeatable)
        #[arg(long = "participant")]
        participants: Vec<String>,
        /// Walk-in participant name (repeatable)
        #[arg(long = "walkin")]
        walkins: Vec<String>,
        /// Appointment being moved into this slot
        #[arg(long)]
        exclude: Option<String>,
    },
    /// Validate schedules and appointments and report overbooked slots
    Check,
    /// A user's upcoming appointments
    Upcoming {
        #[arg(short, long)]
        user: String,
    },
    /// The user's appointment tomorrow, if any
    Reminder {
        #[arg(short, long)]
        user: String,
    },
    /// All appointments, split into upcoming and past
    Appointments {
        /// Only this date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
        /// Participant name contains (case-insensitive)
        #[arg(long)]
        name: Option<String>,
    },
    /// Opening-hours span of one schedule, or of all of them
    Range {
        #[arg(short, long)]
        schedule: Option<String>,
    },
    /// Announcements currently shown
    Announcements,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let data = load_data(&cli.data)?;
    let now = resolve_now(cli.now.as_deref(), &cli.timezone)?;
    debug!(%now, data = %cli.data, "starting");

    match cli.command {
        Commands::Slots {
            schedule,
            date,
            exclude,
        } => {
            let schedule = find_schedule(&data, &schedule)?;
            let date = parse_date_arg(&date)?;
            let exclude = match exclude {
                Some(id) => Some(find_appointment(&data, &id)?.id.clone()),
                None => None,
            };
            let slots = available_slots(schedule, date, &data.appointments, now, exclude.as_ref());
            emit(cli.format, &slots, || {
                if slots.is_empty() {
                    println!("No slots on {}", date);
                }
                for slot in &slots {
                    if slot.is_full() {
                        println!("{}  full", slot.label);
                    } else {
                        println!("{}  {} left", slot.label, slot.remaining);
                    }
                }
            })?;
        }
        Commands::Dates { schedule, days } => {
            let schedule = find_schedule(&data, &schedule)?;
            let dates = bookable_dates(schedule, now.date(), days);
            emit(cli.format, &dates, || {
                for date in &dates {
                    println!("{} {}", date, date.weekday());
                }
            })?;
        }
        Commands::BookCheck {
            schedule,
            date,
            time,
            participants,
            walkins,
            exclude,
        } => {
            let schedule = find_schedule(&data, &schedule)?;
            let participants: Vec<Participant> = participants
                .into_iter()
                .map(Participant::registered)
                .chain(walkins.into_iter().map(Participant::walkin))
                .collect();
            let mut request = BookingRequest::new(
                parse_date_arg(&date)?,
                model::parse_time(&time).with_context(|| format!("Invalid --time: {}", time))?,
                participants,
            );
            if let Some(id) = exclude {
                request = request.moving(find_appointment(&data, &id)?.id.clone());
            }

            match check_booking(schedule, &request, &data.appointments, now) {
                Ok(slot) => {
                    let outcome = serde_json::json!({ "ok": true, "remaining": slot.remaining });
                    emit(cli.format, &outcome, || {
                        println!("OK: {} seat(s) left at {} {}", slot.remaining, request.date, slot.label);
                    })?;
                }
                Err(reason) => {
                    if cli.format == Format::Json {
                        let outcome = serde_json::json!({ "ok": false, "reason": reason.to_string() });
                        println!("{}", serde_json::to_string_pretty(&outcome)?);
                    }
                    anyhow::bail!("Booking refused: {}", reason);
                }
            }
        }
        Commands::Check => {
            let problems = check::check_data(&data);
            emit(cli.format, &problems, || {
                for problem in &problems {
                    println!("{}", problem);
                }
            })?;
            if !problems.is_empty() {
                anyhow::bail!("{} problem(s) found", problems.len());
            }
            if cli.format == Format::Table {
                println!(
                    "OK: {} schedule(s), {} appointment(s)",
                    data.schedules.len(),
                    data.appointments.len()
                );
            }
        }
        Commands::Upcoming { user } => {
            let user = UserId::from(user);
            let upcoming = upcoming_for_user(&data.appointments, &user, now);
            emit(cli.format, &upcoming, || {
                if upcoming.is_empty() {
                    println!("No upcoming appointments");
                }
                for appointment in &upcoming {
                    println!("{}", describe(appointment, &data));
                }
            })?;
        }
        Commands::Reminder { user } => {
            let user = UserId::from(user);
            let reminder = tomorrow_reminder(&data.appointments, &user, now);
            emit(cli.format, &reminder, || match reminder {
                Some(appointment) => {
                    println!("Don't forget your appointment tomorrow:");
                    println!("  {}", describe(appointment, &data));
                }
                None => println!("No appointment tomorrow"),
            })?;
        }
        Commands::Appointments { date, name } => {
            let filter = AppointmentFilter {
                date: date.as_deref().map(parse_date_arg).transpose()?,
                name,
            };
            let parts = partition_by_time(&data.appointments, &data.users, &filter, now);
            let json = serde_json::json!({ "upcoming": parts.upcoming, "past": parts.past });
            emit(cli.format, &json, || {
                println!("Upcoming ({})", parts.upcoming.len());
                for appointment in &parts.upcoming {
                    println!("  {}", describe(appointment, &data));
                }
                println!("Past ({})", parts.past.len());
                for appointment in &parts.past {
                    println!("  {}", describe(appointment, &data));
                }
            })?;
        }
        Commands::Range { schedule } => {
            let schedules: Vec<&Schedule> = match schedule {
                Some(id) => vec![find_schedule(&data, &id)?],
                None => data.schedules.iter().collect(),
            };
            let ranges: Vec<ScheduleRange> = schedules
                .iter()
                .map(|s| ScheduleRange {
                    id: s.id.to_string(),
                    name: s.name.clone(),
                    range: time_range_summary(s).to_string(),
                })
                .collect();
            emit(cli.format, &ranges, || {
                for r in &ranges {
                    println!("{}  {}  {}", r.id, r.range, r.name);
                }
            })?;
        }
        Commands::Announcements => {
            let shown = active_announcements(&data.announcements);
            emit(cli.format, &shown, || {
                for a in &shown {
                    println!("{}  {}", a.date, a.title);
                    println!("    {}", a.content);
                }
            })?;
        }
    }

    Ok(())
}

#[derive(Serialize)]
struct ScheduleRange {
    id: String,
    name: String,
    range: String,
}

/// Log to stderr so stdout stays parseable. `RUST_LOG` wins over `-v`.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_data(path: &str) -> Result<DataSet> {
    let json =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read data file: {}", path))?;
    DataSet::from_json(&json).with_context(|| format!("Failed to parse data file: {}", path))
}

fn resolve_now(fixed: Option<&str>, timezone: &str) -> Result<NaiveDateTime> {
    // Validate the zone even when --now pins the time.
    clock::parse_timezone(timezone)?;
    match fixed {
        Some(s) => NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
            .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M"))
            .with_context(|| format!("Invalid --now: {}", s)),
        None => Ok(clock::local_now(timezone)?),
    }
}

fn parse_date_arg(s: &str) -> Result<NaiveDate> {
    Ok(model::parse_date(s)?)
}

fn find_schedule<'a>(data: &'a DataSet, id: &str) -> Result<&'a Schedule> {
    data.schedule(id)
        .with_context(|| format!("Unknown schedule: {}", id))
}

fn find_appointment<'a>(data: &'a DataSet, id: &str) -> Result<&'a Appointment> {
    data.appointment(id)
        .with_context(|| format!("Unknown appointment: {}", id))
}

/// One-line summary: date, time, schedule name, participant names.
fn describe(appointment: &Appointment, data: &DataSet) -> String {
    let schedule = data
        .schedule(appointment.schedule_id.as_str())
        .map(|s| s.name.as_str())
        .unwrap_or("?");
    let names: Vec<&str> = appointment
        .participants
        .iter()
        .map(|p| participant_name(p, &data.users))
        .collect();
    format!(
        "{} {}  {}  {}",
        appointment.date,
        model::time_label(appointment.time),
        schedule,
        names.join(", ")
    )
}

/// Print `value` as pretty JSON, or run `table` for human output.
fn emit<T: Serialize + ?Sized>(format: Format, value: &T, table: impl FnOnce()) -> Result<()> {
    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(value)?),
        Format::Table => table(),
    }
    Ok(())
}
