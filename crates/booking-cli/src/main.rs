//! `booking` CLI — slot availability and conflict checks from the command line.
//!
//! ## Usage
//!
//! ```sh
//! # Slot grid for a day, reservations piped on stdin
//! cat reservations.json | booking availability --date 2025-11-01
//!
//! # Same, from a file, as JSON, with the buffer rule from a config file
//! booking availability --date 2025-11-01 -i reservations.json --config engine.toml --json
//!
//! # May a wedding take 10:00 AM?
//! booking check -i reservations.json --date 2025-11-01 --time "10:00 AM" --service wedding
//!
//! # Funeral over a date range
//! booking check -i reservations.json --time 09:00 --service funeral \
//!     --funeral-start 2025-11-03 --funeral-end 2025-11-05
//!
//! # Normalize a time string
//! booking normalize-time "2:30 pm"
//! ```
//!
//! `check` exits 0 when the request is accepted and 2 when it is rejected.
//! Logs go to stderr; set `RUST_LOG=booking_engine=debug` for engine traces.

use anyhow::{Context, Result};
use booking_engine::wire::{parse_reservations_json, BookingRequestRecord};
use booking_engine::{
    summarize, BookingRequest, BookingValidator, EngineConfig, MemoryStore, SlotStatus, TimeOfDay,
};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::io::{self, Read};
use std::process;
use tracing_subscriber::EnvFilter;

/// Exit status for a rejected booking request.
const EXIT_REJECTED: i32 = 2;

#[derive(Parser)]
#[command(
    name = "booking",
    version,
    about = "Parish service slot availability and booking-conflict checks"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the status of every slot on a date
    Availability {
        /// Date to render (YYYY-MM-DD)
        #[arg(long)]
        date: String,
        /// Reservations JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Engine configuration (TOML)
        #[arg(long)]
        config: Option<String>,
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Check whether a booking request may be committed
    Check {
        /// Reservations JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Requested date (YYYY-MM-DD); optional for funerals
        #[arg(long)]
        date: Option<String>,
        /// Requested start time ("14:00", "2:00 PM", ...)
        #[arg(long)]
        time: String,
        /// Service type: wedding, baptism, funeral, confirmation
        #[arg(long)]
        service: String,
        /// First day of a funeral (inclusive)
        #[arg(long)]
        funeral_start: Option<String>,
        /// Last day of a funeral (inclusive)
        #[arg(long)]
        funeral_end: Option<String>,
        /// Name of the person booking
        #[arg(long)]
        name: Option<String>,
        /// Engine configuration (TOML)
        #[arg(long)]
        config: Option<String>,
        /// Emit JSON instead of a message
        #[arg(long)]
        json: bool,
    },
    /// Normalize a time string to 24-hour HH:MM
    NormalizeTime {
        /// Time to normalize
        time: String,
    },
}

#[derive(Serialize)]
struct AvailabilityReport<'a> {
    date: String,
    summary: booking_engine::DaySummary,
    slots: &'a [SlotStatus],
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Availability {
            date,
            input,
            config,
            json,
        } => {
            let date = booking_engine::time::parse_date(&date)
                .with_context(|| format!("Invalid --date: {}", date))?;
            let validator = load_validator(input.as_deref(), config.as_deref())?;
            let slots = validator
                .get_availability(date)
                .context("Failed to compute availability")?;
            let summary = summarize(&slots);

            if json {
                let report = AvailabilityReport {
                    date: date.to_string(),
                    summary,
                    slots: &slots,
                };
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}  ({})", date, summary.occupancy.label());
                for slot in &slots {
                    println!("{:>8}  {}", slot.start_time.to_12_hour(), slot.describe());
                }
            }
        }
        Commands::Check {
            input,
            date,
            time,
            service,
            funeral_start,
            funeral_end,
            name,
            config,
            json,
        } => {
            let record = BookingRequestRecord {
                date,
                time_slot: Some(time),
                service_type: Some(service),
                funeral_start_date: funeral_start,
                funeral_end_date: funeral_end,
                contact_name: name,
                ..Default::default()
            };
            let request =
                BookingRequest::try_from(record).context("Invalid booking request")?;
            let validator = load_validator(input.as_deref(), config.as_deref())?;
            let result = validator
                .validate(&request)
                .context("Failed to validate booking request")?;

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("{}", result.message);
            }
            if !result.accepted {
                process::exit(EXIT_REJECTED);
            }
        }
        Commands::NormalizeTime { time } => {
            let parsed = TimeOfDay::parse(&time)
                .with_context(|| format!("Failed to normalize time: {}", time))?;
            println!("{}", parsed);
        }
    }

    Ok(())
}

/// Logs to stderr so stdout stays clean for JSON output.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn load_validator(
    input: Option<&str>,
    config: Option<&str>,
) -> Result<BookingValidator<MemoryStore>> {
    let config = load_config(config)?;
    let json = read_input(input)?;
    let reservations =
        parse_reservations_json(&json).context("Failed to parse reservations")?;
    tracing::debug!(count = reservations.len(), "loaded reservation snapshot");

    let catalog = config
        .slot_catalog()
        .context("Invalid engine configuration")?;
    let store = MemoryStore::with_rules(catalog, config.buffer).seeded(reservations);
    BookingValidator::with_config(store, &config).context("Invalid engine configuration")
}

fn load_config(path: Option<&str>) -> Result<EngineConfig> {
    match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config: {}", path))?;
            toml::from_str(&text).with_context(|| format!("Failed to parse config: {}", path))
        }
        None => Ok(EngineConfig::default()),
    }
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}
