//! `schedule` CLI — check conflicts, list slots, and score a provider day from a JSON snapshot.
//!
//! ## Usage
//!
//! ```sh
//! # Would 09:30 for 30 minutes collide with anything? (stdin → stdout)
//! cat day.json | schedule check --at 09:30 --duration 30
//!
//! # Bookable 45-minute slots on a 15-minute grid
//! schedule slots -i day.json --duration 45 --granularity 15 --bookable-only
//!
//! # Advisory utilization score, with custom buffer rules
//! schedule --config engine.json score -i day.json
//!
//! # Debug logging to stderr
//! schedule -v slots -i day.json --duration 30
//! ```

mod snapshot;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use schedule_engine::{Conflict, EngineConfig, InMemoryStore, Interval, SchedulingService};
use serde::Serialize;
use std::io::{self, Read};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use snapshot::{parse_time, DaySnapshot, IntervalOutput};

#[derive(Parser)]
#[command(
    name = "schedule",
    version,
    about = "Appointment conflict checks, bookable slots and day scoring"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Engine config JSON (classifier rules, scoring thresholds, default grid)
    #[arg(long, global = true)]
    config: Option<String>,

    /// Log engine decisions to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a candidate appointment against the day's bookings
    Check {
        /// Day snapshot file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Candidate start time (HH:MM)
        #[arg(long)]
        at: String,
        /// Candidate duration in minutes
        #[arg(long)]
        duration: i32,
        /// Id of the booking being moved; its current slot is ignored
        #[arg(long)]
        editing: Option<String>,
    },
    /// List candidate slots on a grid over the working day
    Slots {
        /// Day snapshot file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Appointment duration in minutes
        #[arg(long)]
        duration: i32,
        /// Grid step in minutes (defaults to the configured grid)
        #[arg(long)]
        granularity: Option<i32>,
        /// Omit slots that cannot be booked
        #[arg(long)]
        bookable_only: bool,
    },
    /// Advisory utilization, idle-gap and overlap report for the day
    Score {
        /// Day snapshot file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
    },
}

#[derive(Serialize)]
struct CheckOutput {
    candidate: IntervalOutput,
    safe_to_book: bool,
    conflicts: Vec<Conflict>,
}

#[derive(Serialize)]
struct SlotOutput {
    #[serde(flatten)]
    interval: IntervalOutput,
    bookable: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<Conflict>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match cli.config.as_deref() {
        Some(path) => EngineConfig::from_path(path)
            .with_context(|| format!("Failed to load config: {}", path))?,
        None => EngineConfig::default(),
    };
    debug!(?config, "engine config");

    match cli.command {
        Commands::Check {
            input,
            at,
            duration,
            editing,
        } => {
            let snapshot = DaySnapshot::from_json(&read_input(input.as_deref())?)?;
            let (provider_id, date) = (snapshot.provider_id.clone(), snapshot.date);
            let service = load_service(snapshot, config)?;

            let candidate = Interval::from_time(date, parse_time(&at)?, duration)
                .context("Invalid candidate appointment")?;
            let conflicts = match editing.as_deref() {
                Some(id) => service.check_conflicts_for_edit(&candidate, &provider_id, id)?,
                None => service.check_conflicts(&candidate, &provider_id)?,
            };

            print_json(&CheckOutput {
                candidate: IntervalOutput::from(&candidate),
                safe_to_book: conflicts.is_empty(),
                conflicts,
            })?;
        }
        Commands::Slots {
            input,
            output,
            duration,
            granularity,
            bookable_only,
        } => {
            let snapshot = DaySnapshot::from_json(&read_input(input.as_deref())?)?;
            let (provider_id, date) = (snapshot.provider_id.clone(), snapshot.date);
            let service = load_service(snapshot, config)?;

            let slots: Vec<SlotOutput> = service
                .list_available_slots(&provider_id, date, duration, granularity)
                .context("Failed to list slots")?
                .into_iter()
                .filter(|s| s.bookable || !bookable_only)
                .map(|s| SlotOutput {
                    interval: IntervalOutput::from(&s.interval),
                    bookable: s.bookable,
                    warnings: s.soft_warnings,
                })
                .collect();

            let json = serde_json::to_string_pretty(&slots)?;
            write_output(output.as_deref(), &json)?;
        }
        Commands::Score { input } => {
            let snapshot = DaySnapshot::from_json(&read_input(input.as_deref())?)?;
            let (provider_id, date) = (snapshot.provider_id.clone(), snapshot.date);
            let service = load_service(snapshot, config)?;

            let report = service.get_schedule_score(&provider_id, date)?;
            print_json(&report)?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn load_service(
    snapshot: DaySnapshot,
    config: EngineConfig,
) -> Result<SchedulingService<InMemoryStore>> {
    let store = snapshot.into_store().context("Failed to load day snapshot")?;
    Ok(SchedulingService::new(store, config))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
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

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
