//! `recur` CLI — expand, validate and summarize recurring events from the command line.
//!
//! ## Usage
//!
//! ```sh
//! # First five Fridays-the-13th after a start date
//! recur expand --rrule "FREQ=MONTHLY;BYDAY=FR;BYMONTHDAY=13" --dtstart 19970902T090000 --limit 5
//!
//! # Weekly meeting with one skipped and one extra session, as JSON
//! recur expand --rrule "FREQ=WEEKLY;COUNT=6;BYDAY=TU" --dtstart 2026-03-03T10:00:00 \
//!     --duration 45 --exdate 2026-03-17T10:00:00 --rdate 2026-03-19T15:00:00 --json
//!
//! # Read a series from a JSON file and write the occurrences to a file
//! recur expand -i series.json -o occurrences.txt
//!
//! # Check a rule before storing it
//! recur validate --rrule "FREQ=WEEKLY;BYWEEKNO=20" --dtstart 20260101
//!
//! # Hours booked per week
//! recur usage --rrule "FREQ=DAILY;COUNT=30" --dtstart 20260302T090000 --duration 90 --bucket weekly
//! ```

mod config;

use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use recurrence_engine::{
    expand, parse_date_time, parse_rrule, validate, CivilDateTime, EventSeries, Occurrence,
    TimeUsed, TimelineUsage,
};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

const MINUTE_MS: i64 = 60 * 1000;

#[derive(Parser)]
#[command(name = "recur", version, about = "RRULE recurrence expansion CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file merged over ~/.config/recur/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Expand a series into its occurrences
    Expand {
        #[command(flatten)]
        series: SeriesArgs,
        /// Print JSON instead of one line per occurrence
        #[arg(long)]
        json: bool,
        /// Print at most this many occurrences
        #[arg(long)]
        limit: Option<usize>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Check a series and print its normalised rule
    Validate {
        #[command(flatten)]
        series: SeriesArgs,
    },
    /// Show time used per day, week or month
    Usage {
        #[command(flatten)]
        series: SeriesArgs,
        /// Bucket size
        #[arg(long, value_enum, default_value_t = Bucket::Daily)]
        bucket: Bucket,
        /// Print JSON instead of one line per bucket
        #[arg(long)]
        json: bool,
    },
}

/// A series given either as flags or as JSON (file or stdin).
#[derive(Args)]
struct SeriesArgs {
    /// Series JSON file (reads stdin when neither this nor --dtstart is given)
    #[arg(short, long, conflicts_with = "dtstart")]
    input: Option<String>,
    /// RRULE value, e.g. "FREQ=WEEKLY;BYDAY=MO,WE"
    #[arg(long, requires = "dtstart")]
    rrule: Option<String>,
    /// Series start (19970902T090000 or 1997-09-02T09:00:00)
    #[arg(long)]
    dtstart: Option<String>,
    /// End of the first occurrence
    #[arg(long, requires = "dtstart", conflicts_with = "duration")]
    dtend: Option<String>,
    /// Occurrence length in minutes
    #[arg(long, requires = "dtstart")]
    duration: Option<u32>,
    /// Extra occurrence start (repeatable)
    #[arg(long, requires = "rrule")]
    rdate: Vec<String>,
    /// Excluded occurrence start (repeatable)
    #[arg(long, requires = "rrule")]
    exdate: Vec<String>,
    /// Event UID copied onto every occurrence
    #[arg(long, default_value = "recur")]
    uid: String,
}

#[derive(Clone, Copy, ValueEnum)]
enum Bucket {
    Daily,
    Weekly,
    Monthly,
}

/// Occurrence as printed by `expand --json`.
#[derive(Serialize)]
struct OccurrenceOut<'a> {
    uid: &'a str,
    start: String,
    end: String,
    start_ms: i64,
    end_ms: i64,
}

/// Bucket as printed by `usage --json`.
#[derive(Serialize)]
struct UsageOut {
    start: String,
    minutes: i64,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // stdout carries command output only.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let config = Config::load_from(cli.config.as_deref()).context("Failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    match cli.command {
        Commands::Expand {
            series,
            json,
            limit,
            output,
        } => {
            let series = load_series(&series, &config)?;
            validate(&series).context("Invalid series")?;

            let mut occurrences = expand(&series);
            if let Some(limit) = limit {
                occurrences.truncate(limit);
            }

            let rendered = if json {
                let out: Vec<OccurrenceOut<'_>> = occurrences.iter().map(occurrence_out).collect();
                to_json(&out, config.pretty_json)?
            } else {
                occurrences.iter().map(occurrence_line).collect()
            };
            write_output(output.as_deref(), &rendered)?;
        }
        Commands::Validate { series } => {
            let series = load_series(&series, &config)?;
            validate(&series).context("Invalid series")?;
            match &series.rule {
                Some(rule) if series.is_recurring() => println!("RRULE:{rule}"),
                _ => println!("single event"),
            }
        }
        Commands::Usage {
            series,
            bucket,
            json,
        } => {
            let series = load_series(&series, &config)?;
            validate(&series).context("Invalid series")?;

            let usage = TimelineUsage::new(&expand(&series), config.first_day_of_week);
            let buckets = match bucket {
                Bucket::Daily => usage.daily(),
                Bucket::Weekly => usage.weekly(),
                Bucket::Monthly => usage.monthly(),
            };

            if json {
                let out: Vec<UsageOut> = buckets.iter().map(usage_out).collect();
                println!("{}", to_json(&out, config.pretty_json)?);
            } else {
                for entry in buckets.iter().map(usage_out) {
                    println!("{} {}", entry.start, entry.minutes);
                }
            }
        }
    }

    Ok(())
}

/// Build the series from flags, or read it as JSON when no `--dtstart` is given.
fn load_series(args: &SeriesArgs, config: &Config) -> Result<EventSeries> {
    let Some(dtstart) = args.dtstart.as_deref() else {
        let json = read_input(args.input.as_deref())?;
        if json.trim().is_empty() {
            bail!("No series given: pass --dtstart, -i <file>, or series JSON on stdin");
        }
        return serde_json::from_str(&json).context("Failed to parse series JSON");
    };

    let start = parse_date_time(dtstart).context("Invalid --dtstart")?;
    let duration = match (&args.dtend, args.duration) {
        (Some(dtend), _) => parse_date_time(dtend).context("Invalid --dtend")? - start,
        (None, Some(minutes)) => i64::from(minutes) * MINUTE_MS,
        (None, None) => i64::from(config.default_duration_minutes) * MINUTE_MS,
    };

    let Some(rrule) = args.rrule.as_deref() else {
        return Ok(EventSeries::single(args.uid.as_str(), start, start + duration));
    };

    let rule = parse_rrule(rrule).context("Invalid --rrule")?;
    let mut series = EventSeries::recurring(args.uid.as_str(), start, duration, rule);
    for rdate in &args.rdate {
        let at = parse_date_time(rdate).with_context(|| format!("Invalid --rdate '{}'", rdate))?;
        series = series.with_additional(at);
    }
    for exdate in &args.exdate {
        let at = parse_date_time(exdate).with_context(|| format!("Invalid --exdate '{}'", exdate))?;
        series = series.with_excluded(at);
    }
    tracing::debug!(uid = %series.uid, rule = %rrule, "built series from arguments");
    Ok(series)
}

fn civil_text(ms: i64) -> String {
    CivilDateTime::from_millis(ms)
        .map(|dt| dt.to_string())
        .unwrap_or_else(|| ms.to_string())
}

fn occurrence_line(occurrence: &Occurrence) -> String {
    format!("{} {}\n", civil_text(occurrence.start), civil_text(occurrence.end))
}

fn occurrence_out(occurrence: &Occurrence) -> OccurrenceOut<'_> {
    OccurrenceOut {
        uid: &occurrence.uid,
        start: civil_text(occurrence.start),
        end: civil_text(occurrence.end),
        start_ms: occurrence.start,
        end_ms: occurrence.end,
    }
}

fn usage_out(entry: &TimeUsed) -> UsageOut {
    UsageOut {
        start: civil_text(entry.start),
        minutes: entry.duration / MINUTE_MS,
    }
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(json + "\n")
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
            print!("{}", content);
        }
    }
    Ok(())
}
