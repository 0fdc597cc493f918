use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use tracing::debug;

use crate::error::ScoutError;
use crate::logging::init_logging;
use crate::options::ScrapeOptions;
use crate::runtime;
use crate::tools::dates::{parse_schedule_from, Schedule};
use crate::tools::fallback::OpenAiGenerator;
use crate::{ApiResponse, EventType, Scout, ScrapedEvent, TimeWindow, VenueContext};

#[derive(Parser)]
#[command(name = "venue-scout", version, about = "Venue event discovery (JSON only)")]
pub struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Discover and extract events from a venue website
    Scrape(ScrapeArgs),
    /// Parse a date/time expression (debug aid)
    Dates(DatesArgs),
}

#[derive(Args)]
struct ScrapeArgs {
    /// Venue homepage; a bare host gets https://
    url: String,
    /// Display name used in logs and the fallback prompt
    #[arg(long)]
    name: Option<String>,
    /// Keep only one event type (exhibition, tour, talk, workshop, event)
    #[arg(long = "type")]
    event_type: Option<EventType>,
    /// today, this_week, this_month or all
    #[arg(long, default_value = "all")]
    window: TimeWindow,
    /// Never ask the text-model fallback
    #[arg(long = "no-llm")]
    no_llm: bool,
    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,
    /// JSON file with engine options
    #[arg(long, value_name = "FILE")]
    config: Option<String>,
    /// Reference date for windows and yearless dates (YYYY-MM-DD)
    #[arg(long)]
    today: Option<NaiveDate>,
    #[arg(long, short)]
    verbose: bool,
}

#[derive(Args)]
struct DatesArgs {
    text: String,
    /// Reference date for yearless dates (YYYY-MM-DD)
    #[arg(long)]
    today: Option<NaiveDate>,
}

/// Parse arguments and print one JSON response on stdout.
///
/// Engine failures are reported inside the JSON; only an unwritable
/// response is an error here.
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Scrape(args) => {
            init_logging(args.verbose);
            finish(scrape_cmd(args))
        }
        Command::Dates(args) => {
            let today = args.today.unwrap_or_else(|| Local::now().date_naive());
            finish(dates_cmd(&args.text, today))
        }
    }
}

fn scrape_cmd(args: ScrapeArgs) -> crate::Result<Vec<ScrapedEvent>> {
    let mut options = match &args.config {
        Some(path) => load_options(path)?,
        None => ScrapeOptions::default(),
    };
    if let Some(secs) = args.timeout {
        options = options.with_request_timeout(Duration::from_secs(secs.max(1)));
    }
    if args.no_llm {
        options = options.with_llm_fallback(false);
    }

    let mut scout = Scout::new(options);
    if !args.no_llm {
        match OpenAiGenerator::from_env() {
            Ok(generator) => scout = scout.with_generator(Arc::new(generator)),
            Err(e) => debug!(error = %e, "text-model fallback disabled"),
        }
    }

    let name = args.name.as_deref().unwrap_or(args.url.as_str());
    let mut venue = VenueContext::new(&args.url, name, args.event_type, args.window)?;
    if let Some(today) = args.today {
        venue = venue.with_today(today);
    }
    runtime::block_on(scout.scrape_context(&venue))
}

fn load_options(path: &str) -> crate::Result<ScrapeOptions> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| ScoutError::Config(format!("cannot read {path}: {e}")))?;
    serde_json::from_str(&raw).map_err(|e| ScoutError::Config(format!("invalid options json: {e}")))
}

fn dates_cmd(text: &str, today: NaiveDate) -> crate::Result<Schedule> {
    parse_schedule_from(text, today)
        .ok_or_else(|| ScoutError::Config(format!("no date or time found in {text:?}")))
}

fn finish<T: serde::Serialize>(res: crate::Result<T>) -> anyhow::Result<()> {
    match res {
        Ok(v) => print_json(ApiResponse::ok(v)),
        Err(e) => print_json(ApiResponse::<()>::err(e.to_string())),
    }
}

fn print_json<T: serde::Serialize>(val: T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(&val).context("failed to serialize response")?;
    println!("{json}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    #[test]
    fn parses_scrape_flags() {
        let cli = Cli::try_parse_from([
            "venue-scout",
            "scrape",
            "museum.org",
            "--name",
            "City Museum",
            "--type",
            "exhibition",
            "--window",
            "this_week",
            "--no-llm",
            "--timeout",
            "5",
        ])
        .unwrap();
        let Command::Scrape(args) = cli.cmd else {
            panic!("expected scrape");
        };
        assert_eq!(args.url, "museum.org");
        assert_eq!(args.event_type, Some(EventType::Exhibition));
        assert_eq!(args.window, TimeWindow::ThisWeek);
        assert!(args.no_llm);
        assert_eq!(args.timeout, Some(5));
    }

    #[test]
    fn rejects_unknown_window() {
        assert!(Cli::try_parse_from(["venue-scout", "scrape", "museum.org", "--window", "decade"]).is_err());
    }

    #[test]
    fn dates_command_parses_schedule() {
        let today = NaiveDate::from_ymd_opt(2025, 9, 1).unwrap();
        let schedule = dates_cmd("Friday, Dec 5, 2025 | 1:00 p.m. - 2:00 p.m.", today).unwrap();
        assert_eq!(schedule.start_date(), NaiveDate::from_ymd_opt(2025, 12, 5));
        assert_eq!(schedule.start_time, NaiveTime::from_hms_opt(13, 0, 0));
        assert_eq!(schedule.end_time, NaiveTime::from_hms_opt(14, 0, 0));

        assert!(dates_cmd("no dates here", today).is_err());
    }
}
