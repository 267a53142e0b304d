//! `meeting` CLI — resolve meeting requests against participant calendars.
//!
//! ## Usage
//!
//! ```sh
//! # Resolve a request (stdin → stdout)
//! cat request.json | meeting resolve
//!
//! # Resolve from file to file, with business hours in IST
//! meeting resolve -i request.json -o response.json --timezone Asia/Kolkata
//!
//! # Print the raw engine decision instead of the formatted response
//! meeting resolve -i request.json --raw
//!
//! # Show everyone's common free time on one day
//! meeting free -i request.json --date 2026-03-17
//! ```

mod request;

use std::io::{self, Read};

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveTime};
use clap::{Args, Parser, Subcommand};
use meeting_engine::response::format_response;
use meeting_engine::{Aggregator, EngineConfig, Resolver};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::request::RequestFile;

#[derive(Parser)]
#[command(
    name = "meeting",
    version,
    about = "Resolve meeting requests against participant calendars"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log engine decisions to stderr (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Decide when and with whom to hold the requested meeting
    Resolve {
        /// Request file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Print the engine decision instead of the formatted response
        #[arg(long)]
        raw: bool,
        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Show the common free time of all participants on a date
    Free {
        /// Request file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Date to inspect (YYYY-MM-DD)
        #[arg(long)]
        date: NaiveDate,
        #[command(flatten)]
        config: ConfigArgs,
    },
}

#[derive(Args)]
struct ConfigArgs {
    /// Engine configuration file (JSON)
    #[arg(long)]
    config: Option<String>,
    /// Business-hours opening time (HH:MM)
    #[arg(long, value_parser = parse_time)]
    open: Option<NaiveTime>,
    /// Business-hours closing time (HH:MM)
    #[arg(long, value_parser = parse_time)]
    close: Option<NaiveTime>,
    /// IANA timezone of the business hours (e.g. Asia/Kolkata)
    #[arg(long)]
    timezone: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Resolve {
            input,
            output,
            raw,
            config,
        } => {
            let config = load_config(&config)?;
            let file = read_request(input.as_deref())?;
            let request = file.meeting_request()?;
            let availability = file.availability();

            let resolver = Resolver::new(config).context("Invalid engine configuration")?;
            let decision = resolver
                .resolve(&request, &availability)
                .context("Failed to resolve meeting request")?;
            debug!("decision: {decision:?}");

            let rendered = if raw {
                serde_json::to_string_pretty(&decision)?
            } else {
                let tz = resolver.config().tz()?;
                let response = format_response(&file.envelope, &request, &decision, &file.calendars, tz)
                    .with_overridden_events(file.overridden_events(&decision), tz);
                serde_json::to_string_pretty(&response)?
            };
            write_output(output.as_deref(), &rendered)?;
        }
        Commands::Free {
            input,
            date,
            config,
        } => {
            let config = load_config(&config)?;
            let file = read_request(input.as_deref())?;
            let request = file.meeting_request()?;
            let availability = file.availability();

            let aggregator =
                Aggregator::new(&config, &availability).context("Invalid engine configuration")?;
            let view = aggregator.day_view(date, &request.participant_ids);
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn parse_time(s: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(s, "%H:%M")
        .map_err(|e| format!("expected HH:MM, got '{}': {}", s, e))
}

/// Start from the config file (or defaults), then apply flag overrides.
fn load_config(args: &ConfigArgs) -> Result<EngineConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("Failed to parse config file: {}", path))?
        }
        None => EngineConfig::default(),
    };

    if let Some(open) = args.open {
        config.business_open = open;
    }
    if let Some(close) = args.close {
        config.business_close = close;
    }
    if let Some(tz) = &args.timezone {
        config.timezone = tz.clone();
    }

    config.validate().context("Invalid engine configuration")?;
    Ok(config)
}

fn read_request(path: Option<&str>) -> Result<RequestFile> {
    let raw = match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path))?,
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            buf
        }
    };
    serde_json::from_str(&raw).context("Failed to parse meeting request JSON")
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
