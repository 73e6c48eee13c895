//! `mfjson` CLI: canonicalize and validate JSON, convert timestamps.
//!
//! ## Usage
//!
//! ```sh
//! # Re-emit JSON in canonical compact form (stdin → stdout)
//! echo '{ "a" : [1, 2.50] }' | mfjson canon
//!
//! # File to file, with a tighter nesting limit
//! mfjson canon -i data.json -o data.min.json --max-depth 32
//!
//! # Validate; prints `ok` or the error position
//! mfjson check -i data.json
//!
//! # Timestamps
//! mfjson date to-iso 1429703799456
//! mfjson date from-iso 2015-04-22T11:56:39.456Z
//! mfjson date from-ajax '/Date(1429703799456)/'
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mfjson_core::{Limits, Value};
use std::io::{self, Read};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mfjson", version, about = "Deterministic JSON codec CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log debug events to stderr (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse JSON and write it back in canonical compact form
    Canon {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Maximum nesting depth
        #[arg(long, default_value_t = mfjson_core::limits::DEFAULT_MAX_DEPTH)]
        max_depth: usize,
    },
    /// Validate JSON without producing output
    Check {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Maximum nesting depth
        #[arg(long, default_value_t = mfjson_core::limits::DEFAULT_MAX_DEPTH)]
        max_depth: usize,
    },
    /// Convert between epoch milliseconds and wire date formats
    Date {
        #[command(subcommand)]
        command: DateCommands,
    },
}

#[derive(Subcommand)]
enum DateCommands {
    /// Epoch milliseconds to ISO-8601
    ToIso {
        #[arg(allow_hyphen_values = true)]
        epoch_ms: i64,
    },
    /// ISO-8601 to epoch milliseconds
    FromIso { text: String },
    /// `/Date(ms)/` to ISO-8601
    FromAjax { text: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Canon {
            input,
            output,
            max_depth,
        } => {
            let json = read_input(input.as_deref())?;
            let value = parse(&json, max_depth)?;
            let canonical = mfjson_core::Writer::new(&mfjson_core::Registry::new())
                .with_limits(Limits::default().with_max_depth(max_depth))
                .serialize(&value)
                .context("Failed to write canonical JSON")?;
            write_output(output.as_deref(), &canonical)?;
        }
        Commands::Check { input, max_depth } => {
            let json = read_input(input.as_deref())?;
            let value = parse(&json, max_depth)?;
            debug!(kind = value.type_name(), len = value.len(), "document is valid");
            println!("ok");
        }
        Commands::Date { command } => println!("{}", run_date(command)?),
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn parse(json: &str, max_depth: usize) -> Result<Value> {
    mfjson_core::parse_with_limits(json, Limits::default().with_max_depth(max_depth))
        .context("Invalid JSON")
}

fn run_date(command: DateCommands) -> Result<String> {
    let text = match command {
        DateCommands::ToIso { epoch_ms } => {
            let t = chrono::DateTime::from_timestamp_millis(epoch_ms)
                .with_context(|| format!("Timestamp out of range: {}", epoch_ms))?;
            mfjson_core::to_iso8601(&t).context("Failed to format ISO-8601 timestamp")?
        }
        DateCommands::FromIso { text } => mfjson_core::from_iso8601(&text)
            .context("Failed to parse ISO-8601 timestamp")?
            .timestamp_millis()
            .to_string(),
        DateCommands::FromAjax { text } => {
            let t = mfjson_core::from_ajax(&text).context("Failed to parse Ajax timestamp")?;
            mfjson_core::to_iso8601(&t).context("Failed to format ISO-8601 timestamp")?
        }
    };
    Ok(text)
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
