//! Top-level CLI definition and dispatch.

use std::collections::BTreeMap;
use std::io;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{Shell as CompletionShell, generate};
use colored::{Colorize, control};
use serde_json::json;
use thiserror::Error;

use counter_series_engine::core::config::Config;
use counter_series_engine::core::errors::EngineError;
use counter_series_engine::logger::jsonl::{EventType, JsonlWriter, LogEntry, Severity};
use counter_series_engine::series::report::SeriesReport;
use counter_series_engine::series::trend::TrendDirection;
use counter_series_engine::store::CounterStore;
use counter_series_engine::store::key::series_key_of;
use counter_series_engine::store::memory::MemoryStore;
use counter_series_engine::store::sqlite::SqliteStore;

/// Counter Series Engine — dense daily series from sparse counter stores.
#[derive(Debug, Parser)]
#[command(
    name = "cse",
    author,
    version,
    about = "Counter Series Engine - Sparse Counter Reconstruction",
    long_about = None,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Override config file path.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Force JSON output mode.
    #[arg(long, global = true)]
    json: bool,
    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,
    /// Increase verbosity.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,
    /// Quiet mode (errors only).
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Rebuild the dense daily table for one series key.
    Reconstruct(SeriesArgs),
    /// Show the 5-day vs previous-5-day trend for one series key.
    Trend(SeriesArgs),
    /// Full report: totals, dense table, trend, travel note.
    Report(SeriesArgs),
    /// List series keys present for a metric.
    Series(ListArgs),
    /// Load a JSON snapshot into the SQLite counter store.
    Import(ImportArgs),
    /// Generate shell completions.
    Completions(CompletionsArgs),
}

/// Arguments shared by the per-series commands.
#[derive(Debug, Clone, Args)]
struct SeriesArgs {
    /// Series key (e.g. a country identifier).
    series: String,
    /// Read counters from a JSON snapshot file instead of the store.
    #[arg(long, value_name = "PATH", conflicts_with = "db")]
    snapshot: Option<PathBuf>,
    /// SQLite store path (defaults to the configured store).
    #[arg(long, value_name = "PATH")]
    db: Option<PathBuf>,
    /// Clock override: RFC 3339 or millisecond timestamp. Defaults to now.
    #[arg(long, value_name = "WHEN")]
    now: Option<String>,
}

#[derive(Debug, Clone, Args)]
struct ListArgs {
    /// Metric to list series keys for.
    #[arg(long, default_value = "cases")]
    metric: String,
    /// Read counters from a JSON snapshot file instead of the store.
    #[arg(long, value_name = "PATH", conflicts_with = "db")]
    snapshot: Option<PathBuf>,
    /// SQLite store path (defaults to the configured store).
    #[arg(long, value_name = "PATH")]
    db: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
struct ImportArgs {
    /// JSON snapshot file: one object mapping keys to values.
    file: PathBuf,
    /// SQLite store path (defaults to the configured store).
    #[arg(long, value_name = "PATH")]
    db: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
struct CompletionsArgs {
    /// Shell to generate completion script for.
    #[arg(value_enum)]
    shell: CompletionShell,
}

/// CLI failure taxonomy with a stable process exit code contract.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid invocation or arguments.
    #[error("{0}")]
    User(String),
    /// Engine or store failure.
    #[error(transparent)]
    Engine(#[from] EngineError),
    /// JSON serialization failed.
    #[error("failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),
    /// Output write failed.
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

impl CliError {
    /// Process exit code contract for the CLI.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::User(_) => 1,
            Self::Engine(_) | Self::Io(_) => 2,
            Self::Json(_) => 3,
        }
    }
}

/// Dispatch CLI commands.
pub fn run(cli: &Cli) -> Result<(), CliError> {
    if cli.no_color {
        control::set_override(false);
    }

    match &cli.command {
        Command::Reconstruct(args) => run_reconstruct(cli, args),
        Command::Trend(args) => run_trend(cli, args),
        Command::Report(args) => run_report(cli, args),
        Command::Series(args) => run_series(cli, args),
        Command::Import(args) => run_import(cli, args),
        Command::Completions(args) => {
            let mut command = Cli::command();
            let binary_name = command.get_name().to_string();
            generate(args.shell, &mut command, binary_name, &mut io::stdout());
            Ok(())
        }
    }
}

// ──────────────────── command bodies ────────────────────

fn run_reconstruct(cli: &Cli, args: &SeriesArgs) -> Result<(), CliError> {
    let config = load_config(cli)?;
    let report = build_report(cli, args, &config)?;

    if cli.json {
        let payload = json!({
            "command": "reconstruct",
            "series_key": report.series_key,
            "labels": report.reconstruction.table.labels,
            "case_values": report.reconstruction.table.case_values,
            "death_values": report.reconstruction.table.death_values,
            "trimmed": report.reconstruction.trimmed,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    if cli.quiet {
        return Ok(());
    }

    let table = &report.reconstruction.table;
    if table.is_empty() {
        println!("{}: no data", report.series_key);
        return Ok(());
    }

    println!(
        "{} — {} days{}",
        report.series_key.bold(),
        table.len(),
        if report.reconstruction.trimmed {
            " (trailing incomplete day dropped)"
        } else {
            ""
        }
    );
    println!("{:<12} {:>10} {:>10}", "day".dimmed(), "cases", "deaths");
    for i in 0..table.len() {
        println!(
            "{:<12} {:>10} {:>10}",
            table.labels[i],
            format_count(table.case_values[i]),
            format_count(table.death_values[i]),
        );
    }
    Ok(())
}

fn run_trend(cli: &Cli, args: &SeriesArgs) -> Result<(), CliError> {
    let config = load_config(cli)?;
    let report = build_report(cli, args, &config)?;

    if cli.json {
        let payload = json!({
            "command": "trend",
            "series_key": report.series_key,
            "trend": report.trend,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    if cli.quiet {
        return Ok(());
    }

    print_trend_line(&report);
    Ok(())
}

fn run_report(cli: &Cli, args: &SeriesArgs) -> Result<(), CliError> {
    let config = load_config(cli)?;
    let report = build_report(cli, args, &config)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if cli.quiet {
        return Ok(());
    }

    println!("{}", report.series_key.bold());
    println!(
        "  total cases:  {}",
        format_count(report.total_cases).as_str().bold()
    );
    println!(
        "  total deaths: {}",
        format_count(report.total_deaths).as_str().bold()
    );
    println!(
        "  observed days: {}{}",
        report.reconstruction.table.len(),
        if report.reconstruction.trimmed {
            " (trailing incomplete day dropped)"
        } else {
            ""
        }
    );
    print_trend_line(&report);
    if let Some(note) = &report.travel_note {
        println!("  travel restrictions: {note}");
    }
    for warning in &report.warnings {
        eprintln!("{} {warning}", "warning:".yellow());
    }
    Ok(())
}

fn run_series(cli: &Cli, args: &ListArgs) -> Result<(), CliError> {
    let config = load_config(cli)?;
    let store = open_store(cli, args.snapshot.as_deref(), args.db.as_deref(), &config)?;

    let mapping = store.get_all_by_pattern(&format!("{}_*", args.metric))?;
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for raw_key in mapping.keys() {
        if let Some(series) = series_key_of(raw_key, &args.metric) {
            *counts.entry(series).or_default() += 1;
        }
    }

    if cli.json {
        let payload = json!({
            "command": "series",
            "metric": args.metric,
            "series": counts,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    if cli.quiet {
        return Ok(());
    }

    if counts.is_empty() {
        println!("no {} series found", args.metric);
        return Ok(());
    }
    for (series, entries) in counts {
        println!("{series:<24} {entries:>6} keys");
    }
    Ok(())
}

fn run_import(cli: &Cli, args: &ImportArgs) -> Result<(), CliError> {
    let config = load_config(cli)?;
    let snapshot = MemoryStore::from_json_file(&args.file)?;
    let db_path = args
        .db
        .clone()
        .unwrap_or_else(|| config.paths.store_db.clone());

    let mut store = SqliteStore::open(&db_path)?;
    let written = store.import(snapshot.iter())?;

    let mut logger = JsonlWriter::open(&config.paths.jsonl_log);
    let mut entry = LogEntry::new(EventType::ImportComplete, Severity::Info);
    entry.entries = Some(written);
    entry.details = Some(format!("{} -> {}", args.file.display(), db_path.display()));
    logger.write_entry(&entry);

    if cli.json {
        let payload = json!({
            "command": "import",
            "file": args.file.display().to_string(),
            "db": db_path.display().to_string(),
            "entries": written,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    if !cli.quiet {
        println!(
            "imported {} entries into {}",
            written,
            db_path.display()
        );
    }
    Ok(())
}

// ──────────────────── shared helpers ────────────────────

fn load_config(cli: &Cli) -> Result<Config, CliError> {
    let config = Config::load(cli.config.as_deref())?;
    if cli.verbose {
        eprintln!(
            "config: {} (parse_policy={}, trend_stage={})",
            config.paths.config_file.display(),
            config.series.parse_policy,
            config.series.trend_stage,
        );
    }
    Ok(config)
}

fn open_store(
    cli: &Cli,
    snapshot: Option<&std::path::Path>,
    db: Option<&std::path::Path>,
    config: &Config,
) -> Result<Box<dyn CounterStore>, CliError> {
    if let Some(path) = snapshot {
        if cli.verbose {
            eprintln!("store: snapshot {}", path.display());
        }
        return Ok(Box::new(MemoryStore::from_json_file(path)?));
    }
    let db_path = db.map_or_else(|| config.paths.store_db.clone(), std::path::Path::to_path_buf);
    if cli.verbose {
        eprintln!("store: sqlite {}", db_path.display());
    }
    Ok(Box::new(SqliteStore::open(&db_path)?))
}

fn build_report(cli: &Cli, args: &SeriesArgs, config: &Config) -> Result<SeriesReport, CliError> {
    let store = open_store(cli, args.snapshot.as_deref(), args.db.as_deref(), config)?;
    let now_ms = resolve_now(args.now.as_deref())?;
    let report = SeriesReport::build(store.as_ref(), &args.series, config, now_ms);

    let mut logger = JsonlWriter::open(&config.paths.jsonl_log);
    match &report {
        Ok(report) => {
            let mut entry = LogEntry::new(EventType::ReconstructComplete, Severity::Info);
            entry.series_key = Some(report.series_key.clone());
            entry.points = Some(report.reconstruction.table.len());
            entry.trimmed = Some(report.reconstruction.trimmed);
            logger.write_entry(&entry);

            if let Some(trend) = report.trend {
                let mut entry = LogEntry::new(EventType::TrendComputed, Severity::Info);
                entry.series_key = Some(report.series_key.clone());
                entry.direction = Some(trend.direction.to_string());
                logger.write_entry(&entry);
            }

            for warning in &report.warnings {
                let mut entry = LogEntry::new(EventType::StoreReadFailed, Severity::Warning);
                entry.series_key = Some(report.series_key.clone());
                entry.details = Some(warning.clone());
                logger.write_entry(&entry);
            }
        }
        Err(err) => {
            let event = if matches!(err, EngineError::ValueParse { .. }) {
                EventType::ParseReject
            } else {
                EventType::Error
            };
            let mut entry = LogEntry::new(event, Severity::Critical);
            entry.series_key = Some(args.series.clone());
            entry.error_code = Some(err.code().to_string());
            entry.error_message = Some(err.to_string());
            logger.write_entry(&entry);
        }
    }

    Ok(report?)
}

fn resolve_now(raw: Option<&str>) -> Result<i64, CliError> {
    let Some(raw) = raw else {
        return Ok(Utc::now().timestamp_millis());
    };
    if let Ok(millis) = raw.parse::<i64>() {
        return Ok(millis);
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|moment| moment.timestamp_millis())
        .map_err(|err| CliError::User(format!("--now {raw:?}: {err}")))
}

fn print_trend_line(report: &SeriesReport) {
    let Some(trend) = &report.trend else {
        println!(
            "{}: not enough history for a trend comparison (needs 10 days)",
            report.series_key
        );
        return;
    };

    let change = match trend.direction {
        TrendDirection::Same => "the same number of cases".normal(),
        TrendDirection::More => {
            format!("{} more cases", format_count(trend.delta()))
                .as_str()
                .red()
        }
        TrendDirection::Fewer => {
            format!("{} fewer cases", format_count(trend.delta()))
                .as_str()
                .green()
        }
    };
    println!(
        "  during the last 5 days, {} reported {} than during the previous 5 days",
        report.series_key, change
    );
}

/// Render a count without a trailing `.0` for whole values.
#[allow(clippy::float_cmp)]
fn format_count(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        format!("{value}")
    }
}
