// LogcatView - main.rs
//
// Command-line entry point. Handles:
// 1. CLI argument parsing
// 2. Config loading and logging initialisation (debug mode support)
// 3. Loading a file, folder or bug report into per-channel panels
// 4. Printing the visible records as text or JSON lines

pub use logcatview::app;
pub use logcatview::core;
pub use logcatview::platform;
pub use logcatview::util;

use crate::app::loader::{LoadConfig, LogLoader};
use crate::app::panel::LogPanel;
use crate::core::model::{Channel, LogRecord, RecordBatch, Severity};
use crate::platform::config::AppConfig;
use clap::Parser;
use serde::Serialize;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::sync::mpsc;

/// LogcatView - offline Android logcat viewer.
///
/// Reads a logcat capture in any of the brief, time, threadtime, long or
/// DDMS-save formats, a folder of main/events/radio captures, or a bug
/// report, and prints the records that pass the filters.
#[derive(Parser, Debug)]
#[command(name = "logcatview", version, about)]
struct Cli {
    /// Log file, folder of log files, or bug report.
    path: PathBuf,

    /// Treat PATH as a bug report and split it into its log sections.
    #[arg(short = 'b', long = "bugreport")]
    bugreport: bool,

    /// Live filter query, e.g. "tag:net pid:1234 timeout".
    #[arg(short = 'q', long = "query", default_value = "")]
    query: String,

    /// Minimum severity (verbose, debug, info, warn, error, assert, or a letter).
    #[arg(short = 'l', long = "level", value_parser = parse_level)]
    level: Option<Severity>,

    /// Only print this channel.
    #[arg(long = "channel", value_parser = parse_channel)]
    channel: Option<Channel>,

    /// Start output at the record nearest this time (MM-DD HH:MM:SS.fff).
    #[arg(long = "from")]
    from: Option<String>,

    /// Print one JSON object per record.
    #[arg(long = "json")]
    json: bool,

    /// Directory containing config.toml (defaults to the platform config dir).
    #[arg(short = 'c', long = "config-dir")]
    config_dir: Option<PathBuf>,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

fn parse_level(s: &str) -> Result<Severity, String> {
    Severity::from_name(s).ok_or_else(|| format!("unknown level '{s}'"))
}

fn parse_channel(s: &str) -> Result<Channel, String> {
    Channel::all()
        .iter()
        .copied()
        .find(|c| c.label().eq_ignore_ascii_case(s))
        .ok_or_else(|| format!("unknown channel '{s}' (expected main, events or radio)"))
}

/// One record in `--json` output.
#[derive(Serialize)]
struct JsonLine<'a> {
    channel: Channel,
    file: &'a str,
    #[serde(flatten)]
    record: &'a LogRecord,
}

fn main() {
    let cli = Cli::parse();

    let config_dir = cli
        .config_dir
        .clone()
        .unwrap_or_else(|| platform::config::PlatformPaths::resolve().config_dir);
    let (config, config_warnings) = platform::config::load_config(&config_dir);

    util::logging::init(
        cli.debug,
        config.log_level.as_deref(),
        config.log_file.as_deref(),
    );

    tracing::info!(
        version = util::constants::APP_VERSION,
        debug = cli.debug,
        "LogcatView starting"
    );
    for warning in &config_warnings {
        tracing::warn!(warning = %warning, "Config warning");
        eprintln!("Warning: {warning}");
    }

    let panels = match load_panels(&cli, &config) {
        Ok(panels) => panels,
        Err(e) => {
            tracing::error!(path = %cli.path.display(), error = %e, "Nothing to show");
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = print_panels(&cli, &panels) {
        if e.kind() != io::ErrorKind::BrokenPipe {
            tracing::error!(error = %e, "Failed to write output");
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

/// Build one panel per channel from the config and CLI filters, then load
/// the input into them.
fn load_panels(cli: &Cli, config: &AppConfig) -> util::error::Result<Vec<LogPanel>> {
    let mut panels: Vec<LogPanel> = Channel::all()
        .iter()
        .map(|&channel| {
            let mut panel = LogPanel::with_filters(channel, &config.filters);
            panel.set_min_level(cli.level.unwrap_or(config.default_level));
            panel.set_live_query(&cli.query);
            panel
        })
        .collect();

    let (tx, rx) = mpsc::channel::<RecordBatch>();
    let loader = LogLoader::new(vec![Box::new(tx)], LoadConfig::from(config));
    let loaded = loader.load_path(&cli.path, cli.bugreport);
    // Dropping the loader closes the sending side.
    drop(loader);
    loaded?;

    for batch in rx {
        if let Some(panel) = panels.iter_mut().find(|p| p.channel() == batch.channel) {
            panel.receive_batch(batch);
        }
    }
    Ok(panels)
}

fn print_panels(cli: &Cli, panels: &[LogPanel]) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    for panel in panels {
        if cli.channel.is_some_and(|c| c != panel.channel()) {
            continue;
        }
        let Some(file) = panel.file() else {
            continue;
        };

        let visible = panel.visible_records();
        let start = match cli.from {
            Some(ref time) => panel.sync_to(time).unwrap_or(0),
            None => 0,
        };
        tracing::debug!(
            channel = %panel.channel(),
            visible = visible.len(),
            start,
            "Printing channel"
        );

        if !cli.json {
            writeln!(out, "--------- {} ({})", panel.channel(), file.path.display())?;
        }
        for record in &visible[start..] {
            if cli.json {
                let line = JsonLine {
                    channel: panel.channel(),
                    file: &file.name,
                    record,
                };
                serde_json::to_writer(&mut out, &line)?;
                writeln!(out)?;
            } else {
                writeln!(out, "{record}")?;
            }
        }
    }

    out.flush()
}
