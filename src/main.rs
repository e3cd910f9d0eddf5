use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use menu_monitor::scenario::{play, play_live};
use menu_monitor::{util, JsonlEventLog, MonitorConfig, RecordingBus, Scenario};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "menu-monitor", version, about = "Capture and replay header menu state")]
struct Cli {
    /// Override the data directory (default: ~/.menu-monitor)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Read configuration from this file instead of the data directory
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Log to stderr instead of the log file
    #[arg(long, global = true)]
    log_stderr: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Play a scenario file and print published events as JSON lines
    Play {
        scenario: PathBuf,

        /// Hover duration in milliseconds, overriding config and scenario
        #[arg(long)]
        hover_ms: Option<u64>,

        /// Also write events to a JSONL event log
        #[arg(long)]
        events_out: Option<PathBuf>,

        /// Drive the scenario in real time through the monitor task
        #[arg(long)]
        live: bool,
    },
    /// Print the effective configuration
    Config,
}

/// Warnings everywhere; `--debug` raises only this crate
fn log_filter(debug: bool) -> Result<EnvFilter> {
    let filter = EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into());
    if debug {
        return Ok(filter.add_directive("menu_monitor=debug".parse()?));
    }
    Ok(filter)
}

fn init_logging(cli: &Cli) -> Result<()> {
    let filter = log_filter(cli.debug)?;

    if cli.log_stderr {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
        return Ok(());
    }

    // Log to file (~/.menu-monitor/logs/menu-monitor.log)
    fs::create_dir_all(util::logs_dir())?;
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(util::log_file_path())?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(log_file)
        .with_ansi(false)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    util::init_data_dir(cli.data_dir.clone());
    init_logging(&cli)?;

    let config = match &cli.config {
        Some(path) => MonitorConfig::load_from(path),
        None => MonitorConfig::load(),
    };

    match cli.command {
        Command::Config => {
            print!("{}", config.to_toml());
        }
        Command::Play {
            scenario,
            hover_ms,
            events_out,
            live,
        } => {
            let mut loaded = Scenario::load(&scenario)
                .with_context(|| format!("failed to load scenario {}", scenario.display()))?;
            if hover_ms.is_some() {
                loaded.hover_ms = hover_ms;
            }

            let event_log = events_out
                .as_deref()
                .map(JsonlEventLog::create)
                .transpose()
                .context("failed to create event log")?;
            let bus = (RecordingBus::new(), event_log);

            let monitor = if live {
                play_live(&loaded, config, bus).await?
            } else {
                play(&loaded, config, bus)?
            };
            tracing::info!(menu = monitor.menu_name(), "Scenario finished");

            let (_, (recorded, _)) = monitor.into_parts();
            let mut stdout = std::io::stdout().lock();
            for event in recorded.events() {
                writeln!(stdout, "{}", serde_json::to_string(event)?)?;
            }
        }
    }

    Ok(())
}
