use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::{Report, Result};
use hostprobe::config::{Config, load_config, load_config_from_path};
use hostprobe::logging::{self, LogFormat};
use hostprobe::publish::{Endpoint, HostPublisher};

#[derive(Parser)]
#[command(
    name = "hostprobe",
    about = "Sample CPU, memory and process counters as JSON snapshots"
)]
struct Cli {
    /// Path to config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Polling interval in milliseconds
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Log format: text, json
    #[arg(long)]
    log_format: Option<String>,

    /// Log level: trace, debug, info, warn, error
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Clone, Copy)]
enum Command {
    /// CPU utilization since the previous sample
    Cpu,
    /// Memory totals and usage
    Ram,
    /// Process counts by scheduling state
    Procesos,
    /// One combined payload with all three snapshots
    All,
    /// Emit one combined payload per interval until interrupted
    Watch,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let (config, config_error) = load_config_for_cli(&cli);

    let format: LogFormat = config.general.log_format.parse()?;
    let level = logging::parse_level(&config.general.log_level)?;
    logging::init_tracing(format, level)?;

    if let Some(err) = config_error {
        tracing::warn!(%err, "using default configuration");
    }
    config.validate()?;
    let interval = Duration::from_millis(config.general.poll_interval_ms);

    let publisher = HostPublisher::from_config(&config);
    let result = run(&publisher, cli.command, interval).await;
    publisher.teardown();
    result
}

async fn run(publisher: &HostPublisher, command: Command, interval: Duration) -> Result<()> {
    match command {
        Command::Cpu => {
            // A lone sample has no baseline; prime it and wait one interval.
            publisher.cpu();
            tokio::time::sleep(interval).await;
            emit(&publisher.render(Endpoint::Cpu)?)
        }
        Command::Ram => emit(&publisher.render(Endpoint::Memory)?),
        Command::Procesos => emit(&publisher.render(Endpoint::Processes)?),
        Command::All => {
            publisher.cpu();
            tokio::time::sleep(interval).await;
            emit(&publisher.render_payload()?)
        }
        Command::Watch => watch(publisher, interval).await,
    }
}

async fn watch(publisher: &HostPublisher, interval: Duration) -> Result<()> {
    tracing::info!(interval_ms = interval.as_millis() as u64, "watching host counters");
    let mut ticker = tokio::time::interval(interval);
    // The first tick fires immediately and only establishes the cpu baseline.
    ticker.tick().await;
    publisher.cpu();

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match publisher.render_payload() {
                    Ok(line) => emit(&line)?,
                    Err(err) => tracing::error!(%err, "failed to render payload"),
                }
            }
            signal = tokio::signal::ctrl_c() => {
                signal?;
                tracing::info!("interrupted, stopping");
                return Ok(());
            }
        }
    }
}

fn emit(line: &str) -> Result<()> {
    let mut out = std::io::stdout().lock();
    writeln!(out, "{line}")?;
    out.flush()?;
    Ok(())
}

/// The load error, if any, is handed back so it can be logged after the
/// subscriber is installed.
fn load_config_for_cli(cli: &Cli) -> (Config, Option<Report>) {
    let loaded = match &cli.config {
        Some(path) => load_config_from_path(path),
        None => load_config(),
    };
    let (mut config, config_error) = match loaded {
        Ok(config) => (config, None),
        Err(err) => (Config::default(), Some(err)),
    };

    if let Some(ms) = cli.interval_ms {
        config.general.poll_interval_ms = ms;
    }
    if let Some(ref format) = cli.log_format {
        config.general.log_format = format.clone();
    }
    if let Some(ref level) = cli.log_level {
        config.general.log_level = level.clone();
    }

    (config, config_error)
}
