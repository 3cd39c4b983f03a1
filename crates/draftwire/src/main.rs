// Waiver assistant entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file, stdout carries the JSON report)
// 2. Parse the command line
// 3. Load config
// 4. Build the requested report from the snapshot tree
// 5. Print it as pretty JSON

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use draftwire::config;
use draftwire::player::{Gameweek, Position};
use draftwire::recommend::{self, request::WaiverRequest};
use draftwire::snapshot::SnapshotStore;
use draftwire::valuation::targets::RiskLevel;

use anyhow::Context;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "draftwire")]
#[command(about = "Waiver recommendations for an FPL Draft league from cached snapshots")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, PartialEq, Subcommand)]
enum Commands {
    /// Ranked adds and paired drops for one entry
    Waivers {
        league_id: u32,
        /// Entry id, or entry name matched case-insensitively
        entry: String,
        /// Target gameweek (defaults to the next one)
        gw: Option<Gameweek>,
    },

    /// Waiver report from a JSON request file
    Request {
        path: PathBuf,
    },

    /// Unowned players within a minutes-risk tolerance
    Targets {
        league_id: u32,
        /// low, medium or high; anything else reads as medium
        #[arg(value_parser = parse_risk)]
        risk: Option<RiskLevel>,
        /// As-of gameweek (defaults to the last finished one)
        gw: Option<Gameweek>,
    },

    /// Fixture difficulty ranking by position
    Fixtures {
        /// Target gameweek (defaults to the next one)
        gw: Option<Gameweek>,
        /// GK, DEF, MID or FWD
        #[arg(value_parser = parse_position)]
        position: Option<Position>,
    },
}

fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing
    init_tracing()?;
    info!("draftwire starting up");

    // 2. Parse the command line
    let cli = Cli::parse();

    // 3. Load config
    let config = config::load_config().context("failed to load configuration")?;
    let store = SnapshotStore::new(&config.data.snapshot_root);
    info!("Config loaded: snapshots at {}", store.root().display());

    // 4-5. Build and print
    let json = match cli.command {
        Commands::Waivers { league_id, entry, gw } => {
            let request = waiver_request(league_id, &entry, gw);
            let report = recommend::build_report(&store, &config, &request)?;
            serde_json::to_string_pretty(&report)?
        }
        Commands::Request { path } => {
            let request = read_request(&path)?;
            let report = recommend::build_report(&store, &config, &request)?;
            serde_json::to_string_pretty(&report)?
        }
        Commands::Targets { league_id, risk, gw } => {
            let risk = risk.unwrap_or_default();
            let report = recommend::build_targets(&store, &config, league_id, risk, gw)?;
            serde_json::to_string_pretty(&report)?
        }
        Commands::Fixtures { gw, position } => {
            let report = recommend::build_fixture_report(&store, &config, gw, position, None)?;
            serde_json::to_string_pretty(&report)?
        }
    };
    println!("{json}");

    info!("draftwire finished");
    Ok(())
}

/// A numeric `entry` is an entry id; anything else is looked up by name.
fn waiver_request(league_id: u32, entry: &str, gw: Option<Gameweek>) -> WaiverRequest {
    let mut request = WaiverRequest {
        league_id: Some(league_id),
        gw,
        ..WaiverRequest::default()
    };
    match entry.trim().parse::<u32>() {
        Ok(id) => request.entry_id = Some(id),
        Err(_) => request.entry_name = Some(entry.to_string()),
    }
    request
}

fn read_request(path: &Path) -> anyhow::Result<WaiverRequest> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read request file {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse request file {}", path.display()))
}

fn parse_risk(value: &str) -> Result<RiskLevel, String> {
    Ok(RiskLevel::parse(value))
}

fn parse_position(label: &str) -> Result<Position, String> {
    Position::ALL
        .into_iter()
        .find(|p| p.label().eq_ignore_ascii_case(label))
        .ok_or_else(|| format!("unknown position {label:?}; expected GK, DEF, MID or FWD"))
}

/// Initialize tracing to log to a file (stdout is reserved for the report).
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("draftwire.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("draftwire=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
