//! ghstat CLI
//!
//! Gathers hiring pipeline statistics for the configured leads' requisitions
//! from Greenhouse and prints them as a table or JSON.

mod config;

use anyhow::{Context, Result};
use clap::Parser;
use ghstat_client::GreenhouseClient;
use ghstat_client::session::{FileSessionStore, MemorySessionStore, SessionStore};
use ghstat_engine::{EngineContext, Manager, OutputFormat};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, error, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;

const LONG_ABOUT: &str = "\
Gather hiring pipeline statistics from Greenhouse.

For every requisition of every configured lead, ghstat counts the candidates
waiting for application review, a decision, scheduling, written interview
screening and grading, and those without activity in the last week.

Configuration is read from --config, ./ghstat.toml or
<config dir>/ghstat/ghstat.toml, in that order:

    [greenhouse]
    base_url = \"https://canonical.greenhouse.io\"
    timeout_secs = 30
    concurrency = 5

    [[leads]]
    name = \"Joe Bloggs\"
    roles = [1234567, 7654321]

Session cookies are kept in <config dir>/ghstat/ghstat.json. When no session
is saved, the raw Cookie header in GHSTAT_SESSION is used.";

#[derive(Parser)]
#[command(name = "ghstat", version)]
#[command(about = "Gather hiring pipeline statistics from Greenhouse", long_about = LONG_ABOUT)]
struct Cli {
    /// Enable debug logging (disables the progress spinner)
    #[arg(short, long)]
    verbose: bool,

    /// Output format: pretty, markdown or json
    #[arg(short, long, default_value = "pretty")]
    format: String,

    /// Path to the configuration file
    #[arg(short, long, env = "GHSTAT_CONFIG")]
    config: Option<PathBuf>,

    /// Only gather roles for this lead (repeatable)
    #[arg(short, long = "lead", value_name = "LEAD")]
    lead: Vec<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Installs the stderr subscriber; `RUST_LOG` overrides the default filter
fn init_logging(verbose: bool) {
    let default = if verbose { "ghstat=debug" } else { "ghstat=info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Session store for this run
///
/// Without a usable config directory the session is kept in memory only.
fn session_store(location: ghstat_client::Result<FileSessionStore>) -> Arc<dyn SessionStore> {
    match location {
        Ok(store) => {
            debug!("using session file {}", store.path().display());
            Arc::new(store)
        }
        Err(e) => {
            warn!("{}, the session will not be saved", e);
            Arc::new(MemorySessionStore::new())
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let format: OutputFormat = cli.format.parse()?;

    let path = Config::locate(cli.config.as_deref())?;
    let config = Config::load(&path)?;
    debug!(
        "loaded configuration from {} ({} leads)",
        path.display(),
        config.leads.len()
    );

    let store = session_store(FileSessionStore::default_location());
    let client = GreenhouseClient::new(config.client_config(), store)
        .context("failed to create Greenhouse client")?;

    let manager = Manager::new(
        config.manager_config(cli.lead, format.to_string()),
        Arc::new(client),
        Box::new(std::io::stdout()),
        EngineContext::new(cli.verbose),
    )?;

    manager.execute().await
}
