//! Surfer CLI
//!
//! Identifies the cable modem on the local network and either prints one
//! signal snapshot or serves Prometheus metrics that poll it on demand.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use surfer::{
    config::FileConfig,
    metrics::{MetricsRegistry, MetricsServer, MetricsServerConfig, SignalPoller},
    CancellationToken, Registry,
};
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

/// Cable modem signal scraper.
#[derive(Parser, Debug)]
#[command(name = "surfer", version, about = "Cable modem signal scraper")]
struct Cli {
    /// TOML configuration file.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Modem management address, e.g. https://192.168.100.1.
    #[arg(long)]
    base_url: Option<String>,

    /// Modem admin password.
    #[arg(long, env = "SURFER_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Replay a captured page instead of contacting the modem.
    #[arg(long, value_name = "FILE")]
    fixture: Option<PathBuf>,

    /// Port to listen on when serving metrics.
    #[arg(long)]
    port: Option<u16>,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Poll the modem once and print the signal as JSON.
    Status,
    /// Serve Prometheus metrics, polling the modem on every scrape.
    Serve,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("surfer: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => FileConfig::from_file(path)?,
        None => FileConfig::default(),
    };
    if let Some(base_url) = cli.base_url {
        config.modem.base_url = base_url;
    }
    if let Some(password) = cli.password {
        config.modem.password = password;
    }
    if let Some(fixture) = cli.fixture {
        config.modem.fixture = Some(fixture);
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    config.validate()?;

    info!("Surfer v{}", surfer::VERSION);

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received interrupt, shutting down");
            ctrl_c.cancel();
        }
    });

    let registry = Registry::with_builtin_models();
    let modem = registry
        .identify(&config.modem.to_modem_config(), &cancel)
        .await?;
    info!(model = modem.name(), "Modem identified");

    match cli.command {
        Command::Status => {
            let signal = modem.status(&cancel).await?;
            println!("{}", serde_json::to_string_pretty(&signal)?);
        }
        Command::Serve => {
            let server = MetricsServer::new(
                MetricsServerConfig::with_port(config.server.port),
                SignalPoller::new(Arc::from(modem), cancel.clone()),
                MetricsRegistry::new()?,
            );
            server.run(cancel).await?;
        }
    }

    Ok(())
}
