//! Item service entry point.

use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use item_service::config::{parse_duration, Config};
use item_service::{metrics, server};

/// In-memory item CRUD service.
#[derive(Parser, Debug)]
#[command(name = "item-service")]
#[command(about = "HTTP CRUD service over an in-memory item collection")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    serve: ServeArgs,
}

/// Overrides for the environment configuration.
#[derive(clap::Args, Debug, Clone, Default)]
struct ServeArgs {
    /// Listen address.
    #[arg(long)]
    host: Option<String>,

    /// Listen port.
    #[arg(short, long)]
    port: Option<u16>,

    /// How long to wait for existing connections to finish on shutdown - e.g. 15s or 1m.
    #[arg(long, value_parser = parse_duration)]
    graceful_timeout: Option<Duration>,

    /// Per-request timeout - e.g. 15s.
    #[arg(long, value_parser = parse_duration)]
    request_timeout: Option<Duration>,

    /// Start with an empty store instead of the two seed items.
    #[arg(long)]
    no_seed: bool,
}

impl ServeArgs {
    fn apply(&self, config: &mut Config) {
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(timeout) = self.graceful_timeout {
            config.graceful_timeout = timeout;
        }
        if let Some(timeout) = self.request_timeout {
            config.request_timeout = timeout;
        }
        if self.no_seed {
            config.seed_items = false;
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default).
    Serve(ServeArgs),

    /// Check configuration validity.
    CheckConfig(ServeArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    let (overrides, check_only) = match &args.command {
        Some(Command::Serve(serve)) => (serve.clone(), false),
        Some(Command::CheckConfig(serve)) => (serve.clone(), true),
        None => (args.serve.clone(), false),
    };

    // Load configuration
    let mut config = Config::load()?;
    overrides.apply(&mut config);

    // Initialize logging
    let filter = if args.verbose {
        EnvFilter::new("item_service=debug,tower_http=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.rust_log))
    };

    tracing_subscriber::registry()
        .with(args.json_logs.then(|| fmt::layer().json()))
        .with((!args.json_logs).then(fmt::layer))
        .with(filter)
        .init();

    if check_only {
        return cmd_check_config(&config);
    }

    cmd_serve(config).await
}

/// Check configuration validity.
fn cmd_check_config(config: &Config) -> anyhow::Result<()> {
    println!("======================================================================");
    println!("ITEM SERVICE - CONFIGURATION CHECK");
    println!("======================================================================");

    print!("Validating configuration... ");
    match config.validate() {
        Ok(()) => println!("OK"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration validation failed"));
        }
    }

    println!("----------------------------------------------------------------------");
    println!("Configuration Summary:");
    println!("  Listen Address: {}:{}", config.host, config.port);
    println!("  Graceful Timeout: {:?}", config.graceful_timeout);
    println!("  Request Timeout: {:?}", config.request_timeout);
    println!("  Seed Items: {}", config.seed_items);
    println!("======================================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("======================================================================");

    Ok(())
}

/// Serve until interrupted.
async fn cmd_serve(config: Config) -> anyhow::Result<()> {
    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        return Err(anyhow::anyhow!("Configuration validation failed: {}", e));
    }

    info!("Configuration loaded successfully");
    info!("Graceful timeout: {:?}", config.graceful_timeout);
    info!("Seed items: {}", config.seed_items);

    let handle = metrics::init_metrics()?;
    let state = server::initial_state(&config).with_metrics(handle);

    server::run(&config, state).await?;

    Ok(())
}
