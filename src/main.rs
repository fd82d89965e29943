//! Health report service entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use healthz_report::api::{create_router, AppState, ServiceInfo, HEALTH_PATH};
use healthz_report::config::Config;
use healthz_report::health::{
    CheckRunner, ComponentRegistry, HealthChecks, HealthResponseWriter, HealthStatus,
};
use healthz_report::metrics;
use healthz_report::utils::shutdown_signal;

/// Serve machine-readable health status on /healthz.
#[derive(Parser, Debug)]
#[command(name = "healthz-report")]
#[command(about = "Aggregates health checks and serves them on /healthz")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,

    /// HTTP server port (overrides PORT).
    #[arg(short, long)]
    port: Option<u16>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default).
    Serve {
        /// HTTP server port (overrides PORT).
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Check configuration validity.
    CheckConfig,

    /// Run the checks once and print the report to stdout.
    Report,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Initialize logging
    let filter = if args.verbose {
        EnvFilter::new("healthz_report=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    match args.command {
        Some(Command::CheckConfig) => cmd_check_config(),
        Some(Command::Report) => cmd_report().await,
        Some(Command::Serve { port }) => cmd_serve(port.or(args.port)).await,
        None => cmd_serve(args.port).await,
    }
}

/// Load and validate configuration.
fn load_config() -> anyhow::Result<Config> {
    let config = Config::load().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        return Err(anyhow::anyhow!("Configuration validation failed: {}", e));
    }

    Ok(config)
}

/// Check configuration validity.
fn cmd_check_config() -> anyhow::Result<()> {
    println!("======================================================================");
    println!("HEALTHZ REPORT - CONFIGURATION CHECK");
    println!("======================================================================");

    let config = load_config()?;

    println!("  Port: {}", config.port);
    println!("  Health Checks: {}", if config.health_checks_enabled { "Enabled" } else { "Disabled" });
    println!("  Check Timeout: {}ms", config.health_check_timeout_ms);
    println!("  API Token: {}", if config.api_token.is_some() { "set" } else { "not set" });
    println!("  Metrics: {}", if config.metrics_enabled { "Enabled" } else { "Disabled" });
    println!("======================================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("======================================================================");

    Ok(())
}

/// Run every check once and print the health document.
async fn cmd_report() -> anyhow::Result<()> {
    let config = load_config()?;
    register_components();

    let checks = HealthChecks::from_config(&config)?;
    let report = checks.evaluate().await;
    let body = HealthResponseWriter::default().render(report.as_ref())?;

    println!("{}", String::from_utf8_lossy(&body));

    if matches!(report, Some(ref r) if r.status == HealthStatus::Unhealthy) {
        std::process::exit(1);
    }
    Ok(())
}

/// Run the HTTP server until a shutdown signal arrives.
async fn cmd_serve(port_override: Option<u16>) -> anyhow::Result<()> {
    info!("Loading configuration...");
    let mut config = load_config()?;
    if let Some(port) = port_override {
        config.port = port;
    }

    register_components();

    let checks = HealthChecks::from_config(&config)?;
    info!(
        checks = ?checks.names(),
        enabled = checks.is_enabled(),
        timeout_ms = config.health_check_timeout_ms,
        "Health checks registered"
    );

    let service = ServiceInfo::for_package(
        checks.is_enabled(),
        checks.names().into_iter().map(String::from).collect(),
    );
    let mut state = AppState::new(Arc::new(checks), service);

    if let Some(token) = config.api_token.as_deref() {
        state = state.with_api_token(token);
    }

    if config.metrics_enabled {
        match metrics::install_prometheus() {
            Ok(handle) => {
                ComponentRegistry::global().register("metrics-exporter-prometheus");
                state = state.with_metrics(handle);
            }
            Err(e) => warn!("Metrics exporter unavailable: {}", e),
        }
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await?;
    info!("HTTP server listening on {} (health at {})", addr, HEALTH_PATH);

    let router = create_router(state);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutdown complete");
    Ok(())
}

/// Record the binary in the component registry before the first report.
fn register_components() {
    ComponentRegistry::global().register(format!(
        "{}, Version={}",
        env!("CARGO_BIN_NAME"),
        env!("CARGO_PKG_VERSION")
    ));
}
