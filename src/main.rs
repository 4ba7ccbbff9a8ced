use analytics::AnalyticsEngine;
use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use configuration::{init_tracing, load_config, Config, RiskSortOrder};
use dataset::{DataLoader, Dataset};
use indicatif::{ProgressBar, ProgressStyle};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use web_server::AppState;

mod render;

/// The main entry point for the BearCart analytics tool.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // BEARCART__* overrides may live in a .env file; it is optional.
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref()).context("Failed to load configuration")?;
    let _log_guard = init_tracing(&config.logging).context("Failed to initialise logging")?;

    // Execute the appropriate command
    match cli.command {
        Commands::Report(args) => handle_report(args, &config),
        Commands::Inspect(args) => handle_inspect(args, &config),
        Commands::Serve(args) => handle_serve(args, &config).await,
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// KPIs, refund trends and product risk for the BearCart transaction export.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (defaults to ./bearcart.toml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute every KPI and breakdown and print them.
    Report(ReportArgs),
    /// Print the shape of the dataset without computing KPIs.
    Inspect(InspectArgs),
    /// Serve the analytics as a read-only JSON API.
    Serve(ServeArgs),
}

#[derive(Parser)]
struct DataArgs {
    /// Dataset file (.csv or .parquet). Overrides `data.path`.
    #[arg(long)]
    data: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Parser)]
struct ReportArgs {
    #[command(flatten)]
    data: DataArgs,

    #[arg(long, value_enum, default_value = "table")]
    format: OutputFormat,

    /// Row order of the risk summary. Overrides `risk.sort_order`.
    #[arg(long, value_enum)]
    risk_order: Option<RiskSortOrder>,
}

#[derive(Parser)]
struct InspectArgs {
    #[command(flatten)]
    data: DataArgs,

    #[arg(long, value_enum, default_value = "table")]
    format: OutputFormat,
}

#[derive(Parser)]
struct ServeArgs {
    #[command(flatten)]
    data: DataArgs,

    /// Listen address, e.g. 0.0.0.0:8080. Overrides `server.host`/`server.port`.
    #[arg(long)]
    addr: Option<SocketAddr>,
}

// ==============================================================================
// Command Logic
// ==============================================================================

/// Loads the dataset once for the lifetime of the command.
fn load_dataset(data: &DataArgs, config: &Config) -> anyhow::Result<Dataset> {
    let path: &Path = data.data.as_deref().unwrap_or(&config.data.path);

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    spinner.set_message(format!("Loading {}...", path.display()));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = DataLoader::new().load(path);
    spinner.finish_and_clear();

    result.with_context(|| format!("Failed to load dataset from {}", path.display()))
}

fn handle_report(args: ReportArgs, config: &Config) -> anyhow::Result<()> {
    let dataset = load_dataset(&args.data, config)?;

    let mut engine = AnalyticsEngine::from_config(config);
    if let Some(order) = args.risk_order {
        engine = engine.with_risk_sort_order(order);
    }

    let report = engine
        .build_dashboard(&dataset)
        .context("Failed to compute the dashboard")?;

    match args.format {
        OutputFormat::Table => print!("{}", render::render_dashboard(&report)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(())
}

fn handle_inspect(args: InspectArgs, config: &Config) -> anyhow::Result<()> {
    let summary = load_dataset(&args.data, config)?.summary();

    match args.format {
        OutputFormat::Table => print!("{}", render::render_summary(&summary)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
    }
    Ok(())
}

async fn handle_serve(args: ServeArgs, config: &Config) -> anyhow::Result<()> {
    let addr = match args.addr {
        Some(addr) => addr,
        None => config
            .server
            .address()
            .parse()
            .with_context(|| format!("Invalid server address '{}'", config.server.address()))?,
    };

    let dataset = Arc::new(load_dataset(&args.data, config)?);
    let state = AppState::new(dataset, AnalyticsEngine::from_config(config));

    web_server::run_server(addr, state).await
}
