/// Version injected at compile time via GCP_TREE_VERSION env var (set by CI/CD),
/// or "dev" for local builds.
pub const VERSION: &str = match option_env!("GCP_TREE_VERSION") {
    Some(v) => v,
    None => "dev",
};

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use gcp_tree::config::Config;
use gcp_tree::gcp::auth;
use gcp_tree::gcp::client::{format_gcp_error, GcpClient};
use gcp_tree::render::{self, OutputFormat, ReportContext};
use gcp_tree::tree::{ConsoleLinks, TreeBuilder};
use gcp_tree::{collect_all, GcpProvider, InventoryError};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Inventory GCP resources per VPC network
#[derive(Parser, Debug)]
#[command(name = "gcp-tree", version = VERSION, about, long_about = None)]
struct Args {
    /// gcloud configuration to read defaults from
    #[arg(long)]
    profile: Option<String>,

    /// GCP project to inventory
    #[arg(short, long)]
    project: Option<String>,

    /// GCP region to use for regional APIs
    #[arg(short, long)]
    region: Option<String>,

    /// Config file (JSON or YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "interactive")]
    format: OutputFormat,

    /// Output file [default: <profile>-inventory.<ext>]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off")]
    log_level: LogLevel,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(level: LogLevel) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let tracing_level = level.to_tracing_level()?;

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Warning: cannot open log file {}: {}", log_path.display(), e);
            return None;
        }
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("gcp-tree {} started with log level: {:?}", VERSION, level);
    tracing::info!("Log file: {:?}", log_path);

    Some(guard)
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("gcp-tree").join("gcp-tree.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".gcp-tree").join("gcp-tree.log");
    }
    PathBuf::from("gcp-tree.log")
}

fn default_output_path(profile: Option<&str>, format: OutputFormat) -> PathBuf {
    PathBuf::from(format!(
        "{}-inventory.{}",
        profile.unwrap_or("gcp"),
        format.extension()
    ))
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level);

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{:#}", err);
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<()> {
    // Step 1: Load configuration
    let config = Config::load(args.config.as_deref())?;

    let profile = args.profile.as_deref();
    if let Some(name) = profile {
        if !auth::validate_profile_name(name) {
            bail!("Invalid profile name: {}", name);
        }
    }

    let project = config.effective_project(args.project.as_deref(), profile)?;
    let region = config.effective_region(args.region.as_deref(), profile);

    tracing::info!("Using project: {}, region: {}", project, region);

    // Step 2: Authenticate once before any collector runs
    let client = GcpClient::new(&project, &region)
        .await
        .map_err(|e| InventoryError::Authentication(format!("{:#}", e)))?;
    client
        .get_token()
        .await
        .map_err(|e| InventoryError::Authentication(format_gcp_error(&e)))?;

    // Step 3: Collect
    let provider = GcpProvider::new(client);
    let collection = collect_all(&provider, &config.kinds(), config.timeout()).await;

    for failure in &collection.failures {
        eprintln!("Warning: {}", failure);
    }

    // Step 4: Build and prune
    let mut builder = TreeBuilder::new(config.risk_policy());
    if config.console_links {
        builder = builder.with_links(ConsoleLinks::new(project.as_str()));
    }
    let tree = builder
        .build(&collection.records, &collection.networks)
        .pruned();

    // Step 5: Render and write
    let output = render::render(&tree, args.format, ReportContext::new(Some(project)))
        .map_err(InventoryError::from)?;

    let path = args
        .output
        .unwrap_or_else(|| default_output_path(profile, args.format));
    std::fs::write(&path, output)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    let at_risk = tree.root().risk_count();
    tracing::info!(
        "Wrote {} resources ({} at risk) to {}",
        collection.records.len(),
        at_risk,
        path.display()
    );
    println!(
        "Wrote {} resources ({} at risk{}) to {}",
        collection.records.len(),
        at_risk,
        if collection.is_partial() { ", partial" } else { "" },
        path.display()
    );

    Ok(())
}
