//! Bulk reanalysis-archive downloader.
//!
//! Reads a plain-text URL list (one subset URL per line) and fetches every
//! file with:
//! - HTTP Basic authentication from an injected credential provider
//! - a fixed-size parallel worker pool, one session per worker
//! - a fixed retry count with a fixed delay between attempts
//! - four outcome classes: already-present, completed, auth-failed, failed

mod credentials;
mod fetch;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use credentials::{CredentialProvider, Credentials, EnvCredentials, StaticCredentials};
use fetch::{run_batch, FetchConfig, HttpFetch};

#[derive(Parser, Debug)]
#[command(name = "downloader")]
#[command(about = "Bulk archive downloader with bounded parallelism")]
struct Args {
    /// Plain-text file with one URL per line
    #[arg(long)]
    url_list: PathBuf,

    /// Directory for completed downloads
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Number of simultaneous downloads
    #[arg(long, default_value = "10")]
    max_concurrent: usize,

    /// Attempts per file before giving up
    #[arg(long, default_value = "3")]
    max_retries: u32,

    /// Seconds to wait between attempts
    #[arg(long, default_value = "5")]
    retry_delay_secs: u64,

    /// Archive username (overrides EARTHDATA_USERNAME)
    #[arg(long)]
    username: Option<String>,

    /// Archive password (overrides EARTHDATA_PASSWORD)
    #[arg(long)]
    password: Option<String>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn resolve_credentials(args: &Args) -> Result<Credentials> {
    match (&args.username, &args.password) {
        (Some(username), Some(password)) => StaticCredentials(Credentials {
            username: username.clone(),
            password: password.clone(),
        })
        .credentials()
        .map_err(Into::into),
        _ => EnvCredentials::default().credentials().map_err(Into::into),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting archive downloader");

    let credentials =
        resolve_credentials(&args).context("Archive credentials are not configured")?;

    let list = std::fs::read_to_string(&args.url_list)
        .with_context(|| format!("Failed to read URL list {}", args.url_list.display()))?;
    let urls: Vec<String> = list
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect();

    if urls.is_empty() {
        info!("URL list is empty, nothing to do");
        return Ok(());
    }

    tokio::fs::create_dir_all(&args.output_dir).await?;

    let config = FetchConfig {
        max_retries: args.max_retries.max(1),
        retry_delay: Duration::from_secs(args.retry_delay_secs),
        request_timeout: Duration::from_secs(600),
        output_dir: args.output_dir.clone(),
    };

    info!(
        count = urls.len(),
        workers = args.max_concurrent,
        output = %args.output_dir.display(),
        "Starting download batch"
    );

    let request_timeout = config.request_timeout;
    let summary = run_batch(
        &urls,
        &config,
        || HttpFetch::new(credentials.clone(), request_timeout),
        args.max_concurrent,
    )
    .await;

    info!(
        already_present = summary.already_present,
        completed = summary.completed,
        auth_failed = summary.auth_failed,
        failed = summary.failed,
        "Download batch complete"
    );

    Ok(())
}
