//! Physical derivation pipelines.
//!
//! Two batch jobs share the same shape: walk the monthly satellite files,
//! pair each daily slice with its reanalysis companions (days without a
//! companion are skipped), derive a new field on the satellite grid, and
//! write one stacked NetCDF file per month.

mod pbl;
mod tropo;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "deriver")]
#[command(about = "Derive tropospheric ozone and boundary-layer mixing ratios")]
struct Cli {
    /// Log level
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scale satellite total ozone columns to tropospheric columns
    TropOzone(tropo::TropOzoneArgs),
    /// Convert satellite columns to boundary-layer-mean mixing ratios
    PblRatio(pbl::PblRatioArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Command::TropOzone(args) => tropo::run(&args),
        Command::PblRatio(args) => pbl::run(&args),
    }
}
