//! Conversion and aggregation pipelines.
//!
//! Each subcommand is one run-once batch job of the workflow:
//! - `grid-to-csv`: flatten gridded files to tabular CSV
//! - `csv-to-grid`: grid monthly means from tabular CSV
//! - `month-stack`: average per-month files across years
//! - `site-series`: per-region daily means joined into one wide CSV

mod csv2grid;
mod grid2csv;
mod month_stack;
mod sites;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "converter")]
#[command(about = "Tabular/gridded conversion and aggregation pipelines")]
struct Cli {
    /// Log level
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Flatten every NetCDF file under a directory to CSV
    GridToCsv(grid2csv::GridToCsvArgs),
    /// Grid the monthly mean of each tabular CSV file
    CsvToGrid(csv2grid::CsvToGridArgs),
    /// Average per-month mean files across years
    MonthStack(month_stack::MonthStackArgs),
    /// Extract per-region daily mean series into one wide CSV
    SiteSeries(sites::SiteSeriesArgs),
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
        Command::GridToCsv(args) => grid2csv::run(&args),
        Command::CsvToGrid(args) => csv2grid::run(&args),
        Command::MonthStack(args) => month_stack::run(&args),
        Command::SiteSeries(args) => sites::run(&args),
    }
}
