//! Publication figure pipelines.
//!
//! Every subcommand reads a tabular input, computes its summary statistics,
//! and writes one or more figures as SVG + PNG through the shared chart
//! crate. Styles (fonts, palettes, line widths) come from an optional YAML
//! file instead of being baked into each figure.

mod days_count;
mod fnr_curve;
mod fnr_scatter;
mod meteo;
mod seasonal_grid;
mod trends;
mod util;
mod windrose_fig;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "plotter")]
#[command(about = "Publication figure pipelines")]
struct Cli {
    /// Log level
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Seasonal means ± SD per region as a panel grid
    SeasonalGrid(seasonal_grid::SeasonalGridArgs),
    /// Seasonal trend panels per land-cover class and gas
    Trends(trends::TrendsArgs),
    /// Ozone-exceedance probability vs FNR with a cubic fit
    FnrCurve(fnr_curve::FnrCurveArgs),
    /// HCHO vs NO2 scatter colored by ozone
    FnrScatter(fnr_scatter::FnrScatterArgs),
    /// Monthly meteorology climatology bars
    MeteoMonthly(meteo::MeteoMonthlyArgs),
    /// Seasonal meteorology bars
    MeteoSeasonal(meteo::MeteoSeasonalArgs),
    /// Valid-observation days per year and region
    DaysCount(days_count::DaysCountArgs),
    /// Wind rose and wind-speed distribution from a station workbook
    Windrose(windrose_fig::WindroseArgs),
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
        Command::SeasonalGrid(args) => seasonal_grid::run(&args),
        Command::Trends(args) => trends::run(&args),
        Command::FnrCurve(args) => fnr_curve::run(&args),
        Command::FnrScatter(args) => fnr_scatter::run(&args),
        Command::MeteoMonthly(args) => meteo::run_monthly(&args),
        Command::MeteoSeasonal(args) => meteo::run_seasonal(&args),
        Command::DaysCount(args) => days_count::run(&args),
        Command::Windrose(args) => windrose_fig::run(&args),
    }
}
