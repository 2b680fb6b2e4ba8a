//! Monthly satellite-extraction batch jobs on an openEO backend.
//!
//! For each requested month, submits a load_collection → save_result
//! (NetCDF) job for one band over the study area, waits for it, and
//! downloads the produced file. A failed month is logged and skipped; the
//! remaining months continue.

mod client;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use atmos_common::BoundingBox;
use client::OpeneoClient;

#[derive(Parser, Debug)]
#[command(name = "openeo-export")]
#[command(about = "Submit monthly satellite-extraction jobs to an openEO backend")]
struct Args {
    /// openEO backend URL
    #[arg(long, default_value = "https://openeo.dataspace.copernicus.eu/openeo/1.2")]
    backend: String,

    /// Collection to load
    #[arg(long, default_value = "SENTINEL_5P_L2")]
    collection: String,

    /// Band to extract (e.g. O3, NO2, HCHO)
    #[arg(long)]
    band: String,

    /// Year to extract
    #[arg(long)]
    year: i32,

    /// Months to extract (defaults to the whole year)
    #[arg(long, value_delimiter = ',')]
    months: Option<Vec<u32>>,

    /// Study area west edge (degrees)
    #[arg(long, allow_hyphen_values = true)]
    west: f64,

    /// Study area south edge (degrees)
    #[arg(long, allow_hyphen_values = true)]
    south: f64,

    /// Study area east edge (degrees)
    #[arg(long, allow_hyphen_values = true)]
    east: f64,

    /// Study area north edge (degrees)
    #[arg(long, allow_hyphen_values = true)]
    north: f64,

    /// Output filename prefix (e.g. SP_O3)
    #[arg(long)]
    prefix: String,

    /// Directory for downloaded files
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Backend username
    #[arg(long, env = "OPENEO_USERNAME")]
    username: String,

    /// Backend password
    #[arg(long, env = "OPENEO_PASSWORD")]
    password: String,

    /// Seconds between job status polls
    #[arg(long, default_value = "30")]
    poll_interval_secs: u64,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

/// First day of the month and first day of the following month, as the
/// half-open temporal extent the backend expects.
fn month_extent(year: i32, month: u32) -> Option<(String, String)> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)?;
    let end = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((
        start.format("%Y-%m-%d").to_string(),
        end.format("%Y-%m-%d").to_string(),
    ))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
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

    let months = args.months.clone().unwrap_or_else(|| (1..=12).collect());
    let bbox = BoundingBox::new(args.west, args.south, args.east, args.north);
    let poll_interval = Duration::from_secs(args.poll_interval_secs);

    tokio::fs::create_dir_all(&args.output_dir).await?;

    let client = OpeneoClient::connect(&args.backend, &args.username, &args.password)
        .await
        .context("Could not authenticate with the openEO backend")?;

    let mut submitted = 0usize;
    let mut failed = 0usize;

    for month in months {
        let Some((start, end)) = month_extent(args.year, month) else {
            error!(month, "Invalid month, skipping");
            failed += 1;
            continue;
        };
        let stem = format!("{}_{}_{:02}", args.prefix, args.year, month);

        info!(month, start = %start, end = %end, "Submitting extraction job");
        let graph =
            OpeneoClient::extraction_graph(&args.collection, &args.band, &bbox, (&start, &end));

        let result = async {
            let job_id = client.create_job(&args.band, graph).await?;
            info!(job = %job_id, "Job created, starting");
            client.start_job(&job_id).await?;
            client.wait_for_job(&job_id, poll_interval).await?;
            client
                .download_results(&job_id, &args.output_dir, &stem)
                .await
        }
        .await;

        match result {
            Ok(files) => {
                info!(month, files, "Month complete");
                submitted += 1;
            }
            Err(e) => {
                // One bad month never aborts the rest of the year
                error!(month, error = %e, "Month failed");
                failed += 1;
            }
        }
    }

    info!(submitted, failed, "openEO export complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_extent_rollover() {
        assert_eq!(
            month_extent(2023, 1).unwrap(),
            ("2023-01-01".to_string(), "2023-02-01".to_string())
        );
        // December rolls into the next year
        assert_eq!(
            month_extent(2023, 12).unwrap(),
            ("2023-12-01".to_string(), "2024-01-01".to_string())
        );
        assert!(month_extent(2023, 13).is_none());
    }
}
