//! Gridded → tabular conversion.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::{info, warn};

use grid_store::{field_to_records, list_netcdf_files, read_field, write_records_csv};

#[derive(Args, Debug)]
pub struct GridToCsvArgs {
    /// Directory searched recursively for .nc files
    #[arg(long)]
    pub input_dir: PathBuf,

    /// Directory for the produced CSV files
    #[arg(long)]
    pub output_dir: PathBuf,

    /// Measurement variable name (e.g. HCHO, NO2, O3)
    #[arg(long)]
    pub variable: String,
}

pub fn run(args: &GridToCsvArgs) -> Result<()> {
    std::fs::create_dir_all(&args.output_dir)?;

    let files = list_netcdf_files(&args.input_dir)
        .with_context(|| format!("Cannot scan {}", args.input_dir.display()))?;
    info!(count = files.len(), "Converting gridded files to CSV");

    let mut converted = 0usize;
    for path in &files {
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("grid")
            .to_string();
        let csv_path = args.output_dir.join(format!("{stem}.csv"));

        match read_field(path, &args.variable) {
            Ok(field) => {
                let records = field_to_records(&field);
                write_records_csv(&csv_path, &args.variable, &records)?;
                info!(file = %csv_path.display(), rows = records.len(), "Converted");
                converted += 1;
            }
            Err(e) => {
                // A malformed file skips, the batch continues
                warn!(file = %path.display(), error = %e, "Skipping unreadable file");
            }
        }
    }

    info!(converted, total = files.len(), "Grid-to-CSV complete");
    Ok(())
}
