//! Multi-year averages of per-month mean files.
//!
//! The monthly-mean directory holds one file per (year, month), named
//! `..._MM_MEAN.nc`. For each calendar month the files across years are
//! averaged cell by cell; the inputs are already monthly means, so no
//! weighting is applied.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use ndarray::Array2;
use tracing::{info, warn};

use grid_store::{read_field2, write_field2, FieldAttrs, GridField2};

#[derive(Args, Debug)]
pub struct MonthStackArgs {
    /// Directory with the per-(year, month) mean files
    #[arg(long)]
    pub input_dir: PathBuf,

    /// Directory for the all-years files
    #[arg(long)]
    pub output_dir: PathBuf,

    /// Measurement variable name (e.g. HCHO_mean)
    #[arg(long)]
    pub variable: String,

    /// Output filename prefix (e.g. HCHO_MEAN_ALL_YEARS)
    #[arg(long)]
    pub output_prefix: String,
}

fn monthly_files(dir: &PathBuf, month: u32) -> Result<Vec<PathBuf>> {
    let suffix = format!("_{month:02}_MEAN.nc");
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("Cannot scan {}", dir.display()))?
        .flatten()
        .map(|e| e.path())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .map_or(false, |n| n.ends_with(&suffix))
        })
        .collect();
    files.sort();
    Ok(files)
}

pub fn run(args: &MonthStackArgs) -> Result<()> {
    std::fs::create_dir_all(&args.output_dir)?;

    let mut written = 0usize;
    for month in 1..=12u32 {
        let files = monthly_files(&args.input_dir, month)?;
        if files.is_empty() {
            info!(month, "No files found for month");
            continue;
        }

        let mut sum: Option<Array2<f64>> = None;
        let mut x = Vec::new();
        let mut y = Vec::new();
        let mut used = 0usize;

        for path in &files {
            let field = match read_field2(path, &args.variable) {
                Ok(field) => field,
                Err(e) => {
                    warn!(file = %path.display(), error = %e, "Skipping unreadable file");
                    continue;
                }
            };

            match &mut sum {
                None => {
                    x = field.x.clone();
                    y = field.y.clone();
                    sum = Some(field.data.mapv(|v| v as f64));
                    used = 1;
                }
                Some(acc) => {
                    if field.data.dim() != acc.dim() {
                        bail!(
                            "grid shape changed between years for month {month:02}: {:?} vs {:?}",
                            field.data.dim(),
                            acc.dim()
                        );
                    }
                    *acc += &field.data.mapv(|v| v as f64);
                    used += 1;
                }
            }
        }

        let Some(acc) = sum else { continue };
        let mean = acc.mapv(|v| (v / used as f64) as f32);
        let field = GridField2::new(&args.variable, mean, x, y)?;

        let out_path = args
            .output_dir
            .join(format!("{}_{month:02}.nc", args.output_prefix));
        let attrs = FieldAttrs {
            units: Some("mol m-2".to_string()),
            long_name: Some(format!("All-years mean for month {month:02}")),
            description: None,
            history: Some(format!("Mean of {used} monthly files")),
        };
        write_field2(&out_path, &field, &attrs)?;

        info!(month, years = used, file = %out_path.display(), "Wrote month stack");
        written += 1;
    }

    info!(written, "Month-stack complete");
    Ok(())
}
