//! Tabular → gridded monthly means.
//!
//! Each input CSV holds the daily cell records for one month. The cells are
//! averaged per (x, y), interpolated onto a regular grid spanning the data
//! extent, and written as a 2-D NetCDF file with the date range recorded in
//! the history attribute.

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use ndarray::Array2;
use tracing::{info, warn};

use atmos_common::ColumnUnit;
use grid_store::{read_records_csv, write_field2, FieldAttrs, GridField2, TabularRecord};
use regrid::scattered_to_grid;

#[derive(Args, Debug)]
pub struct CsvToGridArgs {
    /// Directory with the monthly CSV files
    #[arg(long)]
    pub input_dir: PathBuf,

    /// Directory for the produced NetCDF files
    #[arg(long)]
    pub output_dir: PathBuf,

    /// Measurement variable name (CSV value column and NetCDF variable)
    #[arg(long)]
    pub variable: String,

    /// Target grid width (longitude points)
    #[arg(long, default_value = "176")]
    pub width: usize,

    /// Target grid height (latitude points)
    #[arg(long, default_value = "167")]
    pub height: usize,

    /// Unit of the CSV values
    #[arg(long, default_value = "mol_m2")]
    pub input_unit: ColumnUnit,

    /// Unit to write (conversion is explicit, never guessed)
    #[arg(long, default_value = "mol_m2")]
    pub output_unit: ColumnUnit,
}

fn linspace(start: f64, end: f64, count: usize) -> Vec<f64> {
    if count <= 1 {
        return vec![start];
    }
    let step = (end - start) / (count - 1) as f64;
    (0..count).map(|i| start + i as f64 * step).collect()
}

/// Mean value per distinct (x, y) cell, missing values dropped.
fn cell_means(records: &[TabularRecord]) -> (Vec<(f64, f64)>, Vec<f32>) {
    let mut sums: HashMap<(u64, u64), (f64, f64, f64, usize)> = HashMap::new();
    for record in records {
        if record.value.is_nan() {
            continue;
        }
        let key = (record.lon.to_bits(), record.lat.to_bits());
        let entry = sums.entry(key).or_insert((record.lon, record.lat, 0.0, 0));
        entry.2 += record.value as f64;
        entry.3 += 1;
    }

    let mut points = Vec::with_capacity(sums.len());
    let mut values = Vec::with_capacity(sums.len());
    for (_, (lon, lat, sum, count)) in sums {
        points.push((lon, lat));
        values.push((sum / count as f64) as f32);
    }
    (points, values)
}

pub fn run(args: &CsvToGridArgs) -> Result<()> {
    if args.width < 2 || args.height < 2 {
        bail!("target grid must be at least 2x2");
    }
    std::fs::create_dir_all(&args.output_dir)?;

    let mut entries: Vec<PathBuf> = std::fs::read_dir(&args.input_dir)
        .with_context(|| format!("Cannot scan {}", args.input_dir.display()))?
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.extension().map_or(false, |ext| ext == "csv"))
        .collect();
    entries.sort();

    info!(count = entries.len(), "Gridding monthly CSV files");

    for path in &entries {
        let records = match read_records_csv(path, &args.variable) {
            Ok(records) => records,
            Err(e) => {
                warn!(file = %path.display(), error = %e, "Skipping unreadable file");
                continue;
            }
        };

        let (points, mut values) = cell_means(&records);
        if points.is_empty() {
            warn!(file = %path.display(), "No valid cells, skipping");
            continue;
        }

        if args.input_unit != args.output_unit {
            for value in &mut values {
                *value = args
                    .output_unit
                    .to_mol_m2(args.input_unit.to_molecules_cm2(*value as f64))
                    as f32;
            }
        }

        let lon_min = points.iter().map(|p| p.0).fold(f64::INFINITY, f64::min);
        let lon_max = points.iter().map(|p| p.0).fold(f64::NEG_INFINITY, f64::max);
        let lat_min = points.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);
        let lat_max = points.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max);

        let x = linspace(lon_min, lon_max, args.width);
        let y = linspace(lat_min, lat_max, args.height);

        let slab = scattered_to_grid(&points, &values, &x, &y)?;
        let data = Array2::from_shape_vec((y.len(), x.len()), slab)?;
        let field = GridField2::new(&args.variable, data, x, y)?;

        let mut dates: Vec<chrono::NaiveDate> = records.iter().map(|r| r.date).collect();
        dates.sort_unstable();
        let history = match (dates.first(), dates.last()) {
            (Some(first), Some(last)) => Some(format!(
                "Monthly mean {} data for {} to {}",
                args.variable,
                first.format("%d/%m/%Y"),
                last.format("%d/%m/%Y")
            )),
            _ => None,
        };

        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("grid")
            .to_string();
        let out_path = args.output_dir.join(format!("{stem}.nc"));

        let attrs = FieldAttrs {
            units: Some(args.output_unit.attribute().to_string()),
            long_name: Some(format!("Monthly mean {} column", args.variable)),
            description: None,
            history,
        };
        write_field2(&out_path, &field, &attrs)?;
        info!(file = %out_path.display(), cells = points.len(), "Gridded");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_cell_means_averages_duplicates() {
        let date = NaiveDate::from_ymd_opt(2023, 5, 1).unwrap();
        let records = vec![
            TabularRecord {
                date,
                lon: 1.0,
                lat: 2.0,
                value: 4.0,
            },
            TabularRecord {
                date,
                lon: 1.0,
                lat: 2.0,
                value: 6.0,
            },
            TabularRecord {
                date,
                lon: 1.5,
                lat: 2.0,
                value: f32::NAN,
            },
        ];

        let (points, values) = cell_means(&records);
        assert_eq!(points.len(), 1);
        assert_eq!(values[0], 5.0);
    }

    #[test]
    fn test_linspace_endpoints() {
        let v = linspace(0.0, 1.0, 5);
        assert_eq!(v.len(), 5);
        assert_eq!(v[0], 0.0);
        assert_eq!(v[4], 1.0);
    }
}
