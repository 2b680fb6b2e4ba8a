//! Per-region daily mean series.
//!
//! Every grid file is scanned once per region; cells inside the region's
//! bounding box are averaged per day, negative retrievals excluded. The
//! per-region series are outer-joined on the day column over the continuous
//! date range from first to last observation.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::{Duration, NaiveDate};
use clap::Args;
use tracing::{info, warn};

use atmos_common::{days_to_date, load_regions, Region};
use grid_store::{list_netcdf_files, read_field};

#[derive(Args, Debug)]
pub struct SiteSeriesArgs {
    /// Directory searched recursively for grid files
    #[arg(long)]
    pub input_dir: PathBuf,

    /// Regions YAML file
    #[arg(long)]
    pub regions: PathBuf,

    /// Measurement variable name
    #[arg(long)]
    pub variable: String,

    /// Output CSV path
    #[arg(long)]
    pub output: PathBuf,
}

type DailyMeans = BTreeMap<NaiveDate, (f64, usize)>;

fn accumulate_region(
    field: &grid_store::GriddedField,
    region: &Region,
    daily: &mut DailyMeans,
) {
    for (k, &day) in field.t.iter().enumerate() {
        let date = days_to_date(day);
        for (j, &lat) in field.y.iter().enumerate() {
            for (i, &lon) in field.x.iter().enumerate() {
                if !region.bbox.contains(lon, lat) {
                    continue;
                }
                let value = field.data[[k, j, i]];
                // Negative retrievals are excluded from the mean
                if value.is_nan() || value < 0.0 {
                    continue;
                }
                let entry = daily.entry(date).or_insert((0.0, 0));
                entry.0 += value as f64;
                entry.1 += 1;
            }
        }
    }
}

pub fn run(args: &SiteSeriesArgs) -> Result<()> {
    let regions = load_regions(&args.regions)?;
    let files = list_netcdf_files(&args.input_dir)
        .with_context(|| format!("Cannot scan {}", args.input_dir.display()))?;
    if files.is_empty() {
        bail!("no grid files under {}", args.input_dir.display());
    }

    info!(
        files = files.len(),
        regions = regions.len(),
        "Extracting per-region daily means"
    );

    let mut series: Vec<DailyMeans> = vec![BTreeMap::new(); regions.len()];
    for path in &files {
        let field = match read_field(path, &args.variable) {
            Ok(field) => field,
            Err(e) => {
                warn!(file = %path.display(), error = %e, "Skipping unreadable file");
                continue;
            }
        };
        for (region, daily) in regions.iter().zip(&mut series) {
            accumulate_region(&field, region, daily);
        }
    }

    let first = series
        .iter()
        .filter_map(|s| s.keys().next())
        .min()
        .copied();
    let last = series
        .iter()
        .filter_map(|s| s.keys().last())
        .max()
        .copied();
    let (Some(first), Some(last)) = (first, last) else {
        bail!("no valid observations in any region");
    };

    if let Some(parent) = args.output.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = csv::Writer::from_path(&args.output)?;

    let mut header = vec!["day".to_string()];
    header.extend(regions.iter().map(|r| r.name.clone()));
    writer.write_record(&header)?;

    // Continuous daily range; days without data stay empty
    let mut date = first;
    while date <= last {
        let mut row = vec![date.format("%Y-%m-%d").to_string()];
        for daily in &series {
            match daily.get(&date) {
                Some((sum, count)) if *count > 0 => {
                    row.push(format!("{}", sum / *count as f64));
                }
                _ => row.push(String::new()),
            }
        }
        writer.write_record(&row)?;
        date = date + Duration::days(1);
    }
    writer.flush()?;

    info!(
        output = %args.output.display(),
        from = %first,
        to = %last,
        "Site series written"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use atmos_common::BoundingBox;
    use grid_store::GriddedField;
    use ndarray::Array3;

    #[test]
    fn test_accumulate_excludes_negative_and_outside() {
        let mut data = Array3::from_elem((1, 2, 2), 1.0f32);
        data[[0, 0, 0]] = -5.0; // negative retrieval, excluded
        data[[0, 0, 1]] = 3.0;
        let field = GriddedField::new(
            "NO2",
            data,
            vec![0.0, 1.0],
            vec![0.0, 10.0], // second row far outside the region
            vec![100],
        )
        .unwrap();

        let region = Region {
            name: "TEST".to_string(),
            bbox: BoundingBox::new(-0.5, -0.5, 1.5, 0.5),
        };

        let mut daily = DailyMeans::new();
        accumulate_region(&field, &region, &mut daily);

        let (sum, count) = daily[&days_to_date(100)];
        assert_eq!(count, 1);
        assert_eq!(sum, 3.0);
    }
}
