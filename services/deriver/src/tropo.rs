//! Tropospheric ozone column estimation.
//!
//! For each daily satellite slice the reanalysis tropospheric-to-total
//! ozone ratio is computed on the reanalysis grid, interpolated onto the
//! satellite grid, and multiplied into the satellite total column.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use ndarray::{Array3, Axis as NdAxis};
use tracing::{debug, info, warn};

use atmos_common::days_to_date;
use chem_kernels::tropospheric_columns;
use grid_store::{
    find_file_by_date, read_field, read_level_stack, read_surface_field, write_field, FieldAttrs,
    GriddedField,
};
use regrid::{regrid, Axis};

#[derive(Args, Debug)]
pub struct TropOzoneArgs {
    /// Directory with the monthly satellite total-column files
    #[arg(long)]
    pub satellite_dir: PathBuf,

    /// Directory with the reanalysis O3/DELP granules
    #[arg(long)]
    pub o3_delp_dir: PathBuf,

    /// Directory with the reanalysis tropopause-pressure granules
    #[arg(long)]
    pub troppb_dir: PathBuf,

    /// Directory for the derived monthly files
    #[arg(long)]
    pub output_dir: PathBuf,

    /// Region prefix of the satellite files (e.g. FR for FR_O3_2023_01.nc)
    #[arg(long)]
    pub prefix: String,

    /// First year to process
    #[arg(long)]
    pub start_year: i32,

    /// Last year to process (inclusive)
    #[arg(long)]
    pub end_year: i32,
}

pub fn run(args: &TropOzoneArgs) -> Result<()> {
    std::fs::create_dir_all(&args.output_dir)?;

    let mut months_written = 0usize;
    for year in args.start_year..=args.end_year {
        for month in 1..=12u32 {
            let name = format!("{}_O3_{year}_{month:02}.nc", args.prefix);
            let satellite_path = args.satellite_dir.join(&name);
            if !satellite_path.exists() {
                continue;
            }

            match process_month(args, &satellite_path, year, month) {
                Ok(true) => months_written += 1,
                Ok(false) => {}
                Err(e) => {
                    warn!(file = %satellite_path.display(), error = %e, "Month failed");
                }
            }
        }
    }

    info!(months_written, "Tropospheric ozone derivation complete");
    Ok(())
}

fn process_month(
    args: &TropOzoneArgs,
    satellite_path: &std::path::Path,
    year: i32,
    month: u32,
) -> Result<bool> {
    let satellite = read_field(satellite_path, "O3")
        .with_context(|| format!("Cannot read {}", satellite_path.display()))?;

    let mut day_slices = Vec::new();
    let mut day_stamps = Vec::new();

    for (idx, &day) in satellite.t.iter().enumerate() {
        let date = days_to_date(day);

        // Days without both reanalysis companions are skipped, not errors
        let Some(o3_delp_path) = find_file_by_date(&args.o3_delp_dir, date) else {
            debug!(%date, "No O3/DELP companion, skipping day");
            continue;
        };
        let Some(troppb_path) = find_file_by_date(&args.troppb_dir, date) else {
            debug!(%date, "No TROPPB companion, skipping day");
            continue;
        };

        let o3 = read_level_stack(&o3_delp_path, "O3")?;
        let delp = read_level_stack(&o3_delp_path, "DELP")?;
        let troppb = read_surface_field(&troppb_path, "TROPPB")?;

        let columns = tropospheric_columns(&o3.data, &delp.data, &troppb.data)?;

        let finite: Vec<f32> = columns
            .ratio
            .iter()
            .copied()
            .filter(|v| !v.is_nan())
            .collect();
        let mean_ratio = finite.iter().sum::<f32>() / finite.len().max(1) as f32;
        info!(%date, mean_ratio = format!("{mean_ratio:.3}"), "Computed tropospheric ratio");

        // Reanalysis ratio onto the satellite grid
        let src_x = Axis::new(o3.lon.clone())?;
        let src_y = Axis::new(o3.lat.clone())?;
        let ratio_slab: Vec<f32> = columns.ratio.iter().copied().collect();
        let ratio_on_satellite = regrid(&ratio_slab, &src_x, &src_y, &satellite.x, &satellite.y)?;

        // Scale the satellite total column
        let total = satellite.level(idx);
        let nx = satellite.x.len();
        let mut scaled = vec![f32::NAN; ratio_on_satellite.len()];
        for (j, row) in total.outer_iter().enumerate() {
            for (i, &value) in row.iter().enumerate() {
                scaled[j * nx + i] = ratio_on_satellite[j * nx + i] * value;
            }
        }

        day_slices.push(scaled);
        day_stamps.push(day);
    }

    if day_slices.is_empty() {
        info!(year, month, "No days with reanalysis companions, skipping month");
        return Ok(false);
    }

    let (ny, nx) = (satellite.y.len(), satellite.x.len());
    let mut data = Array3::<f32>::zeros((day_stamps.len(), ny, nx));
    for (k, slab) in day_slices.iter().enumerate() {
        let mut level = data.index_axis_mut(NdAxis(0), k);
        for j in 0..ny {
            for i in 0..nx {
                level[[j, i]] = slab[j * nx + i];
            }
        }
    }

    let field = GriddedField::new(
        "O3_TROP",
        data,
        satellite.x.clone(),
        satellite.y.clone(),
        day_stamps,
    )?;

    let out_path = args
        .output_dir
        .join(format!("{}_O3_TROP_{year}_{month:02}.nc", args.prefix));
    let attrs = FieldAttrs {
        units: Some("mol m-2".to_string()),
        long_name: Some(
            "Tropospheric ozone column estimated by scaling the satellite total column \
             with the reanalysis tropospheric ratio"
                .to_string(),
        ),
        description: None,
        history: None,
    };
    write_field(&out_path, &field, &attrs)?;

    info!(file = %out_path.display(), days = field.t.len(), "Saved monthly file");
    Ok(true)
}
