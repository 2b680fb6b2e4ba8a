//! Boundary-layer-mean mixing ratios.
//!
//! Converts monthly satellite column files (HCHO or NO2) into
//! boundary-layer-average mixing ratios using the reanalysis boundary-layer
//! height and the ideal-gas air column at a fixed reference surface state.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use ndarray::{Array3, Axis as NdAxis};
use tracing::{debug, info, warn};

use atmos_common::{days_to_date, ColumnUnit};
use chem_kernels::{mixing_ratio_ppbv, AirMass};
use grid_store::{
    find_file_by_date, read_field, read_surface_field, write_field, FieldAttrs, GriddedField,
};
use regrid::{regrid, Axis};

#[derive(Args, Debug)]
pub struct PblRatioArgs {
    /// Directory with the monthly satellite column files
    #[arg(long)]
    pub satellite_dir: PathBuf,

    /// Directory with the reanalysis boundary-layer-height granules
    #[arg(long)]
    pub pblh_dir: PathBuf,

    /// Directory for the derived monthly files
    #[arg(long)]
    pub output_dir: PathBuf,

    /// Region prefix of the satellite files (e.g. FR)
    #[arg(long)]
    pub prefix: String,

    /// Gas variable name (HCHO or NO2)
    #[arg(long)]
    pub gas: String,

    /// First year to process
    #[arg(long)]
    pub start_year: i32,

    /// Last year to process (inclusive)
    #[arg(long)]
    pub end_year: i32,

    /// Unit of the satellite columns
    #[arg(long, default_value = "mol_m2")]
    pub column_unit: ColumnUnit,

    /// Reference surface temperature (°C)
    #[arg(long, default_value = "12.38")]
    pub surface_temp_c: f64,

    /// Reference surface pressure (Pa)
    #[arg(long, default_value = "99587.0")]
    pub surface_pressure_pa: f64,
}

pub fn run(args: &PblRatioArgs) -> Result<()> {
    std::fs::create_dir_all(&args.output_dir)?;
    let air = AirMass::new(args.surface_temp_c, args.surface_pressure_pa);

    let mut months_written = 0usize;
    for year in args.start_year..=args.end_year {
        for month in 1..=12u32 {
            let name = format!("{}_{}_{year}_{month:02}.nc", args.prefix, args.gas);
            let satellite_path = args.satellite_dir.join(&name);
            if !satellite_path.exists() {
                continue;
            }

            match process_month(args, &air, &satellite_path, year, month) {
                Ok(true) => months_written += 1,
                Ok(false) => {}
                Err(e) => {
                    warn!(file = %satellite_path.display(), error = %e, "Month failed");
                }
            }
        }
    }

    info!(months_written, "Boundary-layer derivation complete");
    Ok(())
}

fn process_month(
    args: &PblRatioArgs,
    air: &AirMass,
    satellite_path: &std::path::Path,
    year: i32,
    month: u32,
) -> Result<bool> {
    let satellite = read_field(satellite_path, &args.gas)
        .with_context(|| format!("Cannot read {}", satellite_path.display()))?;

    let mut day_slices = Vec::new();
    let mut day_stamps = Vec::new();

    for (idx, &day) in satellite.t.iter().enumerate() {
        let date = days_to_date(day);

        let Some(pblh_path) = find_file_by_date(&args.pblh_dir, date) else {
            debug!(%date, "No PBLH companion, skipping day");
            continue;
        };

        // Daily mean boundary-layer height on the reanalysis grid
        let pblh = read_surface_field(&pblh_path, "PBLH")?;
        let src_x = Axis::new(pblh.lon.clone())?;
        let src_y = Axis::new(pblh.lat.clone())?;
        let pblh_slab: Vec<f32> = pblh.data.iter().copied().collect();
        let pblh_on_satellite = regrid(&pblh_slab, &src_x, &src_y, &satellite.x, &satellite.y)?;

        let column = satellite.level(idx);
        let nx = satellite.x.len();
        let mut ppbv = vec![f32::NAN; pblh_on_satellite.len()];
        for (j, row) in column.outer_iter().enumerate() {
            for (i, &vcd) in row.iter().enumerate() {
                let air_column = air.pbl_air_column(pblh_on_satellite[j * nx + i] as f64);
                let molecules = args.column_unit.to_molecules_cm2(vcd as f64);
                ppbv[j * nx + i] = mixing_ratio_ppbv(molecules, air_column) as f32;
            }
        }

        day_slices.push(ppbv);
        day_stamps.push(day);
    }

    if day_slices.is_empty() {
        info!(year, month, "No days with PBLH companions, skipping month");
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

    let var_name = format!("{}_PBL", args.gas);
    let field = GriddedField::new(
        var_name.clone(),
        data,
        satellite.x.clone(),
        satellite.y.clone(),
        day_stamps,
    )?;

    let out_path = args
        .output_dir
        .join(format!("{}_{var_name}_{year}_{month:02}.nc", args.prefix));
    let attrs = FieldAttrs {
        units: Some("ppbv".to_string()),
        long_name: Some(format!("PBL-mean {} mixing ratio", args.gas)),
        description: Some(
            "Computed from the satellite column and the reanalysis boundary-layer height \
             without capping"
                .to_string(),
        ),
        history: None,
    };
    write_field(&out_path, &field, &attrs)?;

    info!(file = %out_path.display(), days = field.t.len(), "Saved monthly file");
    Ok(true)
}
