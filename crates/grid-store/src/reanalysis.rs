//! Readers for reanalysis granules (MERRA-2 subset files).
//!
//! These files use `lat`/`lon` coordinate names and carry a leading time
//! dimension of length 1 (level stacks) or a short time series (surface
//! fields, averaged here). Masked cells use a `_FillValue` sentinel and are
//! mapped to NaN on read.

use std::path::Path;

use ndarray::{Array2, Array3};
use tracing::debug;

use crate::error::{GridStoreError, Result};

/// A (lev, lat, lon) stack from one granule.
#[derive(Debug, Clone)]
pub struct LevelStack {
    pub data: Array3<f32>,
    pub lat: Vec<f64>,
    pub lon: Vec<f64>,
}

/// A single (lat, lon) surface field from one granule.
#[derive(Debug, Clone)]
pub struct SurfaceField {
    pub data: Array2<f32>,
    pub lat: Vec<f64>,
    pub lon: Vec<f64>,
}

fn has_attr(var: &netcdf::Variable, name: &str) -> bool {
    var.attributes().any(|attr| attr.name() == name)
}

fn fill_value(var: &netcdf::Variable) -> Option<f32> {
    if !has_attr(var, "_FillValue") {
        return None;
    }
    let attr_value = var.attribute_value("_FillValue")?.ok()?;
    f32::try_from(attr_value).ok()
}

fn mask_fill(values: &mut [f32], fill: Option<f32>) {
    if let Some(fill) = fill {
        if fill.is_nan() {
            return;
        }
        for v in values.iter_mut() {
            // Fill sentinels are huge (1e15); compare with a relative margin
            if (*v - fill).abs() <= fill.abs() * 1e-6 {
                *v = f32::NAN;
            }
        }
    }
}

fn coord_values(file: &netcdf::File, name: &str) -> Result<Vec<f64>> {
    let var = file
        .variable(name)
        .ok_or_else(|| GridStoreError::missing(format!("{name} variable")))?;
    Ok(var.get_values::<f64, _>(..)?)
}

/// Read a (time, lev, lat, lon) variable's first time step as a level stack.
pub fn read_level_stack(path: &Path, var_name: &str) -> Result<LevelStack> {
    let file = netcdf::open(path)?;
    let lat = coord_values(&file, "lat")?;
    let lon = coord_values(&file, "lon")?;

    let var = file
        .variable(var_name)
        .ok_or_else(|| GridStoreError::missing(format!("{var_name} variable")))?;

    let dims: Vec<usize> = var.dimensions().iter().map(|d| d.len()).collect();
    if dims.len() != 4 {
        return Err(GridStoreError::invalid_format(format!(
            "{var_name} has {} dimensions, expected (time, lev, lat, lon)",
            dims.len()
        )));
    }
    let (nlev, nlat, nlon) = (dims[1], dims[2], dims[3]);

    let mut raw: Vec<f32> = var.get_values::<f32, _>((0..1, 0..nlev, 0..nlat, 0..nlon))?;
    mask_fill(&mut raw, fill_value(&var));

    let data = Array3::from_shape_vec((nlev, nlat, nlon), raw)
        .map_err(|e| GridStoreError::invalid_format(e.to_string()))?;

    debug!(path = %path.display(), var = var_name, nlev, nlat, nlon, "Read level stack");
    Ok(LevelStack { data, lat, lon })
}

/// Read a (time, lat, lon) surface variable, averaging over time.
///
/// Falls back to the last non-coordinate variable when `var_name` is not
/// present (some subset exports rename the measurement).
pub fn read_surface_field(path: &Path, var_name: &str) -> Result<SurfaceField> {
    let file = netcdf::open(path)?;
    let lat = coord_values(&file, "lat")?;
    let lon = coord_values(&file, "lon")?;

    let var = match file.variable(var_name) {
        Some(var) => var,
        None => file
            .variables()
            .filter(|v| !matches!(v.name().as_str(), "lat" | "lon" | "time" | "lev"))
            .last()
            .ok_or_else(|| GridStoreError::missing(format!("{var_name} variable")))?,
    };

    let dims: Vec<usize> = var.dimensions().iter().map(|d| d.len()).collect();
    let (nt, nlat, nlon) = match dims.len() {
        2 => (1, dims[0], dims[1]),
        3 => (dims[0], dims[1], dims[2]),
        n => {
            return Err(GridStoreError::invalid_format(format!(
                "{} has {} dimensions, expected (time, lat, lon)",
                var.name(),
                n
            )))
        }
    };

    let mut raw: Vec<f32> = var.get_values::<f32, _>(..)?;
    mask_fill(&mut raw, fill_value(&var));

    // NaN-mean over the time dimension
    let mut data = Array2::<f32>::zeros((nlat, nlon));
    for j in 0..nlat {
        for i in 0..nlon {
            let mut sum = 0.0f64;
            let mut count = 0usize;
            for k in 0..nt {
                let v = raw[(k * nlat + j) * nlon + i];
                if !v.is_nan() {
                    sum += v as f64;
                    count += 1;
                }
            }
            data[[j, i]] = if count == 0 {
                f32::NAN
            } else {
                (sum / count as f64) as f32
            };
        }
    }

    debug!(path = %path.display(), var = %var.name(), nt, nlat, nlon, "Read surface field");
    Ok(SurfaceField { data, lat, lon })
}
