//! NetCDF reading and writing with the shared x/y/t convention.

use std::path::Path;

use ndarray::{Array2, Array3};
use tracing::debug;

use crate::error::{GridStoreError, Result};
use crate::field::{GridField2, GriddedField};

/// Attributes stamped onto a written measurement variable.
#[derive(Debug, Clone, Default)]
pub struct FieldAttrs {
    /// `units` attribute (e.g. "mol m-2", "ppbv").
    pub units: Option<String>,
    /// `long_name` attribute.
    pub long_name: Option<String>,
    /// `description` attribute.
    pub description: Option<String>,
    /// Global `history` attribute.
    pub history: Option<String>,
}

fn coord_values(file: &netcdf::File, name: &str) -> Result<Vec<f64>> {
    let var = file
        .variable(name)
        .ok_or_else(|| GridStoreError::missing(format!("{name} variable")))?;
    Ok(var.get_values::<f64, _>(..)?)
}

/// Read a (t, y, x) field from a NetCDF file.
pub fn read_field(path: &Path, var_name: &str) -> Result<GriddedField> {
    let file = netcdf::open(path)?;

    let x = coord_values(&file, "x")?;
    let y = coord_values(&file, "y")?;
    let t: Vec<i32> = file
        .variable("t")
        .ok_or_else(|| GridStoreError::missing("t variable".to_string()))?
        .get_values::<i32, _>(..)?;

    let var = file
        .variable(var_name)
        .ok_or_else(|| GridStoreError::missing(format!("{var_name} variable")))?;
    let raw: Vec<f32> = var.get_values::<f32, _>(..)?;

    if raw.len() != t.len() * y.len() * x.len() {
        return Err(GridStoreError::invalid_format(format!(
            "{var_name} has {} values for a {}x{}x{} grid",
            raw.len(),
            t.len(),
            y.len(),
            x.len()
        )));
    }

    let data = Array3::from_shape_vec((t.len(), y.len(), x.len()), raw)
        .map_err(|e| GridStoreError::invalid_format(e.to_string()))?;

    debug!(path = %path.display(), var = var_name, nt = t.len(), ny = y.len(), nx = x.len(), "Read gridded field");
    GriddedField::new(var_name, data, x, y, t)
}

/// Read a (y, x) field with no time axis.
pub fn read_field2(path: &Path, var_name: &str) -> Result<GridField2> {
    let file = netcdf::open(path)?;

    let x = coord_values(&file, "x")?;
    let y = coord_values(&file, "y")?;

    let var = file
        .variable(var_name)
        .ok_or_else(|| GridStoreError::missing(format!("{var_name} variable")))?;
    let raw: Vec<f32> = var.get_values::<f32, _>(..)?;

    if raw.len() != y.len() * x.len() {
        return Err(GridStoreError::invalid_format(format!(
            "{var_name} has {} values for a {}x{} grid",
            raw.len(),
            y.len(),
            x.len()
        )));
    }

    let data = Array2::from_shape_vec((y.len(), x.len()), raw)
        .map_err(|e| GridStoreError::invalid_format(e.to_string()))?;

    GridField2::new(var_name, data, x, y)
}

fn write_axes(file: &mut netcdf::FileMut, x: &[f64], y: &[f64]) -> Result<()> {
    file.add_dimension("y", y.len())?;
    file.add_dimension("x", x.len())?;

    let mut y_var = file.add_variable::<f64>("y", &["y"])?;
    y_var.put_attribute("standard_name", "latitude")?;
    y_var.put_attribute("long_name", "latitude")?;
    y_var.put_attribute("units", "degrees_north")?;
    y_var.put_values(y, ..)?;

    let mut x_var = file.add_variable::<f64>("x", &["x"])?;
    x_var.put_attribute("standard_name", "longitude")?;
    x_var.put_attribute("long_name", "longitude")?;
    x_var.put_attribute("units", "degrees_east")?;
    x_var.put_values(x, ..)?;

    Ok(())
}

fn apply_attrs(var: &mut netcdf::VariableMut, attrs: &FieldAttrs) -> Result<()> {
    if let Some(units) = &attrs.units {
        var.put_attribute("units", units.as_str())?;
    }
    if let Some(long_name) = &attrs.long_name {
        var.put_attribute("long_name", long_name.as_str())?;
    }
    if let Some(description) = &attrs.description {
        var.put_attribute("description", description.as_str())?;
    }
    Ok(())
}

/// Write a (t, y, x) field with the shared coordinate convention.
///
/// `t` is the unlimited dimension; the measurement is deflate-compressed
/// with NaN as the fill value.
pub fn write_field(path: &Path, field: &GriddedField, attrs: &FieldAttrs) -> Result<()> {
    let mut file = netcdf::create(path)?;

    file.add_unlimited_dimension("t")?;
    write_axes(&mut file, &field.x, &field.y)?;

    let (nt, ny, nx) = field.shape();

    // Writes along the unlimited dimension need explicit extents
    let mut t_var = file.add_variable::<i32>("t", &["t"])?;
    t_var.put_attribute("standard_name", "time")?;
    t_var.put_attribute("long_name", "time")?;
    t_var.put_attribute("units", "days since 1990-01-01")?;
    t_var.put_attribute("axis", "T")?;
    t_var.put_values(&field.t, 0..nt)?;

    let mut var = file.add_variable::<f32>(&field.name, &["t", "y", "x"])?;
    var.set_fill_value(f32::NAN)?;
    var.set_compression(5, false)?;
    apply_attrs(&mut var, attrs)?;
    let flat: Vec<f32> = field.data.iter().copied().collect();
    var.put_values(&flat, (0..nt, 0..ny, 0..nx))?;

    if let Some(history) = &attrs.history {
        file.add_attribute("history", history.as_str())?;
    }

    debug!(path = %path.display(), var = %field.name, "Wrote gridded field");
    Ok(())
}

/// Write a (y, x) field with no time axis.
pub fn write_field2(path: &Path, field: &GridField2, attrs: &FieldAttrs) -> Result<()> {
    let mut file = netcdf::create(path)?;

    write_axes(&mut file, &field.x, &field.y)?;

    let mut var = file.add_variable::<f32>(&field.name, &["y", "x"])?;
    var.set_fill_value(f32::NAN)?;
    apply_attrs(&mut var, attrs)?;
    let flat: Vec<f32> = field.data.iter().copied().collect();
    var.put_values(&flat, ..)?;

    if let Some(history) = &attrs.history {
        file.add_attribute("history", history.as_str())?;
    }

    debug!(path = %path.display(), var = %field.name, "Wrote 2-D field");
    Ok(())
}
