//! In-memory gridded fields.

use ndarray::{Array2, Array3, ArrayView2};

use crate::error::{GridStoreError, Result};

/// A named measurement on a rectilinear (t, y, x) grid.
///
/// `x` is longitude (degrees_east), `y` latitude (degrees_north), `t` whole
/// days since 1990-01-01. Missing cells are NaN.
#[derive(Debug, Clone)]
pub struct GriddedField {
    pub name: String,
    pub data: Array3<f32>,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub t: Vec<i32>,
}

impl GriddedField {
    /// Create a field, checking that the data shape matches the axes.
    pub fn new(
        name: impl Into<String>,
        data: Array3<f32>,
        x: Vec<f64>,
        y: Vec<f64>,
        t: Vec<i32>,
    ) -> Result<Self> {
        let expected = (t.len(), y.len(), x.len());
        if data.dim() != expected {
            return Err(GridStoreError::invalid_format(format!(
                "data shape {:?} does not match axes {:?}",
                data.dim(),
                expected
            )));
        }
        Ok(Self {
            name: name.into(),
            data,
            x,
            y,
            t,
        })
    }

    /// Grid shape as (nt, ny, nx).
    pub fn shape(&self) -> (usize, usize, usize) {
        self.data.dim()
    }

    /// The 2-D slab for one time level.
    pub fn level(&self, t_index: usize) -> ArrayView2<'_, f32> {
        self.data.index_axis(ndarray::Axis(0), t_index)
    }

    /// Number of non-NaN cells.
    pub fn valid_count(&self) -> usize {
        self.data.iter().filter(|v| !v.is_nan()).count()
    }
}

/// A named measurement on a single (y, x) grid, no time axis.
#[derive(Debug, Clone)]
pub struct GridField2 {
    pub name: String,
    pub data: Array2<f32>,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl GridField2 {
    /// Create a field, checking that the data shape matches the axes.
    pub fn new(
        name: impl Into<String>,
        data: Array2<f32>,
        x: Vec<f64>,
        y: Vec<f64>,
    ) -> Result<Self> {
        let expected = (y.len(), x.len());
        if data.dim() != expected {
            return Err(GridStoreError::invalid_format(format!(
                "data shape {:?} does not match axes {:?}",
                data.dim(),
                expected
            )));
        }
        Ok(Self {
            name: name.into(),
            data,
            x,
            y,
        })
    }

    /// Grid shape as (ny, nx).
    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    #[test]
    fn test_shape_check() {
        let data = Array3::<f32>::zeros((2, 3, 4));
        let field = GriddedField::new("O3", data, vec![0.0; 4], vec![0.0; 3], vec![0, 1]).unwrap();
        assert_eq!(field.shape(), (2, 3, 4));

        let bad = Array3::<f32>::zeros((2, 3, 4));
        assert!(GriddedField::new("O3", bad, vec![0.0; 5], vec![0.0; 3], vec![0, 1]).is_err());
    }

    #[test]
    fn test_valid_count() {
        let mut data = Array3::<f32>::zeros((1, 2, 2));
        data[[0, 0, 0]] = f32::NAN;
        let field =
            GriddedField::new("NO2", data, vec![0.0, 1.0], vec![0.0, 1.0], vec![0]).unwrap();
        assert_eq!(field.valid_count(), 3);
    }
}
