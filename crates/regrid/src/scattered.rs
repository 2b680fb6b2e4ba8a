//! Gridding of scattered (x, y, value) samples.
//!
//! The workflow's scattered inputs (CSV cell dumps, flattened reanalysis
//! meshes) always lie on a rectilinear layout, so the axes are recovered
//! from the distinct sorted coordinates and the samples reassembled into a
//! grid before interpolation. Cells never observed stay NaN, and target
//! points outside the populated hull interpolate to NaN.

use tracing::debug;

use crate::axes::{regrid, Axis};
use crate::error::{RegridError, Result};

/// Tolerance for collapsing near-identical coordinates into one axis point.
const COORD_EPS: f64 = 1e-9;

fn distinct_sorted(coords: impl Iterator<Item = f64>) -> Vec<f64> {
    let mut values: Vec<f64> = coords.filter(|v| v.is_finite()).collect();
    values.sort_by(|a, b| a.total_cmp(b));
    values.dedup_by(|a, b| (*a - *b).abs() <= COORD_EPS);
    values
}

fn axis_position(axis: &[f64], coord: f64) -> Option<usize> {
    axis.binary_search_by(|v| {
        if (v - coord).abs() <= COORD_EPS {
            std::cmp::Ordering::Equal
        } else {
            v.total_cmp(&coord)
        }
    })
    .ok()
}

/// Interpolate scattered samples onto target rectilinear axes.
///
/// `points` are (lon, lat) pairs matching `values`. Duplicate points keep
/// the last value seen (the caller is expected to have averaged duplicates
/// already).
pub fn scattered_to_grid(
    points: &[(f64, f64)],
    values: &[f32],
    dst_x: &[f64],
    dst_y: &[f64],
) -> Result<Vec<f32>> {
    if points.len() != values.len() {
        return Err(RegridError::shape_mismatch(format!(
            "{} points but {} values",
            points.len(),
            values.len()
        )));
    }
    if points.is_empty() {
        return Err(RegridError::EmptyInput("no scattered samples".to_string()));
    }

    let xs = distinct_sorted(points.iter().map(|p| p.0));
    let ys = distinct_sorted(points.iter().map(|p| p.1));
    if xs.is_empty() || ys.is_empty() {
        return Err(RegridError::EmptyInput(
            "no finite coordinates in scattered samples".to_string(),
        ));
    }

    // Reassemble the rectilinear layout the samples came from.
    let mut slab = vec![f32::NAN; xs.len() * ys.len()];
    let mut placed = 0usize;
    for ((lon, lat), &value) in points.iter().zip(values) {
        let (Some(i), Some(j)) = (axis_position(&xs, *lon), axis_position(&ys, *lat)) else {
            continue;
        };
        slab[j * xs.len() + i] = value;
        placed += 1;
    }

    debug!(
        points = points.len(),
        placed,
        nx = xs.len(),
        ny = ys.len(),
        "Gridded scattered samples"
    );

    let src_x = Axis::new(xs)?;
    let src_y = Axis::new(ys)?;
    regrid(&slab, &src_x, &src_y, dst_x, dst_y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_on_grid_points_reproduced() {
        // A 2x2 layout given in shuffled order
        let points = [(1.0, 10.0), (0.0, 11.0), (1.0, 11.0), (0.0, 10.0)];
        let values = [2.0f32, 3.0, 4.0, 1.0];

        let out = scattered_to_grid(&points, &values, &[0.0, 1.0], &[10.0, 11.0]).unwrap();
        assert_eq!(out, vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_interior_interpolation() {
        let points = [(0.0, 0.0), (2.0, 0.0), (0.0, 2.0), (2.0, 2.0)];
        let values = [0.0f32, 2.0, 2.0, 4.0];

        let out = scattered_to_grid(&points, &values, &[1.0], &[1.0]).unwrap();
        assert!((out[0] - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_outside_hull_is_nan() {
        let points = [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (1.0, 1.0)];
        let values = [1.0f32; 4];

        let out = scattered_to_grid(&points, &values, &[-0.5, 0.5, 1.5], &[0.5]).unwrap();
        assert!(out[0].is_nan());
        assert!((out[1] - 1.0).abs() < 1e-6);
        assert!(out[2].is_nan());
    }

    #[test]
    fn test_missing_cell_poisons_neighbors() {
        // 2x2 layout with one corner never observed
        let points = [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)];
        let values = [1.0f32, 2.0, 3.0];

        let out = scattered_to_grid(&points, &values, &[0.5], &[0.5]).unwrap();
        assert!(out[0].is_nan());

        // But the observed points themselves still read back
        let out = scattered_to_grid(&points, &values, &[0.0, 1.0], &[0.0]).unwrap();
        assert_eq!(out, vec![1.0, 2.0]);
    }

    #[test]
    fn test_input_validation() {
        assert!(scattered_to_grid(&[], &[], &[0.0], &[0.0]).is_err());
        assert!(scattered_to_grid(&[(0.0, 0.0)], &[1.0, 2.0], &[0.0], &[0.0]).is_err());
    }
}
