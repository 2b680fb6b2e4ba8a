//! Tropospheric ozone column estimation.
//!
//! The reanalysis provides ozone mass mixing per layer and the pressure
//! thickness (DELP) of each layer, ordered top of atmosphere downward.
//! Integrating DELP from the top gives the interface pressures; a layer is
//! tropospheric when its mid-level pressure is at or below the tropopause
//! boundary in altitude (pressure >= TROPPB).

use ndarray::{Array2, Array3};

use crate::error::{KernelError, Result};

/// The DELP-weighted column integrals for one granule.
#[derive(Debug, Clone)]
pub struct OzoneColumns {
    /// Ozone integrated over tropospheric layers.
    pub tropospheric: Array2<f32>,
    /// Ozone integrated over the full column.
    pub total: Array2<f32>,
    /// tropospheric / total, exactly 0 where the total is 0.
    pub ratio: Array2<f32>,
}

/// Mid-level pressures from layer pressure thicknesses.
///
/// Interface pressure starts at 0 at the model top and accumulates DELP
/// downward; each mid-level pressure is the mean of its two interfaces.
pub fn mid_level_pressure(delp: &Array3<f32>) -> Array3<f32> {
    let (nlev, ny, nx) = delp.dim();
    let mut p_mid = Array3::<f32>::zeros((nlev, ny, nx));

    for j in 0..ny {
        for i in 0..nx {
            let mut p_above = 0.0f32;
            for k in 0..nlev {
                let p_below = p_above + delp[[k, j, i]];
                p_mid[[k, j, i]] = 0.5 * (p_above + p_below);
                p_above = p_below;
            }
        }
    }

    p_mid
}

/// Compute the tropospheric and total ozone columns and their ratio.
///
/// `o3` and `delp` are (nlev, ny, nx); `troppb` is (ny, nx) tropopause
/// pressure. NaN layers contribute nothing to either sum, and a zero total
/// column yields a ratio of exactly 0 rather than a division fault.
pub fn tropospheric_columns(
    o3: &Array3<f32>,
    delp: &Array3<f32>,
    troppb: &Array2<f32>,
) -> Result<OzoneColumns> {
    if o3.dim() != delp.dim() {
        return Err(KernelError::ShapeMismatch(format!(
            "o3 {:?} vs delp {:?}",
            o3.dim(),
            delp.dim()
        )));
    }
    let (nlev, ny, nx) = o3.dim();
    if troppb.dim() != (ny, nx) {
        return Err(KernelError::ShapeMismatch(format!(
            "troppb {:?} vs horizontal grid ({ny}, {nx})",
            troppb.dim()
        )));
    }

    let p_mid = mid_level_pressure(delp);

    let mut tropospheric = Array2::<f32>::zeros((ny, nx));
    let mut total = Array2::<f32>::zeros((ny, nx));
    let mut ratio = Array2::<f32>::zeros((ny, nx));

    for j in 0..ny {
        for i in 0..nx {
            let tropopause = troppb[[j, i]];
            let mut trop_sum = 0.0f64;
            let mut total_sum = 0.0f64;

            for k in 0..nlev {
                let weighted = o3[[k, j, i]] * delp[[k, j, i]];
                if weighted.is_nan() {
                    continue;
                }
                total_sum += weighted as f64;
                if p_mid[[k, j, i]] >= tropopause {
                    trop_sum += weighted as f64;
                }
            }

            tropospheric[[j, i]] = trop_sum as f32;
            total[[j, i]] = total_sum as f32;
            ratio[[j, i]] = if total_sum != 0.0 {
                (trop_sum / total_sum) as f32
            } else {
                0.0
            };
        }
    }

    Ok(OzoneColumns {
        tropospheric,
        total,
        ratio,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr2, Array3};

    #[test]
    fn test_mid_level_pressure_accumulates() {
        // Two layers of 100 Pa each: interfaces 0/100/200, mids 50/150
        let delp = Array3::from_elem((2, 1, 1), 100.0f32);
        let p_mid = mid_level_pressure(&delp);
        assert_eq!(p_mid[[0, 0, 0]], 50.0);
        assert_eq!(p_mid[[1, 0, 0]], 150.0);
    }

    #[test]
    fn test_ratio_splits_at_tropopause() {
        // Three layers, mids at 50/150/250; tropopause at 140 puts the two
        // lower layers (higher pressure) in the troposphere
        let delp = Array3::from_elem((3, 1, 1), 100.0f32);
        let mut o3 = Array3::<f32>::zeros((3, 1, 1));
        o3[[0, 0, 0]] = 1.0;
        o3[[1, 0, 0]] = 2.0;
        o3[[2, 0, 0]] = 3.0;
        let troppb = arr2(&[[140.0f32]]);

        let cols = tropospheric_columns(&o3, &delp, &troppb).unwrap();
        assert_eq!(cols.total[[0, 0]], 600.0);
        assert_eq!(cols.tropospheric[[0, 0]], 500.0);
        assert!((cols.ratio[[0, 0]] - 500.0 / 600.0).abs() < 1e-6);
    }

    #[test]
    fn test_zero_total_gives_zero_ratio() {
        let delp = Array3::from_elem((2, 1, 1), 100.0f32);
        let o3 = Array3::<f32>::zeros((2, 1, 1));
        let troppb = arr2(&[[150.0f32]]);

        let cols = tropospheric_columns(&o3, &delp, &troppb).unwrap();
        assert_eq!(cols.total[[0, 0]], 0.0);
        // Defined 0, never NaN
        assert_eq!(cols.ratio[[0, 0]], 0.0);
    }

    #[test]
    fn test_nan_layers_are_skipped() {
        let delp = Array3::from_elem((2, 1, 1), 100.0f32);
        let mut o3 = Array3::<f32>::zeros((2, 1, 1));
        o3[[0, 0, 0]] = f32::NAN;
        o3[[1, 0, 0]] = 2.0;
        let troppb = arr2(&[[0.0f32]]);

        let cols = tropospheric_columns(&o3, &delp, &troppb).unwrap();
        assert_eq!(cols.total[[0, 0]], 200.0);
        assert_eq!(cols.tropospheric[[0, 0]], 200.0);
        assert_eq!(cols.ratio[[0, 0]], 1.0);
    }

    #[test]
    fn test_all_nan_column_is_zero_ratio() {
        let delp = Array3::from_elem((2, 1, 1), 100.0f32);
        let o3 = Array3::from_elem((2, 1, 1), f32::NAN);
        let troppb = arr2(&[[150.0f32]]);

        let cols = tropospheric_columns(&o3, &delp, &troppb).unwrap();
        assert_eq!(cols.ratio[[0, 0]], 0.0);
    }

    #[test]
    fn test_shape_mismatch() {
        let delp = Array3::from_elem((2, 1, 1), 100.0f32);
        let o3 = Array3::<f32>::zeros((3, 1, 1));
        let troppb = arr2(&[[150.0f32]]);
        assert!(tropospheric_columns(&o3, &delp, &troppb).is_err());
    }
}
