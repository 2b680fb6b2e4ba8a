//! Numeric kernels for the derived atmospheric quantities.
//!
//! The two physical derivations (tropospheric ozone scaling, boundary-layer
//! mixing ratios) live here as pure array functions, together with the small
//! statistics toolbox the figures use. Numeric edge cases never raise: zero
//! total columns give a ratio of exactly 0, zero air masses give NaN.

mod error;
mod ozone;
mod pbl;
mod stats;

pub use error::{KernelError, Result};
pub use ozone::{mid_level_pressure, tropospheric_columns, OzoneColumns};
pub use pbl::{mixing_ratio_ppbv, AirMass, AVOGADRO, GAS_CONSTANT};
pub use stats::{
    cubic_spline_interp, histogram_counts, linear_regression, polyfit, polyval, student_t_975,
    wind_sector_frequencies, LinearFit, Spline,
};
