//! Grid resampling and interpolation kernels.
//!
//! Everything operates on row-major `f32` slabs with NaN as the missing
//! value. Points that fall outside the source data (or touch a missing
//! corner) interpolate to NaN; there is no extrapolation policy.

mod axes;
mod error;
mod sample;
mod scattered;

pub use axes::{regrid, sample_at, Axis};
pub use error::{RegridError, Result};
pub use sample::{bilinear_interpolate, nearest_interpolate};
pub use scattered::scattered_to_grid;
