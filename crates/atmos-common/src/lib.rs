//! Shared conventions for the atmospheric-chemistry pipelines.
//!
//! Everything the individual tools agree on lives here: geographic bounding
//! boxes, named study regions, the integer time axis (days since
//! 1990-01-01), season classification, and explicit column-unit selection.

mod bbox;
mod error;
mod region;
mod season;
mod time;
mod units;

pub use bbox::BoundingBox;
pub use error::{CommonError, Result};
pub use region::{load_regions, Region};
pub use season::Season;
pub use time::{date_to_days, days_to_date, parse_iso_date, EPOCH};
pub use units::ColumnUnit;
