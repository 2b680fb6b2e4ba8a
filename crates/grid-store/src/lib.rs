//! Gridded-field storage for the atmospheric-chemistry pipelines.
//!
//! This crate owns the on-disk conventions every tool shares:
//!
//! - NetCDF files with `x` (degrees_east), `y` (degrees_north) and `t`
//!   (days since 1990-01-01) coordinates plus one measurement variable,
//!   NaN as the missing value;
//! - tabular CSV exports of the same cells (one row per cell, ISO dates),
//!   round-tripping exactly for non-missing values;
//! - station tables (delimited text with locale quirks) and wind-station
//!   Excel workbooks.

mod discover;
mod error;
mod excel;
mod field;
mod netcdf_io;
mod reanalysis;
mod table;
mod tabular;

pub use discover::{find_file_by_date, list_netcdf_files};
pub use error::{GridStoreError, Result};
pub use excel::{read_wind_workbook, WindObservation};
pub use field::{GridField2, GriddedField};
pub use netcdf_io::{read_field, read_field2, write_field, write_field2, FieldAttrs};
pub use reanalysis::{read_level_stack, read_surface_field, LevelStack, SurfaceField};
pub use table::Table;
pub use tabular::{
    field_from_records, field_to_records, read_records_csv, write_records_csv, TabularRecord,
};
