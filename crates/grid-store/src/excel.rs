//! Wind-station Excel workbook reading.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use tracing::debug;

use crate::error::{GridStoreError, Result};

/// One wind observation: direction (degrees) and speed (m/s).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindObservation {
    pub direction: f64,
    pub speed: f64,
}

fn cell_f64(cell: &Data) -> Option<f64> {
    match cell {
        Data::Float(v) => Some(*v),
        Data::Int(v) => Some(*v as f64),
        Data::String(s) => s.trim().replace(',', ".").parse().ok(),
        _ => None,
    }
}

/// Read DIRECTION/SPEED pairs from the first sheet of a workbook.
///
/// Rows with a missing or unparseable cell are dropped.
pub fn read_wind_workbook(path: &Path) -> Result<Vec<WindObservation>> {
    let mut workbook =
        open_workbook_auto(path).map_err(|e| GridStoreError::Workbook(e.to_string()))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| GridStoreError::Workbook("workbook has no sheets".to_string()))?;
    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| GridStoreError::Workbook(e.to_string()))?;

    let mut rows = range.rows();
    let header = rows
        .next()
        .ok_or_else(|| GridStoreError::Workbook("workbook sheet is empty".to_string()))?;

    let position = |name: &str| {
        header.iter().position(|c| {
            matches!(c, Data::String(s) if s.trim().eq_ignore_ascii_case(name))
        })
    };
    let dir_col = position("DIRECTION")
        .ok_or_else(|| GridStoreError::missing("DIRECTION column".to_string()))?;
    let speed_col =
        position("SPEED").ok_or_else(|| GridStoreError::missing("SPEED column".to_string()))?;

    let mut observations = Vec::new();
    for row in rows {
        let direction = row.get(dir_col).and_then(cell_f64);
        let speed = row.get(speed_col).and_then(cell_f64);
        if let (Some(direction), Some(speed)) = (direction, speed) {
            observations.push(WindObservation { direction, speed });
        }
    }

    debug!(path = %path.display(), count = observations.len(), sheet = %sheet_name, "Read wind workbook");
    Ok(observations)
}
