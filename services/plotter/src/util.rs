//! Shared helpers for the figure pipelines.

use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::{Datelike, NaiveDate};

use atmos_common::parse_iso_date;
use chart_render::PlotStyle;
use grid_store::Table;

/// Resolve the figure style: YAML file when given, defaults otherwise.
pub fn load_style(path: Option<&Path>) -> Result<PlotStyle> {
    match path {
        Some(path) => Ok(PlotStyle::from_file(path)?),
        None => Ok(PlotStyle::default()),
    }
}

/// SVG and PNG paths for a figure base name inside a directory.
pub fn figure_paths(dir: &Path, stem: &str) -> (PathBuf, PathBuf) {
    (
        dir.join(format!("{stem}.svg")),
        dir.join(format!("{stem}.png")),
    )
}

/// A wide time series: one date column plus one value column per region.
pub struct WideSeries {
    pub dates: Vec<NaiveDate>,
    pub columns: Vec<(String, Vec<f64>)>,
}

/// Parse a wide CSV with a `day` date column (the site-series layout).
pub fn read_wide_series(path: &Path) -> Result<WideSeries> {
    let table = Table::read(path)?;

    let day_strings = table.column_str("day")?;
    let mut dates = Vec::with_capacity(day_strings.len());
    for s in day_strings {
        dates.push(parse_iso_date(s)?);
    }

    let mut columns = Vec::new();
    for name in table.value_columns(&["day", "year"]) {
        let values = table.column_f64(&name)?;
        columns.push((name, values));
    }

    Ok(WideSeries { dates, columns })
}

impl WideSeries {
    /// Scale every value column in place.
    pub fn scale_values(&mut self, factor: f64) {
        for (_, values) in &mut self.columns {
            for v in values.iter_mut() {
                *v *= factor;
            }
        }
    }

    /// Years covered by the series, ascending.
    pub fn years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self.dates.iter().map(|d| d.year()).collect();
        years.sort_unstable();
        years.dedup();
        years
    }
}

/// Region labels use underscores in the CSV headers.
pub fn display_label(raw: &str) -> String {
    raw.replace('_', " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_read_wide_series() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wide.csv");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "day,MASP,SANTOS").unwrap();
        writeln!(f, "2019-01-01,1.0,").unwrap();
        writeln!(f, "2020-01-02,2.0,3.0").unwrap();

        let series = read_wide_series(&path).unwrap();
        assert_eq!(series.dates.len(), 2);
        assert_eq!(series.columns.len(), 2);
        assert!(series.columns[1].1[0].is_nan());
        assert_eq!(series.years(), vec![2019, 2020]);
    }

    #[test]
    fn test_display_label() {
        assert_eq!(display_label("PARQUE_DOM_PEDRO_II"), "PARQUE DOM PEDRO II");
    }
}
