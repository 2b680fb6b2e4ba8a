//! Flattening gridded fields to tabular records and back.
//!
//! The flattening order matches the grid write order (t outermost, then y,
//! then x), so converting a field to records and back reproduces every
//! non-missing cell exactly.

use std::path::Path;

use chrono::NaiveDate;
use ndarray::Array3;
use tracing::debug;

use atmos_common::{date_to_days, days_to_date, parse_iso_date};

use crate::error::{GridStoreError, Result};
use crate::field::GriddedField;

/// One (cell, day) observation.
#[derive(Debug, Clone, PartialEq)]
pub struct TabularRecord {
    pub date: NaiveDate,
    pub lon: f64,
    pub lat: f64,
    pub value: f32,
}

/// Flatten a field into records, one per grid cell per day.
///
/// Missing cells are kept (value NaN) so the round trip is exact.
pub fn field_to_records(field: &GriddedField) -> Vec<TabularRecord> {
    let (nt, ny, nx) = field.shape();
    let mut records = Vec::with_capacity(nt * ny * nx);

    for (k, &day) in field.t.iter().enumerate() {
        let date = days_to_date(day);
        for (j, &lat) in field.y.iter().enumerate() {
            for (i, &lon) in field.x.iter().enumerate() {
                records.push(TabularRecord {
                    date,
                    lon,
                    lat,
                    value: field.data[[k, j, i]],
                });
            }
        }
    }

    records
}

fn distinct_sorted_f64(values: impl Iterator<Item = f64>) -> Vec<f64> {
    let mut out: Vec<f64> = values.collect();
    out.sort_by(|a, b| a.total_cmp(b));
    out.dedup();
    out
}

/// Rebuild a gridded field from records.
///
/// The axes are recovered from the distinct coordinates; cells without a
/// record stay NaN.
pub fn field_from_records(name: &str, records: &[TabularRecord]) -> Result<GriddedField> {
    if records.is_empty() {
        return Err(GridStoreError::invalid_format(
            "no records to grid".to_string(),
        ));
    }

    let x = distinct_sorted_f64(records.iter().map(|r| r.lon));
    let y = distinct_sorted_f64(records.iter().map(|r| r.lat));
    let mut t: Vec<i32> = records.iter().map(|r| date_to_days(r.date)).collect();
    t.sort_unstable();
    t.dedup();

    let mut data = Array3::from_elem((t.len(), y.len(), x.len()), f32::NAN);
    for record in records {
        let day = date_to_days(record.date);
        // Coordinates came out of the same records the axes did
        let (Ok(k), Ok(j), Ok(i)) = (
            t.binary_search(&day),
            y.binary_search_by(|v| v.total_cmp(&record.lat)),
            x.binary_search_by(|v| v.total_cmp(&record.lon)),
        ) else {
            continue;
        };
        data[[k, j, i]] = record.value;
    }

    GriddedField::new(name, data, x, y, t)
}

/// Write records to CSV with the measurement column named after the field.
///
/// Column order matches the original exports: value, x, y, t (ISO date).
pub fn write_records_csv(path: &Path, value_name: &str, records: &[TabularRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record([value_name, "x", "y", "t"])?;

    for record in records {
        let value = if record.value.is_nan() {
            String::new()
        } else {
            format!("{}", record.value)
        };
        writer.write_record([
            value,
            format!("{}", record.lon),
            format!("{}", record.lat),
            record.date.format("%Y-%m-%d").to_string(),
        ])?;
    }

    writer.flush()?;
    debug!(path = %path.display(), rows = records.len(), "Wrote tabular CSV");
    Ok(())
}

/// Read records from a CSV written by [`write_records_csv`] (or the same
/// layout produced elsewhere). Empty value cells become NaN.
pub fn read_records_csv(path: &Path, value_name: &str) -> Result<Vec<TabularRecord>> {
    let mut reader = csv::Reader::from_path(path)?;

    let headers = reader.headers()?.clone();
    let col = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| GridStoreError::missing(format!("CSV column {name}")))
    };
    let value_col = col(value_name)?;
    let x_col = col("x")?;
    let y_col = col("y")?;
    let t_col = col("t")?;

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let cell = |idx: usize| row.get(idx).unwrap_or("").trim();

        let value = match cell(value_col) {
            "" => f32::NAN,
            s => s
                .parse::<f32>()
                .map_err(|_| GridStoreError::invalid_format(format!("bad value: {s}")))?,
        };
        let lon: f64 = cell(x_col)
            .parse()
            .map_err(|_| GridStoreError::invalid_format(format!("bad x: {}", cell(x_col))))?;
        let lat: f64 = cell(y_col)
            .parse()
            .map_err(|_| GridStoreError::invalid_format(format!("bad y: {}", cell(y_col))))?;
        // Dated exports may carry a trailing time component
        let date_str = cell(t_col).split_whitespace().next().unwrap_or("");
        let date = parse_iso_date(date_str)?;

        records.push(TabularRecord {
            date,
            lon,
            lat,
            value,
        });
    }

    debug!(path = %path.display(), rows = records.len(), "Read tabular CSV");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    fn sample_field() -> GriddedField {
        let mut data = Array3::from_elem((2, 2, 3), f32::NAN);
        data[[0, 0, 0]] = 1.5;
        data[[0, 1, 2]] = -0.25;
        data[[1, 0, 1]] = 3.0;
        GriddedField::new(
            "HCHO",
            data,
            vec![-46.9, -46.8, -46.7],
            vec![-24.0, -23.9],
            vec![10650, 10651],
        )
        .unwrap()
    }

    #[test]
    fn test_records_roundtrip_exact() {
        let field = sample_field();
        let records = field_to_records(&field);
        assert_eq!(records.len(), 12);

        let rebuilt = field_from_records("HCHO", &records).unwrap();
        assert_eq!(rebuilt.shape(), field.shape());
        assert_eq!(rebuilt.x, field.x);
        assert_eq!(rebuilt.y, field.y);
        assert_eq!(rebuilt.t, field.t);

        for (a, b) in field.data.iter().zip(rebuilt.data.iter()) {
            if a.is_nan() {
                assert!(b.is_nan());
            } else {
                assert_eq!(a, b);
            }
        }
    }

    #[test]
    fn test_flatten_order_x_fastest() {
        let field = sample_field();
        let records = field_to_records(&field);

        // x cycles fastest, then y, then t
        assert_eq!(records[0].lon, -46.9);
        assert_eq!(records[1].lon, -46.8);
        assert_eq!(records[3].lat, -23.9);
        assert_eq!(records[6].date, days_to_date(10651));
    }

    #[test]
    fn test_csv_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hcho.csv");

        let field = sample_field();
        let records = field_to_records(&field);
        write_records_csv(&path, "HCHO", &records).unwrap();

        let read_back = read_records_csv(&path, "HCHO").unwrap();
        assert_eq!(read_back.len(), records.len());
        for (a, b) in records.iter().zip(&read_back) {
            assert_eq!(a.date, b.date);
            assert_eq!(a.lon, b.lon);
            assert_eq!(a.lat, b.lat);
            assert!(a.value == b.value || (a.value.is_nan() && b.value.is_nan()));
        }
    }
}
