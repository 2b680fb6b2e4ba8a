//! Generic delimited tables (station exports, derived statistics).
//!
//! The station CSVs come from several national providers and disagree on
//! delimiter (comma vs semicolon), decimal separator, and encoding (UTF-8
//! vs Latin-1). This reader normalizes all of that and leaves typed access
//! to the caller.

use std::path::Path;

use tracing::debug;

use crate::error::{GridStoreError, Result};

/// A delimited table held as strings, with typed column accessors.
#[derive(Debug, Clone)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

fn decode_lossy(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        // Latin-1: every byte maps directly to the code point
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

fn sniff_delimiter(header_line: &str) -> u8 {
    let semis = header_line.matches(';').count();
    let commas = header_line.matches(',').count();
    if semis >= commas && semis > 0 {
        b';'
    } else {
        b','
    }
}

impl Table {
    /// Read a delimited table, auto-detecting delimiter and encoding.
    pub fn read(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let content = decode_lossy(&bytes);

        let first_line = content.lines().next().unwrap_or("");
        let delimiter = sniff_delimiter(first_line);

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .flexible(true)
            .from_reader(content.as_bytes());

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for row in reader.records() {
            let row = row?;
            rows.push(row.iter().map(|c| c.trim().to_string()).collect());
        }

        debug!(
            path = %path.display(),
            columns = headers.len(),
            rows = rows.len(),
            delimiter = delimiter as char,
            "Read table"
        );
        Ok(Self { headers, rows })
    }

    /// Column headers.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a named column.
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .ok_or_else(|| GridStoreError::missing(format!("table column {name}")))
    }

    /// A column of raw strings.
    pub fn column_str(&self, name: &str) -> Result<Vec<&str>> {
        let idx = self.column_index(name)?;
        Ok(self
            .rows
            .iter()
            .map(|r| r.get(idx).map(|s| s.as_str()).unwrap_or(""))
            .collect())
    }

    /// A numeric column; unparseable or empty cells become NaN.
    /// Decimal commas are accepted.
    pub fn column_f64(&self, name: &str) -> Result<Vec<f64>> {
        let idx = self.column_index(name)?;
        Ok(self
            .rows
            .iter()
            .map(|r| parse_locale_f64(r.get(idx).map(|s| s.as_str()).unwrap_or("")))
            .collect())
    }

    /// Column names other than the given ones (used to discover the
    /// per-region value columns of the wide site exports).
    pub fn value_columns(&self, exclude: &[&str]) -> Vec<String> {
        self.headers
            .iter()
            .filter(|h| !exclude.iter().any(|e| h.eq_ignore_ascii_case(e)))
            .cloned()
            .collect()
    }
}

/// Parse a float that may use a decimal comma. Empty or bad cells → NaN.
pub fn parse_locale_f64(cell: &str) -> f64 {
    let cell = cell.trim();
    if cell.is_empty() {
        return f64::NAN;
    }
    match cell.parse::<f64>() {
        Ok(v) => v,
        Err(_) => cell.replace(',', ".").parse::<f64>().unwrap_or(f64::NAN),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(content: &[u8]) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.csv");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(content).unwrap();
        (dir, path)
    }

    #[test]
    fn test_semicolon_and_decimal_comma() {
        let (_dir, path) = write_temp(b"year;month;day;temp\n2019;1;15;23,4\n2019;1;16;\n");
        let table = Table::read(&path).unwrap();

        assert_eq!(table.len(), 2);
        let temp = table.column_f64("temp").unwrap();
        assert!((temp[0] - 23.4).abs() < 1e-9);
        assert!(temp[1].is_nan());
    }

    #[test]
    fn test_comma_delimited() {
        let (_dir, path) = write_temp(b"day,MASP,SANTOS\n2019-01-01,1.5,2.5\n");
        let table = Table::read(&path).unwrap();

        assert_eq!(table.headers(), &["day", "MASP", "SANTOS"]);
        assert_eq!(table.value_columns(&["day"]), vec!["MASP", "SANTOS"]);
    }

    #[test]
    fn test_latin1_fallback() {
        // "mês" encoded as Latin-1 (0xEA = ê)
        let (_dir, path) = write_temp(b"ano;m\xeas;dia\n2020;7;1\n");
        let table = Table::read(&path).unwrap();
        assert_eq!(table.headers()[1], "mês");
    }

    #[test]
    fn test_missing_column() {
        let (_dir, path) = write_temp(b"a,b\n1,2\n");
        let table = Table::read(&path).unwrap();
        assert!(table.column_f64("c").is_err());
    }
}
