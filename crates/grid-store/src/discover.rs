//! Data-directory discovery.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use walkdir::WalkDir;

use crate::error::Result;

/// Recursively list NetCDF files under a directory, sorted by path.
pub fn list_netcdf_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir) {
        let entry = entry.map_err(std::io::Error::from)?;
        if entry.file_type().is_file()
            && entry.path().extension().map_or(false, |ext| ext == "nc")
        {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

/// Find the reanalysis granule for a date: the file whose name ends with
/// `<YYYYMMDD>.SUB.nc`. Returns None when no companion exists (the caller
/// skips that day).
pub fn find_file_by_date(dir: &Path, date: NaiveDate) -> Option<PathBuf> {
    let suffix = format!("{}.SUB.nc", date.format("%Y%m%d"));
    let entries = std::fs::read_dir(dir).ok()?;

    for entry in entries.flatten() {
        let path = entry.path();
        if path
            .file_name()
            .and_then(|n| n.to_str())
            .map_or(false, |n| n.ends_with(&suffix))
        {
            return Some(path);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    #[test]
    fn test_list_netcdf_files_recursive() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("2019")).unwrap();
        File::create(dir.path().join("b.nc")).unwrap();
        File::create(dir.path().join("2019/a.nc")).unwrap();
        File::create(dir.path().join("notes.txt")).unwrap();

        let files = list_netcdf_files(dir.path()).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("2019/a.nc"));
    }

    #[test]
    fn test_find_file_by_date() {
        let dir = tempfile::tempdir().unwrap();
        File::create(
            dir.path()
                .join("MERRA2_400.tavg3_3d_asm_Nv.20230115.SUB.nc"),
        )
        .unwrap();

        let date = NaiveDate::from_ymd_opt(2023, 1, 15).unwrap();
        assert!(find_file_by_date(dir.path(), date).is_some());

        let missing = NaiveDate::from_ymd_opt(2023, 1, 16).unwrap();
        assert!(find_file_by_date(dir.path(), missing).is_none());
    }
}
