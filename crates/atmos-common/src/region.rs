//! Named study regions loaded from YAML configuration.
//!
//! Replaces the hard-coded bounding-box tables the workflow started with:
//! the converter and plotter take a regions file on the command line.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::bbox::BoundingBox;
use crate::error::{CommonError, Result};

/// A named region of interest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Region {
    pub name: String,
    pub bbox: BoundingBox,
}

#[derive(Debug, Deserialize)]
struct RegionsFile {
    regions: Vec<Region>,
}

/// Load a region list from a YAML file.
///
/// Expected layout:
/// ```yaml
/// regions:
///   - name: MASP
///     bbox: { min_lon: -46.88, min_lat: -24.08, max_lon: -46.18, max_lat: -23.38 }
/// ```
pub fn load_regions(path: &Path) -> Result<Vec<Region>> {
    let content = std::fs::read_to_string(path)?;
    let file: RegionsFile = serde_yaml::from_str(&content)?;

    if file.regions.is_empty() {
        return Err(CommonError::InvalidConfig(format!(
            "no regions defined in {}",
            path.display()
        )));
    }

    debug!(count = file.regions.len(), path = %path.display(), "Loaded regions");
    Ok(file.regions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_regions_yaml() {
        let yaml = r#"
regions:
  - name: MASP
    bbox: { min_lon: -46.88, min_lat: -24.08, max_lon: -46.18, max_lat: -23.38 }
  - name: SANTOS
    bbox: { min_lon: -46.35, min_lat: -24.03, max_lon: -46.25, max_lat: -23.93 }
"#;
        let file: RegionsFile = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(file.regions.len(), 2);
        assert_eq!(file.regions[0].name, "MASP");
        assert!(file.regions[1].bbox.contains(-46.3, -23.98));
    }
}
