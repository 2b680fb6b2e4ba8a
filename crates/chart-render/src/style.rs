//! Figure style configuration.
//!
//! Replaces the hard-coded font/color tables of the original figures with
//! an explicit structure, optionally loaded from YAML and passed to each
//! figure builder.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ChartError, Result};

/// Style parameters shared by every figure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotStyle {
    /// Font family used for every label.
    pub font_family: String,
    /// Base tick/annotation size (px).
    pub font_size: f64,
    /// Panel title size (px).
    pub title_size: f64,
    /// Axis/spine color.
    pub axis_color: String,
    /// Spine and tick stroke width.
    pub spine_width: f64,
    /// Default data line width.
    pub line_width: f64,
    /// Categorical palette, cycled per series.
    pub palette: Vec<String>,
    /// Figure background.
    pub background: String,
    /// Grid line color.
    pub grid_color: String,
}

impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            font_family: "sans-serif".to_string(),
            font_size: 14.0,
            title_size: 18.0,
            axis_color: "#000000".to_string(),
            spine_width: 2.0,
            line_width: 3.0,
            palette: vec![
                "#005f73".to_string(),
                "#0a9396".to_string(),
                "#94d2bd".to_string(),
                "#e9d8a6".to_string(),
                "#ee9b00".to_string(),
                "#ca6702".to_string(),
                "#bb3e03".to_string(),
                "#9d0208".to_string(),
                "#6a040f".to_string(),
            ],
            background: "#ffffff".to_string(),
            grid_color: "#d0d0d0".to_string(),
        }
    }
}

impl PlotStyle {
    /// Load a style from a YAML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&content)?)
    }

    /// Palette color for a series index, cycling.
    pub fn series_color(&self, index: usize) -> &str {
        if self.palette.is_empty() {
            return &self.axis_color;
        }
        &self.palette[index % self.palette.len()]
    }
}

/// Parse a `#rrggbb` hex color.
pub fn hex_to_rgb(hex: &str) -> Result<(u8, u8, u8)> {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 {
        return Err(ChartError::InvalidStyle(format!("bad hex color: #{hex}")));
    }

    let parse = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&hex[range], 16)
            .map_err(|_| ChartError::InvalidStyle(format!("bad hex color: #{hex}")))
    };
    Ok((parse(0..2)?, parse(2..4)?, parse(4..6)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_to_rgb() {
        assert_eq!(hex_to_rgb("#005f73").unwrap(), (0, 95, 115));
        assert_eq!(hex_to_rgb("ffffff").unwrap(), (255, 255, 255));
        assert!(hex_to_rgb("#12345").is_err());
        assert!(hex_to_rgb("#zzzzzz").is_err());
    }

    #[test]
    fn test_palette_cycles() {
        let style = PlotStyle::default();
        assert_eq!(style.series_color(0), "#005f73");
        assert_eq!(style.series_color(9), "#005f73");
    }

    #[test]
    fn test_style_yaml_roundtrip() {
        let yaml = r##"
font_family: "SF Pro Display"
font_size: 18
palette: ["#1E40AF"]
"##;
        let style: PlotStyle = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(style.font_family, "SF Pro Display");
        assert_eq!(style.font_size, 18.0);
        // Unset fields keep defaults
        assert_eq!(style.background, "#ffffff");
    }
}
