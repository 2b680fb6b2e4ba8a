//! Value-to-color mapping over gradient stops.

use crate::error::{ChartError, Result};
use crate::style::hex_to_rgb;

/// A gradient colormap over normalized [0, 1] positions.
#[derive(Debug, Clone)]
pub struct ColorMap {
    stops: Vec<(f64, (u8, u8, u8))>,
}

impl ColorMap {
    /// Build a colormap from evenly spaced hex stops.
    pub fn from_hex_stops(stops: &[&str]) -> Result<Self> {
        if stops.len() < 2 {
            return Err(ChartError::InvalidStyle(
                "a colormap needs at least 2 stops".to_string(),
            ));
        }
        let last = (stops.len() - 1) as f64;
        let stops = stops
            .iter()
            .enumerate()
            .map(|(i, hex)| Ok((i as f64 / last, hex_to_rgb(hex)?)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { stops })
    }

    /// The reversed Spectral map used for the ozone scatter figures
    /// (blue = low, red = high).
    pub fn spectral_reversed() -> Self {
        // Stops taken from the Spectral palette, reversed
        Self::from_hex_stops(&[
            "#5e4fa2", "#3288bd", "#66c2a5", "#abdda4", "#e6f598", "#ffffbf", "#fee08b",
            "#fdae61", "#f46d43", "#d53e4f", "#9e0142",
        ])
        .expect("static stops are valid")
    }

    /// Sample at a normalized position (clamped to [0, 1]).
    pub fn sample(&self, t: f64) -> (u8, u8, u8) {
        let t = t.clamp(0.0, 1.0);

        let mut lower = self.stops[0];
        for &upper in &self.stops[1..] {
            if t <= upper.0 {
                let span = upper.0 - lower.0;
                let f = if span == 0.0 { 0.0 } else { (t - lower.0) / span };
                let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * f).round() as u8;
                return (
                    lerp(lower.1 .0, upper.1 .0),
                    lerp(lower.1 .1, upper.1 .1),
                    lerp(lower.1 .2, upper.1 .2),
                );
            }
            lower = upper;
        }
        lower.1
    }

    /// Map a data value onto the gradient given display limits, as a hex
    /// color string. NaN maps to a neutral gray.
    pub fn color_for(&self, value: f64, vmin: f64, vmax: f64) -> String {
        if value.is_nan() || vmax <= vmin {
            return "#bbbbbb".to_string();
        }
        let (r, g, b) = self.sample((value - vmin) / (vmax - vmin));
        format!("#{r:02x}{g:02x}{b:02x}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints() {
        let map = ColorMap::from_hex_stops(&["#000000", "#ffffff"]).unwrap();
        assert_eq!(map.sample(0.0), (0, 0, 0));
        assert_eq!(map.sample(1.0), (255, 255, 255));
        assert_eq!(map.sample(0.5), (128, 128, 128));
    }

    #[test]
    fn test_clamping_and_nan() {
        let map = ColorMap::from_hex_stops(&["#000000", "#ffffff"]).unwrap();
        assert_eq!(map.sample(-1.0), (0, 0, 0));
        assert_eq!(map.sample(2.0), (255, 255, 255));
        assert_eq!(map.color_for(f64::NAN, 0.0, 1.0), "#bbbbbb");
    }

    #[test]
    fn test_spectral_orientation() {
        let map = ColorMap::spectral_reversed();
        // Low values are cool (blue-ish), high values warm (red-ish)
        let (r_lo, _, b_lo) = map.sample(0.05);
        let (r_hi, _, b_hi) = map.sample(0.95);
        assert!(b_lo > r_lo);
        assert!(r_hi > b_hi);
    }
}
