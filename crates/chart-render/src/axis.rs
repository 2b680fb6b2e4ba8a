//! Axis scaling and tick layout.

/// A linear mapping from a data domain to a pixel range.
///
/// The pixel range may be inverted (SVG y grows downward).
#[derive(Debug, Clone, Copy)]
pub struct Scale {
    pub domain: (f64, f64),
    pub range: (f64, f64),
}

impl Scale {
    /// Create a scale; a degenerate domain is widened slightly so the
    /// mapping stays finite.
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        let domain = if domain.0 == domain.1 {
            (domain.0 - 0.5, domain.1 + 0.5)
        } else {
            domain
        };
        Self { domain, range }
    }

    /// Map a data value to a pixel coordinate.
    pub fn to_pixel(&self, value: f64) -> f64 {
        let f = (value - self.domain.0) / (self.domain.1 - self.domain.0);
        self.range.0 + f * (self.range.1 - self.range.0)
    }
}

/// Round tick positions covering [min, max] at a step of 1/2/5 × 10^k.
pub fn nice_ticks(min: f64, max: f64, target: usize) -> Vec<f64> {
    if !(min.is_finite() && max.is_finite()) || max <= min || target == 0 {
        return Vec::new();
    }

    let raw_step = (max - min) / target as f64;
    let magnitude = 10f64.powf(raw_step.log10().floor());
    let residual = raw_step / magnitude;
    let step = if residual <= 1.5 {
        magnitude
    } else if residual <= 3.5 {
        2.0 * magnitude
    } else if residual <= 7.5 {
        5.0 * magnitude
    } else {
        10.0 * magnitude
    };

    let first = (min / step).ceil() * step;
    let mut ticks = Vec::new();
    let mut tick = first;
    // Half-step tolerance absorbs accumulated float error at the top end
    while tick <= max + step * 1e-9 {
        ticks.push(tick);
        tick += step;
    }
    ticks
}

/// Format a tick label, trimming trailing zeros.
pub fn format_tick(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    let abs = value.abs();
    if abs >= 1e5 || abs < 1e-3 {
        return format!("{value:e}");
    }

    let formatted = if abs >= 100.0 {
        format!("{value:.0}")
    } else if abs >= 1.0 {
        format!("{value:.1}")
    } else {
        format!("{value:.2}")
    };
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_maps_linearly() {
        let scale = Scale::new((0.0, 10.0), (100.0, 200.0));
        assert_eq!(scale.to_pixel(0.0), 100.0);
        assert_eq!(scale.to_pixel(10.0), 200.0);
        assert_eq!(scale.to_pixel(5.0), 150.0);
    }

    #[test]
    fn test_inverted_range() {
        // SVG y axis: larger data values sit higher (smaller pixel y)
        let scale = Scale::new((0.0, 1.0), (300.0, 50.0));
        assert_eq!(scale.to_pixel(0.0), 300.0);
        assert_eq!(scale.to_pixel(1.0), 50.0);
    }

    #[test]
    fn test_degenerate_domain() {
        let scale = Scale::new((5.0, 5.0), (0.0, 100.0));
        let px = scale.to_pixel(5.0);
        assert!(px.is_finite());
    }

    #[test]
    fn test_nice_ticks() {
        let ticks = nice_ticks(0.0, 10.0, 5);
        assert_eq!(ticks, vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0]);

        let ticks = nice_ticks(0.0, 0.4, 4);
        assert_eq!(ticks.len(), 5);
        assert!((ticks[1] - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_format_tick() {
        assert_eq!(format_tick(0.0), "0");
        assert_eq!(format_tick(2.0), "2");
        assert_eq!(format_tick(0.25), "0.25");
        assert_eq!(format_tick(1013.0), "1013");
    }
}
