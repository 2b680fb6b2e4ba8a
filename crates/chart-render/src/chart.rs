//! Chart panel primitives.
//!
//! A `Panel` is one plot area inside a figure: a pixel rectangle plus the
//! data→pixel scales. Figures place one or more panels on an `SvgDocument`
//! and draw series through them.

use crate::axis::Scale;
use crate::colormap::ColorMap;
use crate::style::PlotStyle;
use crate::svg::SvgDocument;

/// One plot area with its scales.
#[derive(Debug, Clone)]
pub struct Panel {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub x: Scale,
    pub y: Scale,
}

impl Panel {
    /// Create a panel; the y scale is inverted for SVG pixel space.
    pub fn new(
        left: f64,
        top: f64,
        width: f64,
        height: f64,
        x_domain: (f64, f64),
        y_domain: (f64, f64),
    ) -> Self {
        Self {
            left,
            top,
            width,
            height,
            x: Scale::new(x_domain, (left, left + width)),
            y: Scale::new(y_domain, (top + height, top)),
        }
    }

    /// Draw the four spines.
    pub fn frame(&self, doc: &mut SvgDocument, style: &PlotStyle) {
        doc.rect(
            self.left,
            self.top,
            self.width,
            self.height,
            "none",
            &style.axis_color,
            style.spine_width,
        );
    }

    /// Horizontal dashed grid lines at the given y values.
    pub fn grid_y(&self, doc: &mut SvgDocument, style: &PlotStyle, ticks: &[f64]) {
        for &tick in ticks {
            let py = self.y.to_pixel(tick);
            doc.dashed_line(
                self.left,
                py,
                self.left + self.width,
                py,
                &style.grid_color,
                0.8,
                "4,4",
            );
        }
    }

    /// Tick marks and labels along the bottom spine.
    pub fn x_ticks(
        &self,
        doc: &mut SvgDocument,
        style: &PlotStyle,
        ticks: &[(f64, String)],
        show_labels: bool,
    ) {
        let base = self.top + self.height;
        for (value, label) in ticks {
            let px = self.x.to_pixel(*value);
            doc.line(px, base, px, base + 5.0, &style.axis_color, style.spine_width);
            if show_labels {
                doc.text(
                    px,
                    base + 8.0 + style.font_size,
                    label,
                    &style.font_family,
                    style.font_size,
                    &style.axis_color,
                    "middle",
                    "normal",
                );
            }
        }
    }

    /// Tick marks and labels along the left spine.
    pub fn y_ticks(
        &self,
        doc: &mut SvgDocument,
        style: &PlotStyle,
        ticks: &[(f64, String)],
        show_labels: bool,
    ) {
        for (value, label) in ticks {
            let py = self.y.to_pixel(*value);
            doc.line(
                self.left - 5.0,
                py,
                self.left,
                py,
                &style.axis_color,
                style.spine_width,
            );
            if show_labels {
                doc.text(
                    self.left - 9.0,
                    py + style.font_size * 0.35,
                    label,
                    &style.font_family,
                    style.font_size,
                    &style.axis_color,
                    "end",
                    "normal",
                );
            }
        }
    }

    /// Vertical bars centered on data x positions. `bar_width` is in data
    /// units; bars rise (or drop) from y = baseline.
    #[allow(clippy::too_many_arguments)]
    pub fn bars(
        &self,
        doc: &mut SvgDocument,
        values: &[(f64, f64)],
        bar_width: f64,
        baseline: f64,
        fill: &str,
        edge: &str,
        edge_width: f64,
    ) {
        let base_py = self.y.to_pixel(baseline);
        for &(cx, value) in values {
            if value.is_nan() {
                continue;
            }
            let x0 = self.x.to_pixel(cx - bar_width / 2.0);
            let x1 = self.x.to_pixel(cx + bar_width / 2.0);
            let py = self.y.to_pixel(value);
            let (top, height) = if py <= base_py {
                (py, base_py - py)
            } else {
                (base_py, py - base_py)
            };
            doc.rect(x0, top, x1 - x0, height, fill, edge, edge_width);
        }
    }

    /// A polyline through finite data points.
    pub fn line(&self, doc: &mut SvgDocument, points: &[(f64, f64)], stroke: &str, width: f64) {
        let pixels: Vec<(f64, f64)> = points
            .iter()
            .filter(|(px, py)| px.is_finite() && py.is_finite())
            .map(|&(px, py)| (self.x.to_pixel(px), self.y.to_pixel(py)))
            .collect();
        if pixels.len() >= 2 {
            doc.polyline(&pixels, stroke, width);
        }
    }

    /// Markers at data points, one fill color for all.
    pub fn scatter(&self, doc: &mut SvgDocument, points: &[(f64, f64)], radius: f64, fill: &str) {
        for &(px, py) in points {
            if px.is_finite() && py.is_finite() {
                doc.circle(self.x.to_pixel(px), self.y.to_pixel(py), radius, fill);
            }
        }
    }

    /// Markers colored per point through a colormap.
    #[allow(clippy::too_many_arguments)]
    pub fn scatter_colored(
        &self,
        doc: &mut SvgDocument,
        points: &[(f64, f64, f64)],
        radius: f64,
        map: &ColorMap,
        vmin: f64,
        vmax: f64,
    ) {
        for &(px, py, value) in points {
            if px.is_finite() && py.is_finite() {
                let fill = map.color_for(value, vmin, vmax);
                doc.circle(self.x.to_pixel(px), self.y.to_pixel(py), radius, &fill);
            }
        }
    }

    /// Vertical error bars around (x, y ± err).
    pub fn error_bars(
        &self,
        doc: &mut SvgDocument,
        points: &[(f64, f64, f64)],
        stroke: &str,
        width: f64,
    ) {
        for &(px, py, err) in points {
            if !(px.is_finite() && py.is_finite() && err.is_finite()) {
                continue;
            }
            let cx = self.x.to_pixel(px);
            doc.line(
                cx,
                self.y.to_pixel(py - err),
                cx,
                self.y.to_pixel(py + err),
                stroke,
                width,
            );
        }
    }

    /// A filled band between lower and upper curves sampled at `xs`.
    #[allow(clippy::too_many_arguments)]
    pub fn band(
        &self,
        doc: &mut SvgDocument,
        xs: &[f64],
        lower: &[f64],
        upper: &[f64],
        fill: &str,
        opacity: f64,
    ) {
        let mut points = Vec::with_capacity(xs.len() * 2);
        for (x, y) in xs.iter().zip(upper) {
            if x.is_finite() && y.is_finite() {
                points.push((self.x.to_pixel(*x), self.y.to_pixel(*y)));
            }
        }
        for (x, y) in xs.iter().zip(lower).rev() {
            if x.is_finite() && y.is_finite() {
                points.push((self.x.to_pixel(*x), self.y.to_pixel(*y)));
            }
        }
        if points.len() >= 3 {
            doc.polygon(&points, fill, opacity);
        }
    }

    /// A full-height vertical reference line at a data x position.
    pub fn vline(&self, doc: &mut SvgDocument, x: f64, stroke: &str, width: f64) {
        let px = self.x.to_pixel(x);
        doc.line(px, self.top, px, self.top + self.height, stroke, width);
    }

    /// Text placed at axes-fraction coordinates (0,0 = bottom left).
    #[allow(clippy::too_many_arguments)]
    pub fn annotation(
        &self,
        doc: &mut SvgDocument,
        style: &PlotStyle,
        fx: f64,
        fy: f64,
        content: &str,
        size: f64,
        weight: &str,
    ) {
        doc.text(
            self.left + fx * self.width,
            self.top + (1.0 - fy) * self.height,
            content,
            &style.font_family,
            size,
            &style.axis_color,
            "start",
            weight,
        );
    }
}

/// A vertical colorbar legend next to a panel.
#[allow(clippy::too_many_arguments)]
pub fn draw_colorbar(
    doc: &mut SvgDocument,
    style: &PlotStyle,
    left: f64,
    top: f64,
    width: f64,
    height: f64,
    map: &ColorMap,
    vmin: f64,
    vmax: f64,
    ticks: &[f64],
    label: &str,
) {
    // Stack thin horizontal slices, high values at the top
    let steps = 120usize;
    let slice = height / steps as f64;
    for i in 0..steps {
        let t = 1.0 - i as f64 / (steps - 1) as f64;
        let (r, g, b) = map.sample(t);
        doc.rect(
            left,
            top + i as f64 * slice,
            width,
            slice + 0.5,
            &format!("#{r:02x}{g:02x}{b:02x}"),
            "none",
            0.0,
        );
    }
    doc.rect(left, top, width, height, "none", &style.axis_color, 1.5);

    for &tick in ticks {
        if vmax <= vmin {
            break;
        }
        let f = (tick - vmin) / (vmax - vmin);
        let py = top + (1.0 - f) * height;
        doc.line(left + width, py, left + width + 4.0, py, &style.axis_color, 1.5);
        doc.text(
            left + width + 7.0,
            py + style.font_size * 0.35,
            &crate::axis::format_tick(tick),
            &style.font_family,
            style.font_size,
            &style.axis_color,
            "start",
            "normal",
        );
    }

    doc.rotated_text(
        left + width + 48.0,
        top + height / 2.0,
        90.0,
        label,
        &style.font_family,
        style.font_size,
        &style.axis_color,
        "middle",
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panel_scales() {
        let panel = Panel::new(50.0, 20.0, 200.0, 100.0, (0.0, 10.0), (0.0, 1.0));
        assert_eq!(panel.x.to_pixel(0.0), 50.0);
        assert_eq!(panel.x.to_pixel(10.0), 250.0);
        // y inverted: data max at panel top
        assert_eq!(panel.y.to_pixel(1.0), 20.0);
        assert_eq!(panel.y.to_pixel(0.0), 120.0);
    }

    #[test]
    fn test_bars_skip_nan() {
        let panel = Panel::new(0.0, 0.0, 100.0, 100.0, (0.0, 4.0), (0.0, 10.0));
        let mut doc = SvgDocument::new(100.0, 100.0);
        let style = PlotStyle::default();
        panel.frame(&mut doc, &style);
        panel.bars(
            &mut doc,
            &[(1.0, 5.0), (2.0, f64::NAN), (3.0, 2.0)],
            0.6,
            0.0,
            "#005f73",
            "#000000",
            0.7,
        );

        let svg = doc.finish();
        // Frame plus two bars, the NaN one dropped
        assert_eq!(svg.matches("<rect").count(), 3);
    }

    #[test]
    fn test_line_filters_nonfinite() {
        let panel = Panel::new(0.0, 0.0, 100.0, 100.0, (0.0, 2.0), (0.0, 2.0));
        let mut doc = SvgDocument::new(100.0, 100.0);
        panel.line(
            &mut doc,
            &[(0.0, 1.0), (1.0, f64::NAN), (2.0, 2.0)],
            "#f00",
            1.0,
        );
        let svg = doc.finish();
        assert_eq!(svg.matches("<polyline").count(), 1);
    }
}
