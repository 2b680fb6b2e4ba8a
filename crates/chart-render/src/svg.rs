//! Minimal SVG document builder.
//!
//! Elements are accumulated as strings; coordinates are written with three
//! decimals which is plenty at figure scale.

use std::fmt::Write as _;
use std::path::Path;

use crate::error::Result;

/// An SVG document under construction.
#[derive(Debug, Clone)]
pub struct SvgDocument {
    width: f64,
    height: f64,
    elements: Vec<String>,
}

fn fmt_coord(v: f64) -> String {
    format!("{v:.3}")
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

impl SvgDocument {
    /// Start a document of the given pixel size.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            elements: Vec::new(),
        }
    }

    /// Document width in pixels.
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Document height in pixels.
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Solid background rectangle covering the document.
    pub fn background(&mut self, fill: &str) {
        let w = self.width;
        let h = self.height;
        self.rect(0.0, 0.0, w, h, fill, "none", 0.0);
    }

    /// A rectangle with fill and stroke.
    pub fn rect(&mut self, x: f64, y: f64, w: f64, h: f64, fill: &str, stroke: &str, stroke_width: f64) {
        self.elements.push(format!(
            r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{}" stroke="{}" stroke-width="{}"/>"#,
            fmt_coord(x),
            fmt_coord(y),
            fmt_coord(w),
            fmt_coord(h),
            fill,
            stroke,
            fmt_coord(stroke_width),
        ));
    }

    /// A straight line segment.
    pub fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, stroke: &str, width: f64) {
        self.elements.push(format!(
            r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{}" stroke-width="{}"/>"#,
            fmt_coord(x1),
            fmt_coord(y1),
            fmt_coord(x2),
            fmt_coord(y2),
            stroke,
            fmt_coord(width),
        ));
    }

    /// A dashed line segment.
    pub fn dashed_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, stroke: &str, width: f64, dash: &str) {
        self.elements.push(format!(
            r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{}" stroke-width="{}" stroke-dasharray="{}"/>"#,
            fmt_coord(x1),
            fmt_coord(y1),
            fmt_coord(x2),
            fmt_coord(y2),
            stroke,
            fmt_coord(width),
            dash,
        ));
    }

    /// An open polyline through the given points.
    pub fn polyline(&mut self, points: &[(f64, f64)], stroke: &str, width: f64) {
        let mut coords = String::new();
        for (x, y) in points {
            let _ = write!(coords, "{},{} ", fmt_coord(*x), fmt_coord(*y));
        }
        self.elements.push(format!(
            r#"<polyline points="{}" fill="none" stroke="{}" stroke-width="{}"/>"#,
            coords.trim_end(),
            stroke,
            fmt_coord(width),
        ));
    }

    /// A closed filled polygon with optional opacity.
    pub fn polygon(&mut self, points: &[(f64, f64)], fill: &str, opacity: f64) {
        let mut coords = String::new();
        for (x, y) in points {
            let _ = write!(coords, "{},{} ", fmt_coord(*x), fmt_coord(*y));
        }
        self.elements.push(format!(
            r#"<polygon points="{}" fill="{}" fill-opacity="{}" stroke="none"/>"#,
            coords.trim_end(),
            fill,
            opacity,
        ));
    }

    /// A raw path element.
    pub fn path(&mut self, d: &str, fill: &str, stroke: &str, stroke_width: f64, opacity: f64) {
        self.elements.push(format!(
            r#"<path d="{}" fill="{}" fill-opacity="{}" stroke="{}" stroke-width="{}"/>"#,
            d,
            fill,
            opacity,
            stroke,
            fmt_coord(stroke_width),
        ));
    }

    /// A filled circle.
    pub fn circle(&mut self, cx: f64, cy: f64, r: f64, fill: &str) {
        self.elements.push(format!(
            r#"<circle cx="{}" cy="{}" r="{}" fill="{}"/>"#,
            fmt_coord(cx),
            fmt_coord(cy),
            fmt_coord(r),
            fill,
        ));
    }

    /// Text anchored at (x, y). `anchor` is start/middle/end; `weight`
    /// normal or bold.
    #[allow(clippy::too_many_arguments)]
    pub fn text(
        &mut self,
        x: f64,
        y: f64,
        content: &str,
        font_family: &str,
        size: f64,
        fill: &str,
        anchor: &str,
        weight: &str,
    ) {
        self.elements.push(format!(
            r#"<text x="{}" y="{}" font-family="{}" font-size="{}" fill="{}" text-anchor="{}" font-weight="{}">{}</text>"#,
            fmt_coord(x),
            fmt_coord(y),
            font_family,
            fmt_coord(size),
            fill,
            anchor,
            weight,
            escape_text(content),
        ));
    }

    /// Text rotated by `angle` degrees around its anchor point.
    #[allow(clippy::too_many_arguments)]
    pub fn rotated_text(
        &mut self,
        x: f64,
        y: f64,
        angle: f64,
        content: &str,
        font_family: &str,
        size: f64,
        fill: &str,
        anchor: &str,
    ) {
        self.elements.push(format!(
            r#"<text x="{}" y="{}" font-family="{}" font-size="{}" fill="{}" text-anchor="{}" transform="rotate({} {} {})">{}</text>"#,
            fmt_coord(x),
            fmt_coord(y),
            font_family,
            fmt_coord(size),
            fill,
            anchor,
            fmt_coord(angle),
            fmt_coord(x),
            fmt_coord(y),
            escape_text(content),
        ));
    }

    /// Serialize the document.
    pub fn finish(&self) -> String {
        let mut out = String::with_capacity(256 + self.elements.iter().map(String::len).sum::<usize>());
        let _ = write!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">"#,
            fmt_coord(self.width),
            fmt_coord(self.height),
            fmt_coord(self.width),
            fmt_coord(self.height),
        );
        out.push('\n');
        for element in &self.elements {
            out.push_str(element);
            out.push('\n');
        }
        out.push_str("</svg>\n");
        out
    }

    /// Write the document to a file.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.finish())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_structure() {
        let mut doc = SvgDocument::new(100.0, 50.0);
        doc.background("#ffffff");
        doc.line(0.0, 0.0, 100.0, 50.0, "#000000", 2.0);
        doc.text(10.0, 20.0, "O3 < NO2", "sans-serif", 12.0, "#000", "start", "normal");

        let svg = doc.finish();
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>\n"));
        assert!(svg.contains(r#"width="100.000""#));
        assert!(svg.contains("<line"));
        // Text is escaped
        assert!(svg.contains("O3 &lt; NO2"));
    }

    #[test]
    fn test_polyline_points() {
        let mut doc = SvgDocument::new(10.0, 10.0);
        doc.polyline(&[(0.0, 0.0), (5.0, 5.0)], "#f00", 1.0);
        let svg = doc.finish();
        assert!(svg.contains(r#"points="0.000,0.000 5.000,5.000""#));
    }
}
