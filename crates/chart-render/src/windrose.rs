//! Polar wind-rose drawing.

use std::f64::consts::PI;

use crate::error::{ChartError, Result};
use crate::style::PlotStyle;
use crate::svg::SvgDocument;

fn polar_point(cx: f64, cy: f64, radius: f64, angle_deg: f64) -> (f64, f64) {
    // 0° points north (up), angles grow clockwise
    let rad = (angle_deg - 90.0) * PI / 180.0;
    (cx + radius * rad.cos(), cy + radius * rad.sin())
}

fn annular_sector_path(
    cx: f64,
    cy: f64,
    r0: f64,
    r1: f64,
    start_deg: f64,
    end_deg: f64,
) -> String {
    let (x0, y0) = polar_point(cx, cy, r0, start_deg);
    let (x1, y1) = polar_point(cx, cy, r1, start_deg);
    let (x2, y2) = polar_point(cx, cy, r1, end_deg);
    let (x3, y3) = polar_point(cx, cy, r0, end_deg);
    format!(
        "M {x0:.3} {y0:.3} L {x1:.3} {y1:.3} A {r1:.3} {r1:.3} 0 0 1 {x2:.3} {y2:.3} \
         L {x3:.3} {y3:.3} A {r0:.3} {r0:.3} 0 0 0 {x0:.3} {y0:.3} Z"
    )
}

/// Draw a stacked wind rose.
///
/// `frequencies` is indexed `[sector][speed_bin]` in percent, sector 0
/// centered on north and proceeding clockwise. `bin_colors` colors each
/// speed bin; `labels` annotate the compass directions at 45° steps.
#[allow(clippy::too_many_arguments)]
pub fn draw_windrose(
    doc: &mut SvgDocument,
    style: &PlotStyle,
    cx: f64,
    cy: f64,
    radius: f64,
    frequencies: &[Vec<f64>],
    bin_colors: &[String],
    labels: &[&str],
) -> Result<()> {
    let n_sectors = frequencies.len();
    if n_sectors == 0 {
        return Err(ChartError::InvalidInput("empty wind rose".to_string()));
    }
    if frequencies.iter().any(|row| row.len() != bin_colors.len()) {
        return Err(ChartError::InvalidInput(
            "wind rose bins and colors disagree".to_string(),
        ));
    }

    let max_total = frequencies
        .iter()
        .map(|row| row.iter().sum::<f64>())
        .fold(0.0f64, f64::max);
    if max_total <= 0.0 {
        return Err(ChartError::InvalidInput(
            "wind rose has no observations".to_string(),
        ));
    }

    // Frequency rings with percentage labels
    let ring_step = (max_total / 4.0).max(1.0);
    let mut ring = ring_step;
    while ring <= max_total + ring_step * 0.5 {
        let r = radius * (ring / max_total).min(1.0);
        let circle = format!(
            r#"M {:.3} {:.3} A {r:.3} {r:.3} 0 1 1 {:.3} {:.3} A {r:.3} {r:.3} 0 1 1 {:.3} {:.3}"#,
            cx + r,
            cy,
            cx - r,
            cy,
            cx + r,
            cy
        );
        doc.path(&circle, "none", &style.grid_color, 1.0, 1.0);

        let (lx, ly) = polar_point(cx, cy, r, 23.0);
        doc.text(
            lx,
            ly,
            &format!("{ring:.1}%"),
            &style.font_family,
            style.font_size * 0.8,
            &style.axis_color,
            "start",
            "normal",
        );
        ring += ring_step;
    }

    // Stacked sector wedges
    let sector_width = 360.0 / n_sectors as f64;
    let opening = sector_width * 0.9;
    for (s, row) in frequencies.iter().enumerate() {
        let center = s as f64 * sector_width;
        let start = center - opening / 2.0;
        let end = center + opening / 2.0;

        let mut r0 = 0.0f64;
        for (b, &freq) in row.iter().enumerate() {
            if freq <= 0.0 {
                continue;
            }
            let r1 = r0 + radius * freq / max_total;
            let path = annular_sector_path(cx, cy, r0.max(0.5), r1, start, end);
            doc.path(&path, &bin_colors[b], &style.axis_color, 0.7, 1.0);
            r0 = r1;
        }
    }

    // Outer circle
    let outer = format!(
        r#"M {:.3} {:.3} A {radius:.3} {radius:.3} 0 1 1 {:.3} {:.3} A {radius:.3} {radius:.3} 0 1 1 {:.3} {:.3}"#,
        cx + radius,
        cy,
        cx - radius,
        cy,
        cx + radius,
        cy
    );
    doc.path(&outer, "none", &style.axis_color, 3.0, 1.0);

    // Compass labels at 45° steps
    for (i, label) in labels.iter().enumerate() {
        let angle = i as f64 * 360.0 / labels.len() as f64;
        let (lx, ly) = polar_point(cx, cy, radius + style.font_size * 1.2, angle);
        doc.text(
            lx,
            ly + style.font_size * 0.35,
            label,
            &style.font_family,
            style.font_size,
            &style.axis_color,
            "middle",
            "bold",
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_windrose_draws_wedges() {
        let mut doc = SvgDocument::new(400.0, 400.0);
        let style = PlotStyle::default();
        let mut freq = vec![vec![0.0, 0.0]; 16];
        freq[0] = vec![10.0, 5.0];
        freq[4] = vec![20.0, 0.0];

        draw_windrose(
            &mut doc,
            &style,
            200.0,
            200.0,
            150.0,
            &freq,
            &["#cce5ff".to_string(), "#003366".to_string()],
            &["N", "NE", "E", "SE", "S", "SW", "W", "NW"],
        )
        .unwrap();

        let svg = doc.finish();
        // Three stacked wedges across the two populated sectors
        assert!(svg.matches("#cce5ff").count() >= 1);
        assert!(svg.matches("#003366").count() >= 1);
        assert!(svg.contains("N</text>"));
    }

    #[test]
    fn test_windrose_rejects_empty() {
        let mut doc = SvgDocument::new(100.0, 100.0);
        let style = PlotStyle::default();
        assert!(draw_windrose(&mut doc, &style, 50.0, 50.0, 40.0, &[], &[], &[]).is_err());

        let freq = vec![vec![0.0]; 8];
        assert!(draw_windrose(
            &mut doc,
            &style,
            50.0,
            50.0,
            40.0,
            &freq,
            &["#000000".to_string()],
            &[]
        )
        .is_err());
    }
}
