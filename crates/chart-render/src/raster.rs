//! SVG rasterization.
//!
//! The SVG built by the figure code is parsed back with usvg and rendered
//! into a tiny-skia pixmap at 2× for print-quality PNGs.

use std::path::Path;

use tracing::debug;

use crate::error::{ChartError, Result};
use crate::svg::SvgDocument;

const RASTER_SCALE: f32 = 2.0;

/// Rasterize an SVG string to a PNG file.
pub fn render_png(svg: &str, path: &Path) -> Result<()> {
    let mut options = usvg::Options::default();
    options.fontdb_mut().load_system_fonts();

    let tree = usvg::Tree::from_str(svg, &options).map_err(|e| ChartError::Svg(e.to_string()))?;

    let size = tree.size();
    let width = (size.width() * RASTER_SCALE).ceil() as u32;
    let height = (size.height() * RASTER_SCALE).ceil() as u32;

    let mut pixmap = tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| ChartError::Raster(format!("cannot allocate {width}x{height} pixmap")))?;

    resvg::render(
        &tree,
        tiny_skia::Transform::from_scale(RASTER_SCALE, RASTER_SCALE),
        &mut pixmap.as_mut(),
    );

    let rgba = image::RgbaImage::from_raw(width, height, pixmap.take())
        .ok_or_else(|| ChartError::Raster("pixmap buffer size mismatch".to_string()))?;
    rgba.save_with_format(path, image::ImageFormat::Png)
        .map_err(|e| ChartError::Raster(e.to_string()))?;

    debug!(path = %path.display(), width, height, "Rasterized figure");
    Ok(())
}

/// Write a figure as both SVG and PNG.
pub fn write_figure(doc: &SvgDocument, svg_path: &Path, png_path: &Path) -> Result<()> {
    doc.write_to(svg_path)?;
    render_png(&doc.finish(), png_path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_simple_figure() {
        let dir = tempfile::tempdir().unwrap();
        let svg_path = dir.path().join("fig.svg");
        let png_path = dir.path().join("fig.png");

        let mut doc = SvgDocument::new(120.0, 80.0);
        doc.background("#ffffff");
        doc.rect(10.0, 10.0, 100.0, 60.0, "#005f73", "#000000", 2.0);

        write_figure(&doc, &svg_path, &png_path).unwrap();

        assert!(svg_path.exists());
        assert!(png_path.exists());
        // 2x raster of a 120x80 document
        let img = image::open(&png_path).unwrap();
        assert_eq!(img.width(), 240);
        assert_eq!(img.height(), 160);
    }
}
