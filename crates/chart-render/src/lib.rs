//! Publication-figure rendering.
//!
//! Figures are composed as SVG documents (the vector deliverable) and
//! rasterized to PNG with resvg for the raster deliverable, so both exports
//! come from a single drawing path.

mod axis;
mod chart;
mod colormap;
mod error;
mod raster;
mod style;
mod svg;
mod windrose;

pub use axis::{format_tick, nice_ticks, Scale};
pub use chart::{draw_colorbar, Panel};
pub use colormap::ColorMap;
pub use error::{ChartError, Result};
pub use raster::{render_png, write_figure};
pub use style::{hex_to_rgb, PlotStyle};
pub use svg::SvgDocument;
pub use windrose::draw_windrose;
