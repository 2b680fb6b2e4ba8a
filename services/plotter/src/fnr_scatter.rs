//! HCHO vs NO2 scatter colored by ozone.
//!
//! Each point is one (day, site) sample; color encodes the surface ozone
//! concentration through the reversed Spectral map. The 1/1.5 and 1/2.5
//! lines bound the transitional FNR regime.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;
use tracing::info;

use chart_render::{draw_colorbar, write_figure, ColorMap, Panel, SvgDocument};
use grid_store::Table;

use crate::util::{figure_paths, load_style};

#[derive(Args, Debug)]
pub struct FnrScatterArgs {
    /// CSV with HCHO, NO2 and O3 columns
    #[arg(long)]
    pub input: PathBuf,

    /// Directory for the figure files
    #[arg(long)]
    pub output_dir: PathBuf,

    /// Figure base name
    #[arg(long, default_value = "HCHOxNO2xO3")]
    pub stem: String,

    /// Panel tag drawn at the top left (e.g. "( a )")
    #[arg(long, default_value = "( a )")]
    pub tag: String,

    /// Color scale minimum (µg/m³ ozone)
    #[arg(long, default_value = "50.0")]
    pub vmin: f64,

    /// Color scale maximum (µg/m³ ozone)
    #[arg(long, default_value = "130.0")]
    pub vmax: f64,

    /// Optional style YAML
    #[arg(long)]
    pub style: Option<PathBuf>,
}

pub fn run(args: &FnrScatterArgs) -> Result<()> {
    let style = load_style(args.style.as_deref())?;
    std::fs::create_dir_all(&args.output_dir)?;

    let table = Table::read(&args.input)?;
    let hcho = table.column_f64("HCHO")?;
    let no2 = table.column_f64("NO2")?;
    let o3 = table.column_f64("O3")?;

    let points: Vec<(f64, f64, f64)> = hcho
        .iter()
        .zip(&no2)
        .zip(&o3)
        .filter(|((h, n), _)| h.is_finite() && n.is_finite())
        .map(|((h, n), o)| (*h, *n, *o))
        .collect();
    if points.is_empty() {
        bail!("no usable rows in {}", args.input.display());
    }

    let mut doc = SvgDocument::new(700.0, 430.0);
    doc.background(&style.background);

    // Axes span the published display limits, labels in 10^15
    let x_max = 30e15;
    let y_max = 20e15;
    let panel = Panel::new(80.0, 50.0, 470.0, 320.0, (0.0, x_max), (0.0, y_max));

    let x_ticks: Vec<(f64, String)> = (0..=3)
        .map(|i| (i as f64 * 10e15, format!("{}", i * 10)))
        .collect();
    let y_ticks: Vec<(f64, String)> = (0..=4)
        .map(|i| (i as f64 * 5e15, format!("{}", i * 5)))
        .collect();

    // Grid under the data
    panel.grid_y(&mut doc, &style, &y_ticks.iter().map(|t| t.0).collect::<Vec<_>>());

    let map = ColorMap::spectral_reversed();
    panel.scatter_colored(&mut doc, &points, 3.5, &map, args.vmin, args.vmax);

    // FNR regime reference lines
    let line_15: Vec<(f64, f64)> = (0..=60)
        .map(|i| {
            let x = x_max * i as f64 / 60.0;
            (x, x / 1.5)
        })
        .collect();
    let line_25: Vec<(f64, f64)> = (0..=60)
        .map(|i| {
            let x = x_max * i as f64 / 60.0;
            (x, x / 2.5)
        })
        .collect();
    // Clip to the panel by dropping points above the y limit
    panel.line(
        &mut doc,
        &line_15.into_iter().filter(|p| p.1 <= y_max).collect::<Vec<_>>(),
        "#000000",
        1.0,
    );
    panel.line(
        &mut doc,
        &line_25.into_iter().filter(|p| p.1 <= y_max).collect::<Vec<_>>(),
        "#000000",
        1.0,
    );

    panel.frame(&mut doc, &style);
    panel.x_ticks(&mut doc, &style, &x_ticks, true);
    panel.y_ticks(&mut doc, &style, &y_ticks, true);

    doc.text(
        panel.left,
        32.0,
        &args.tag,
        &style.font_family,
        style.title_size * 1.2,
        &style.axis_color,
        "start",
        "normal",
    );
    doc.text(
        panel.left + panel.width / 2.0,
        415.0,
        "HCHO (10^15 molecules cm-2)",
        &style.font_family,
        style.font_size,
        &style.axis_color,
        "middle",
        "normal",
    );
    doc.rotated_text(
        24.0,
        panel.top + panel.height / 2.0,
        -90.0,
        "NO2 (10^15 molecules cm-2)",
        &style.font_family,
        style.font_size,
        &style.axis_color,
        "middle",
    );

    let cbar_ticks: Vec<f64> = (0..=4)
        .map(|i| args.vmin + (args.vmax - args.vmin) * i as f64 / 4.0)
        .collect();
    draw_colorbar(
        &mut doc,
        &style,
        panel.left + panel.width + 20.0,
        panel.top,
        18.0,
        panel.height,
        &map,
        args.vmin,
        args.vmax,
        &cbar_ticks,
        "O3 (ug m-3)",
    );

    let (svg_path, png_path) = figure_paths(&args.output_dir, &args.stem);
    write_figure(&doc, &svg_path, &png_path)?;
    info!(points = points.len(), svg = %svg_path.display(), "FNR scatter written");
    Ok(())
}
