//! Seasonal trend panels per land-cover class and gas.
//!
//! The trends table has one row per (year, season) with mean and SD columns
//! per land-cover class and gas (e.g. Urban_HCHO_Mean, Urban_HCHO_SD).
//! Each panel shows the seasonal points with error bars and the linear
//! trend over the year axis.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;
use tracing::info;

use atmos_common::Season;
use chart_render::{write_figure, Panel, SvgDocument};
use chem_kernels::linear_regression;
use grid_store::Table;

use crate::util::{figure_paths, load_style};

#[derive(Args, Debug)]
pub struct TrendsArgs {
    /// Seasonal trends CSV (Season column like "2019 Summer")
    #[arg(long)]
    pub input: PathBuf,

    /// Directory for the figure files
    #[arg(long)]
    pub output_dir: PathBuf,

    /// Figure base name
    #[arg(long, default_value = "FNR_Trends")]
    pub stem: String,

    /// Land-cover classes, one panel row each
    #[arg(long, value_delimiter = ',', default_value = "Urban,Transition,Forest")]
    pub classes: Vec<String>,

    /// Gases, one panel column each
    #[arg(long, value_delimiter = ',', default_value = "HCHO,NO2")]
    pub gases: Vec<String>,

    /// Upper y limit in 10^15 molecules/cm2
    #[arg(long, default_value = "20.0")]
    pub y_max: f64,

    /// Optional style YAML
    #[arg(long)]
    pub style: Option<PathBuf>,
}

/// "2019 Summer" → (2019.0 + season offset) on the year axis.
fn season_position(cell: &str) -> Option<f64> {
    let mut parts = cell.split_whitespace();
    let year: i32 = parts.next()?.parse().ok()?;
    let season: Season = parts.next()?.parse().ok()?;
    // Summer starts the display year, as in the source table
    let offset = match season {
        Season::Summer => 0.0,
        Season::Autumn => 0.25,
        Season::Winter => 0.5,
        Season::Spring => 0.75,
    };
    Some(year as f64 + offset)
}

pub fn run(args: &TrendsArgs) -> Result<()> {
    let style = load_style(args.style.as_deref())?;
    std::fs::create_dir_all(&args.output_dir)?;

    let table = Table::read(&args.input)?;
    let season_cells = table.column_str("Season")?;
    let positions: Vec<f64> = season_cells
        .iter()
        .map(|cell| season_position(cell).unwrap_or(f64::NAN))
        .collect();
    if positions.iter().all(|p| p.is_nan()) {
        bail!("no parseable Season rows in {}", args.input.display());
    }

    let x_min = positions.iter().copied().filter(|p| p.is_finite()).fold(f64::INFINITY, f64::min);
    let x_max = positions
        .iter()
        .copied()
        .filter(|p| p.is_finite())
        .fold(f64::NEG_INFINITY, f64::max);

    let rows = args.classes.len();
    let cols = args.gases.len();
    let panel_w = 360.0;
    let panel_h = 180.0;
    let margin_left = 80.0;
    let margin_top = 30.0;
    let gap = 14.0;

    let fig_w = margin_left + cols as f64 * (panel_w + gap) + 20.0;
    let fig_h = margin_top + rows as f64 * (panel_h + gap) + 60.0;
    let mut doc = SvgDocument::new(fig_w, fig_h);
    doc.background(&style.background);

    let year_lo = x_min.floor() as i32;
    let year_hi = x_max.ceil() as i32;
    let x_ticks: Vec<(f64, String)> = (year_lo..=year_hi)
        .map(|y| (y as f64, format!("{y}")))
        .collect();
    let y_ticks: Vec<(f64, String)> = (0..=4)
        .map(|i| {
            let v = args.y_max * i as f64 / 4.0;
            (v, format!("{v:.0}"))
        })
        .collect();

    for (row, class) in args.classes.iter().enumerate() {
        for (col, gas) in args.gases.iter().enumerate() {
            let mean_col = format!("{class}_{gas}_Mean");
            let sd_col = format!("{class}_{gas}_SD");
            let means = table.column_f64(&mean_col)?;
            let sds = table.column_f64(&sd_col)?;

            let left = margin_left + col as f64 * (panel_w + gap);
            let top = margin_top + row as f64 * (panel_h + gap);
            let panel = Panel::new(
                left,
                top,
                panel_w,
                panel_h,
                (x_min - 0.25, x_max + 0.25),
                (0.0, args.y_max * 1e15),
            );
            panel.frame(&mut doc, &style);
            panel.x_ticks(&mut doc, &style, &x_ticks, row == rows - 1);
            let y_ticks_scaled: Vec<(f64, String)> = y_ticks
                .iter()
                .map(|(v, label)| (v * 1e15, label.clone()))
                .collect();
            panel.y_ticks(&mut doc, &style, &y_ticks_scaled, col == 0);

            let series: Vec<(f64, f64, f64)> = positions
                .iter()
                .zip(means.iter().zip(&sds))
                .filter(|(p, (m, s))| p.is_finite() && m.is_finite() && s.is_finite())
                .map(|(p, (m, s))| (*p, *m, *s))
                .collect();

            let color = style.series_color(col).to_string();
            panel.error_bars(&mut doc, &series, &color, 1.5);
            let markers: Vec<(f64, f64)> = series.iter().map(|p| (p.0, p.1)).collect();
            panel.scatter(&mut doc, &markers, 4.0, &color);

            // Linear trend across the seasonal points
            let xs: Vec<f64> = series.iter().map(|p| p.0).collect();
            let ys: Vec<f64> = series.iter().map(|p| p.1).collect();
            if let Some(fit) = linear_regression(&xs, &ys) {
                let trend: Vec<(f64, f64)> = [x_min, x_max]
                    .iter()
                    .map(|&x| (x, fit.slope * x + fit.intercept))
                    .collect();
                panel.line(&mut doc, &trend, "#000000", 2.0);

                let avg = ys.iter().sum::<f64>() / ys.len().max(1) as f64 / 1e15;
                panel.annotation(
                    &mut doc,
                    &style,
                    0.015,
                    0.82,
                    &format!("{}", class.to_uppercase()),
                    style.title_size,
                    "bold",
                );
                panel.annotation(
                    &mut doc,
                    &style,
                    0.33,
                    0.82,
                    &format!(
                        "Average: {avg:.1}  |  Linear trend: {:.3}",
                        fit.slope / 1e15
                    ),
                    style.font_size,
                    "normal",
                );
            }
        }
    }

    doc.rotated_text(
        22.0,
        fig_h / 2.0,
        -90.0,
        "Column (10^15 molec cm-2)",
        &style.font_family,
        style.title_size,
        &style.axis_color,
        "middle",
    );

    let (svg_path, png_path) = figure_paths(&args.output_dir, &args.stem);
    write_figure(&doc, &svg_path, &png_path)?;
    info!(svg = %svg_path.display(), "Trend panels written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_season_position() {
        assert_eq!(season_position("2019 Summer"), Some(2019.0));
        assert_eq!(season_position("2019 Autumn"), Some(2019.25));
        assert_eq!(season_position("2020 Spring"), Some(2020.75));
        assert_eq!(season_position("bad row"), None);
    }
}
