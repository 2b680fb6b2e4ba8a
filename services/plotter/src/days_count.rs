//! Valid-observation days per year and region.
//!
//! One panel per pollutant CSV; within a panel, grouped bars count the
//! days with a non-missing value per region and year.

use std::path::PathBuf;

use anyhow::{bail, Result};
use chrono::Datelike;
use clap::Args;
use tracing::info;

use chart_render::{write_figure, Panel, SvgDocument};

use crate::util::{display_label, figure_paths, load_style, read_wide_series};

#[derive(Args, Debug)]
pub struct DaysCountArgs {
    /// Wide site-series CSVs, one per pollutant
    #[arg(long, value_delimiter = ',')]
    pub inputs: Vec<PathBuf>,

    /// Pollutant labels matching the inputs
    #[arg(long, value_delimiter = ',')]
    pub labels: Vec<String>,

    /// Directory for the figure files
    #[arg(long)]
    pub output_dir: PathBuf,

    /// Figure base name
    #[arg(long, default_value = "valid_days")]
    pub stem: String,

    /// Upper y limit (days)
    #[arg(long, default_value = "400.0")]
    pub y_max: f64,

    /// Optional style YAML
    #[arg(long)]
    pub style: Option<PathBuf>,
}

struct PanelData {
    label: String,
    years: Vec<i32>,
    regions: Vec<String>,
    /// counts[region][year index]
    counts: Vec<Vec<usize>>,
}

fn count_valid_days(path: &PathBuf, label: &str) -> Result<PanelData> {
    let series = read_wide_series(path)?;
    let years = series.years();

    let mut regions = Vec::new();
    let mut counts = Vec::new();
    for (name, values) in &series.columns {
        let mut per_year = vec![0usize; years.len()];
        for (date, value) in series.dates.iter().zip(values) {
            if value.is_finite() {
                if let Ok(idx) = years.binary_search(&date.year()) {
                    per_year[idx] += 1;
                }
            }
        }
        regions.push(name.clone());
        counts.push(per_year);
    }

    Ok(PanelData {
        label: label.to_string(),
        years,
        regions,
        counts,
    })
}

pub fn run(args: &DaysCountArgs) -> Result<()> {
    if args.inputs.is_empty() {
        bail!("no input files given");
    }
    if args.inputs.len() != args.labels.len() {
        bail!(
            "{} inputs but {} labels",
            args.inputs.len(),
            args.labels.len()
        );
    }

    let style = load_style(args.style.as_deref())?;
    std::fs::create_dir_all(&args.output_dir)?;

    let mut panels = Vec::new();
    for (path, label) in args.inputs.iter().zip(&args.labels) {
        panels.push(count_valid_days(path, label)?);
    }

    let panel_w = 640.0;
    let panel_h = 130.0;
    let margin_left = 80.0;
    let margin_top = 20.0;
    let gap = 12.0;
    let legend_h = 60.0;
    let fig_w = margin_left + panel_w + 30.0;
    let fig_h = margin_top + panels.len() as f64 * (panel_h + gap) + 40.0 + legend_h;

    let mut doc = SvgDocument::new(fig_w, fig_h);
    doc.background(&style.background);

    let y_ticks: Vec<(f64, String)> = (0..=3)
        .map(|i| {
            let v = args.y_max * i as f64 / 3.0;
            (v, format!("{v:.0}"))
        })
        .collect();

    for (index, data) in panels.iter().enumerate() {
        let n_years = data.years.len();
        let n_regions = data.regions.len().max(1);
        let top = margin_top + index as f64 * (panel_h + gap);

        let panel = Panel::new(
            margin_left,
            top,
            panel_w,
            panel_h,
            (-0.6, n_years as f64 - 0.4),
            (0.0, args.y_max),
        );

        panel.grid_y(
            &mut doc,
            &style,
            &y_ticks.iter().map(|t| t.0).collect::<Vec<_>>(),
        );

        // Grouped bars: regions side by side within each year slot
        let group_width = 0.9;
        let bar_width = group_width / n_regions as f64;
        for (r, per_year) in data.counts.iter().enumerate() {
            let color = style.series_color(r).to_string();
            let bars: Vec<(f64, f64)> = per_year
                .iter()
                .enumerate()
                .map(|(y, &count)| {
                    let center =
                        y as f64 - group_width / 2.0 + bar_width * (r as f64 + 0.5);
                    (center, count as f64)
                })
                .collect();
            panel.bars(&mut doc, &bars, bar_width, 0.0, &color, "#000000", 0.7);
        }

        panel.frame(&mut doc, &style);
        let x_ticks: Vec<(f64, String)> = data
            .years
            .iter()
            .enumerate()
            .map(|(i, year)| (i as f64, format!("{year}")))
            .collect();
        panel.x_ticks(&mut doc, &style, &x_ticks, index == panels.len() - 1);
        panel.y_ticks(&mut doc, &style, &y_ticks, true);

        doc.rotated_text(
            30.0,
            top + panel_h / 2.0,
            -90.0,
            &format!("{} days with data", data.label),
            &style.font_family,
            style.font_size,
            &style.axis_color,
            "middle",
        );
    }

    // Shared legend from the first panel's regions
    if let Some(first) = panels.first() {
        let legend_top = fig_h - legend_h + 10.0;
        let per_row = 3usize;
        let cell_w = panel_w / per_row as f64;
        for (r, region) in first.regions.iter().enumerate() {
            let row = r / per_row;
            let col = r % per_row;
            let x = margin_left + col as f64 * cell_w;
            let y = legend_top + row as f64 * (style.font_size + 8.0);
            doc.rect(
                x,
                y - style.font_size * 0.8,
                12.0,
                12.0,
                style.series_color(r),
                "#000000",
                0.7,
            );
            doc.text(
                x + 18.0,
                y,
                &display_label(region),
                &style.font_family,
                style.font_size,
                &style.axis_color,
                "start",
                "normal",
            );
        }
    }

    let (svg_path, png_path) = figure_paths(&args.output_dir, &args.stem);
    write_figure(&doc, &svg_path, &png_path)?;
    info!(panels = panels.len(), svg = %svg_path.display(), "Days-count figure written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_count_valid_days() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wide.csv");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "day,MASP,SANTOS").unwrap();
        writeln!(f, "2019-01-01,1.0,").unwrap();
        writeln!(f, "2019-01-02,2.0,3.0").unwrap();
        writeln!(f, "2020-01-01,,4.0").unwrap();

        let data = count_valid_days(&path, "HCHO").unwrap();
        assert_eq!(data.years, vec![2019, 2020]);
        // MASP: two days in 2019, none in 2020
        assert_eq!(data.counts[0], vec![2, 0]);
        // SANTOS: one day each year
        assert_eq!(data.counts[1], vec![1, 1]);
    }
}
