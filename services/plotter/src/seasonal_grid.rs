//! Seasonal means ± SD per region, as a grid of panels.
//!
//! Each panel shows the four month-block seasons for one region: a smoothed
//! spline through the seasonal means, the ± SD band, point markers with
//! error bars, and the multi-year average and annual trend as annotations.

use std::path::PathBuf;

use anyhow::{bail, Result};
use chrono::Datelike;
use clap::Args;
use tracing::info;

use atmos_common::{ColumnUnit, Season};
use chart_render::{write_figure, Panel, SvgDocument};
use chem_kernels::{cubic_spline_interp, linear_regression};

use crate::util::{display_label, figure_paths, load_style, read_wide_series};

#[derive(Args, Debug)]
pub struct SeasonalGridArgs {
    /// Wide CSV from the site-series pipeline
    #[arg(long)]
    pub input: PathBuf,

    /// Directory for the figure files
    #[arg(long)]
    pub output_dir: PathBuf,

    /// Figure base name (e.g. FR_HCHO_SeasonalAvg_Grid)
    #[arg(long)]
    pub stem: String,

    /// Gas label for the shared axis title
    #[arg(long, default_value = "HCHO")]
    pub gas: String,

    /// Unit of the CSV values; the figure displays 10^15 molecules/cm2
    #[arg(long, default_value = "mol_m2")]
    pub input_unit: ColumnUnit,

    /// Upper y limit in 10^15 molecules/cm2
    #[arg(long, default_value = "27.0")]
    pub y_max: f64,

    /// Panels per row
    #[arg(long, default_value = "3")]
    pub columns: usize,

    /// Optional style YAML
    #[arg(long)]
    pub style: Option<PathBuf>,
}

struct SeasonalStats {
    mean: [f64; 4],
    sd: [f64; 4],
}

fn seasonal_stats(dates: &[chrono::NaiveDate], values: &[f64]) -> SeasonalStats {
    let mut buckets: [Vec<f64>; 4] = Default::default();
    for (date, &value) in dates.iter().zip(values) {
        if value.is_finite() {
            buckets[Season::from_month(date.month()).index()].push(value);
        }
    }

    let mut mean = [f64::NAN; 4];
    let mut sd = [f64::NAN; 4];
    for (i, bucket) in buckets.iter().enumerate() {
        if bucket.is_empty() {
            continue;
        }
        let m = bucket.iter().sum::<f64>() / bucket.len() as f64;
        mean[i] = m;
        if bucket.len() > 1 {
            let var = bucket.iter().map(|v| (v - m).powi(2)).sum::<f64>()
                / (bucket.len() - 1) as f64;
            sd[i] = var.sqrt();
        } else {
            sd[i] = 0.0;
        }
    }
    SeasonalStats { mean, sd }
}

pub fn run(args: &SeasonalGridArgs) -> Result<()> {
    let style = load_style(args.style.as_deref())?;
    std::fs::create_dir_all(&args.output_dir)?;

    let mut series = read_wide_series(&args.input)?;
    if series.columns.is_empty() {
        bail!("no region columns in {}", args.input.display());
    }
    // Display unit is 10^15 molecules/cm²
    let factor = args.input_unit.to_molecules_cm2(1.0) / 1e15;
    series.scale_values(factor);

    let cols = args.columns.max(1);
    let rows = (series.columns.len() + cols - 1) / cols;

    let panel_w = 300.0;
    let panel_h = 240.0;
    let margin_left = 80.0;
    let margin_top = 30.0;
    let margin_bottom = 50.0;
    let gap = 12.0;

    let fig_w = margin_left + cols as f64 * (panel_w + gap) + 20.0;
    let fig_h = margin_top + rows as f64 * (panel_h + gap) + margin_bottom;
    let mut doc = SvgDocument::new(fig_w, fig_h);
    doc.background(&style.background);

    let color = style.series_color(0).to_string();
    let season_ticks: Vec<(f64, String)> = Season::ORDER
        .iter()
        .map(|s| (s.index() as f64, s.label().to_string()))
        .collect();

    let y_ticks: Vec<(f64, String)> = {
        let step = args.y_max / 4.0;
        (0..4)
            .map(|i| {
                let v = i as f64 * step;
                (v, format!("{v:.0}"))
            })
            .collect()
    };

    for (index, (name, values)) in series.columns.iter().enumerate() {
        let row = index / cols;
        let col = index % cols;
        let left = margin_left + col as f64 * (panel_w + gap);
        let top = margin_top + row as f64 * (panel_h + gap);

        let panel = Panel::new(
            left,
            top,
            panel_w,
            panel_h,
            (-0.4, 3.4),
            (0.0, args.y_max),
        );
        panel.frame(&mut doc, &style);
        panel.x_ticks(&mut doc, &style, &season_ticks, row == rows - 1);
        panel.y_ticks(&mut doc, &style, &y_ticks, col == 0);

        let stats = seasonal_stats(&series.dates, values);
        let points: Vec<(f64, f64, f64)> = (0..4)
            .filter(|&i| stats.mean[i].is_finite() && stats.sd[i].is_finite())
            .map(|i| (i as f64, stats.mean[i], stats.sd[i]))
            .collect();

        // Smoothed spline and SD band when all four seasons are present
        if points.len() >= 4 {
            let xs: Vec<f64> = points.iter().map(|p| p.0).collect();
            let means: Vec<f64> = points.iter().map(|p| p.1).collect();
            let uppers: Vec<f64> = points.iter().map(|p| p.1 + p.2).collect();
            let lowers: Vec<f64> = points.iter().map(|p| p.1 - p.2).collect();

            let mean_spline = cubic_spline_interp(&xs, &means)?;
            let upper_spline = cubic_spline_interp(&xs, &uppers)?;
            let lower_spline = cubic_spline_interp(&xs, &lowers)?;

            let samples = 120usize;
            let mut smooth = Vec::with_capacity(samples);
            let mut band_x = Vec::with_capacity(samples);
            let mut band_upper = Vec::with_capacity(samples);
            let mut band_lower = Vec::with_capacity(samples);
            for s in 0..samples {
                let t = xs[0] + (xs[xs.len() - 1] - xs[0]) * s as f64 / (samples - 1) as f64;
                smooth.push((t, mean_spline.eval(t)));
                band_x.push(t);
                band_upper.push(upper_spline.eval(t));
                band_lower.push(lower_spline.eval(t));
            }

            panel.band(&mut doc, &band_x, &band_lower, &band_upper, &color, 0.2);
            panel.line(&mut doc, &smooth, &color, style.line_width);
        }

        panel.error_bars(&mut doc, &points, "#444444", 1.5);
        let markers: Vec<(f64, f64)> = points.iter().map(|p| (p.0, p.1)).collect();
        panel.scatter(&mut doc, &markers, 5.0, &color);

        // Average, mean SD and annual trend annotations
        let finite_means: Vec<f64> = points.iter().map(|p| p.1).collect();
        let finite_sds: Vec<f64> = points.iter().map(|p| p.2).collect();
        let avg = finite_means.iter().sum::<f64>() / finite_means.len().max(1) as f64;
        let mean_sd = finite_sds.iter().sum::<f64>() / finite_sds.len().max(1) as f64;

        let ordinals: Vec<f64> = series
            .dates
            .iter()
            .map(|d| d.num_days_from_ce() as f64)
            .collect();
        let trend = linear_regression(&ordinals, values)
            .map(|fit| fit.slope * 365.25)
            .unwrap_or(f64::NAN);

        panel.annotation(&mut doc, &style, 0.04, 0.88, &display_label(name), style.title_size, "bold");
        panel.annotation(
            &mut doc,
            &style,
            0.04,
            0.78,
            &format!("Average: {avg:.1} ± {mean_sd:.1}"),
            style.font_size,
            "normal",
        );
        panel.annotation(
            &mut doc,
            &style,
            0.04,
            0.68,
            &format!("Annual trend: {trend:.3}"),
            style.font_size,
            "normal",
        );
    }

    // Shared y-axis title
    doc.rotated_text(
        22.0,
        fig_h / 2.0,
        -90.0,
        &format!("{} (10^15 molec cm-2)", args.gas),
        &style.font_family,
        style.title_size,
        &style.axis_color,
        "middle",
    );

    let (svg_path, png_path) = figure_paths(&args.output_dir, &args.stem);
    write_figure(&doc, &svg_path, &png_path)?;
    info!(svg = %svg_path.display(), png = %png_path.display(), "Seasonal grid written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_seasonal_stats_buckets_by_month_block() {
        let dates = vec![
            NaiveDate::from_ymd_opt(2020, 1, 5).unwrap(),
            NaiveDate::from_ymd_opt(2020, 2, 5).unwrap(),
            NaiveDate::from_ymd_opt(2020, 8, 5).unwrap(),
        ];
        let values = vec![2.0, 4.0, 10.0];

        let stats = seasonal_stats(&dates, &values);
        assert_eq!(stats.mean[Season::Winter.index()], 3.0);
        assert_eq!(stats.mean[Season::Summer.index()], 10.0);
        assert!(stats.mean[Season::Spring.index()].is_nan());
    }
}
