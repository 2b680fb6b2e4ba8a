//! Wind rose and wind-speed distribution from a station workbook.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;
use tracing::info;

use chart_render::{draw_windrose, write_figure, Panel, SvgDocument};
use chem_kernels::wind_sector_frequencies;
use grid_store::read_wind_workbook;

use crate::util::{figure_paths, load_style};

#[derive(Args, Debug)]
pub struct WindroseArgs {
    /// Station Excel workbook with DIRECTION and SPEED columns
    #[arg(long)]
    pub input: PathBuf,

    /// Directory for the figure files
    #[arg(long)]
    pub output_dir: PathBuf,

    /// Base name for the wind rose figure
    #[arg(long, default_value = "windrose")]
    pub rose_stem: String,

    /// Base name for the distribution figure
    #[arg(long, default_value = "histogram")]
    pub histogram_stem: String,

    /// Optional style YAML
    #[arg(long)]
    pub style: Option<PathBuf>,
}

/// Speed-bin lower bounds for the rose (m/s), last bin open-ended.
const ROSE_SPEED_BOUNDS: [f64; 4] = [0.0, 1.0, 2.0, 3.0];
const ROSE_BIN_COLORS: [&str; 4] = ["#cce5ff", "#66b3ff", "#0073e6", "#003366"];
const ROSE_BIN_LABELS: [&str; 4] = ["0.0 - 1.0", "1.0 - 2.0", "2.0 - 3.0", "> 3.0"];

/// Speed-class lower bounds for the distribution (m/s), last open-ended.
const CLASS_BOUNDS: [f64; 8] = [0.0, 1.0, 1.5, 2.0, 2.5, 3.0, 3.5, 4.0];
const CLASS_LABELS: [&str; 8] = [
    "< 1.0", "1.0 - 1.5", "1.5 - 2.0", "2.0 - 2.5", "2.5 - 3.0", "3.0 - 3.5", "3.5 - 4.0",
    "> 4.0",
];
const CLASS_COLORS: [&str; 8] = [
    "#e6f0ff", "#cce5ff", "#99ccff", "#66b3ff", "#3380ff", "#0073e6", "#004080", "#003366",
];

/// Percent of observations per open-topped speed class.
fn class_percentages(speeds: &[f64], bounds: &[f64]) -> Vec<f64> {
    let mut counts = vec![0usize; bounds.len()];
    let mut total = 0usize;
    for &speed in speeds {
        if speed.is_nan() || speed < bounds[0] {
            continue;
        }
        let mut class = 0usize;
        for (i, &bound) in bounds.iter().enumerate() {
            if speed >= bound {
                class = i;
            }
        }
        counts[class] += 1;
        total += 1;
    }
    counts
        .into_iter()
        .map(|c| {
            if total == 0 {
                0.0
            } else {
                c as f64 * 100.0 / total as f64
            }
        })
        .collect()
}

pub fn run(args: &WindroseArgs) -> Result<()> {
    let style = load_style(args.style.as_deref())?;
    std::fs::create_dir_all(&args.output_dir)?;

    let observations = read_wind_workbook(&args.input)?;
    if observations.is_empty() {
        bail!("no wind observations in {}", args.input.display());
    }
    let directions: Vec<f64> = observations.iter().map(|o| o.direction).collect();
    let speeds: Vec<f64> = observations.iter().map(|o| o.speed).collect();

    // Wind rose
    let frequencies = wind_sector_frequencies(&directions, &speeds, 16, &ROSE_SPEED_BOUNDS);

    let mut rose = SvgDocument::new(560.0, 480.0);
    rose.background(&style.background);
    draw_windrose(
        &mut rose,
        &style,
        230.0,
        240.0,
        180.0,
        &frequencies,
        &ROSE_BIN_COLORS.map(String::from),
        &["N", "NE", "E", "SE", "S", "SW", "W", "NW"],
    )?;

    // Legend, strongest bin first
    let legend_x = 440.0;
    let legend_y = 330.0;
    rose.text(
        legend_x,
        legend_y - 22.0,
        "Wind Speed (m/s)",
        &style.font_family,
        style.font_size,
        &style.axis_color,
        "start",
        "bold",
    );
    for (i, (color, label)) in ROSE_BIN_COLORS
        .iter()
        .rev()
        .zip(ROSE_BIN_LABELS.iter().rev())
        .enumerate()
    {
        let y = legend_y + i as f64 * (style.font_size + 8.0);
        rose.rect(legend_x, y - style.font_size * 0.8, 12.0, 12.0, color, "#000000", 0.7);
        rose.text(
            legend_x + 18.0,
            y,
            label,
            &style.font_family,
            style.font_size,
            &style.axis_color,
            "start",
            "normal",
        );
    }

    let (rose_svg, rose_png) = figure_paths(&args.output_dir, &args.rose_stem);
    write_figure(&rose, &rose_svg, &rose_png)?;

    // Speed distribution
    let percent = class_percentages(&speeds, &CLASS_BOUNDS);
    let p_max = percent.iter().copied().fold(0.0f64, f64::max).max(1.0);

    let mut hist = SvgDocument::new(680.0, 360.0);
    hist.background(&style.background);

    let panel = Panel::new(
        70.0,
        30.0,
        560.0,
        250.0,
        (-0.7, CLASS_LABELS.len() as f64 - 0.3),
        (0.0, p_max * 1.2),
    );

    let y_ticks: Vec<(f64, String)> = {
        let step = 10.0;
        let mut ticks = Vec::new();
        let mut v = 0.0;
        while v <= p_max * 1.2 {
            ticks.push((v, format!("{v:.0}")));
            v += step;
        }
        ticks
    };
    panel.grid_y(
        &mut hist,
        &style,
        &y_ticks.iter().map(|t| t.0).collect::<Vec<_>>(),
    );

    for (i, &p) in percent.iter().enumerate() {
        panel.bars(
            &mut hist,
            &[(i as f64, p)],
            0.8,
            0.0,
            CLASS_COLORS[i],
            "#000000",
            0.7,
        );
        // Percentage label above each bar
        panel.annotation(
            &mut hist,
            &style,
            (i as f64 + 0.5) / CLASS_LABELS.len() as f64 - 0.03,
            (p + p_max * 0.08) / (p_max * 1.2),
            &format!("{p:.1}%"),
            style.font_size * 0.85,
            "normal",
        );
    }

    panel.frame(&mut hist, &style);
    let x_ticks: Vec<(f64, String)> = CLASS_LABELS
        .iter()
        .enumerate()
        .map(|(i, label)| (i as f64, label.to_string()))
        .collect();
    panel.x_ticks(&mut hist, &style, &x_ticks, true);
    panel.y_ticks(&mut hist, &style, &y_ticks, true);

    hist.text(
        panel.left + panel.width / 2.0,
        340.0,
        "Wind Class (m/s)",
        &style.font_family,
        style.font_size,
        &style.axis_color,
        "middle",
        "normal",
    );
    hist.rotated_text(
        22.0,
        panel.top + panel.height / 2.0,
        -90.0,
        "Frequency (%)",
        &style.font_family,
        style.font_size,
        &style.axis_color,
        "middle",
    );

    let (hist_svg, hist_png) = figure_paths(&args.output_dir, &args.histogram_stem);
    write_figure(&hist, &hist_svg, &hist_png)?;

    info!(
        observations = observations.len(),
        rose = %rose_svg.display(),
        histogram = %hist_svg.display(),
        "Wind figures written"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_percentages() {
        let speeds = [0.5, 1.2, 1.2, 4.5, f64::NAN];
        let percent = class_percentages(&speeds, &CLASS_BOUNDS);

        assert!((percent[0] - 25.0).abs() < 1e-9);
        assert!((percent[1] - 50.0).abs() < 1e-9);
        // Open-ended top class
        assert!((percent[7] - 25.0).abs() < 1e-9);
        let total: f64 = percent.iter().sum();
        assert!((total - 100.0).abs() < 1e-9);
    }
}
