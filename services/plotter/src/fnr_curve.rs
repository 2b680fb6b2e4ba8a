//! Ozone-exceedance probability vs FNR.
//!
//! A third-degree polynomial is fitted to the (FNR, probability) points;
//! the figure shows the scatter, the smoothed curve with its 95% confidence
//! band, the curve peak with an uncertainty band, and the correlation
//! between fitted and observed probabilities.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;
use tracing::info;

use chart_render::{write_figure, Panel, SvgDocument};
use chem_kernels::{linear_regression, polyfit, polyval, student_t_975};
use grid_store::Table;

use crate::util::{figure_paths, load_style};

#[derive(Args, Debug)]
pub struct FnrCurveArgs {
    /// CSV with FNR in the first column and exceedance probability in the
    /// second
    #[arg(long)]
    pub input: PathBuf,

    /// Directory for the figure files
    #[arg(long)]
    pub output_dir: PathBuf,

    /// Figure base name
    #[arg(long, default_value = "FNRxProbO3")]
    pub stem: String,

    /// Panel tag drawn at the top left (e.g. "( b )")
    #[arg(long, default_value = "( b )")]
    pub tag: String,

    /// Half-width of the peak uncertainty band in FNR units
    #[arg(long, default_value = "0.4")]
    pub peak_band: f64,

    /// Optional style YAML
    #[arg(long)]
    pub style: Option<PathBuf>,
}

pub fn run(args: &FnrCurveArgs) -> Result<()> {
    let style = load_style(args.style.as_deref())?;
    std::fs::create_dir_all(&args.output_dir)?;

    let table = Table::read(&args.input)?;
    if table.headers().len() < 2 {
        bail!("expected at least two columns in {}", args.input.display());
    }
    let x = table.column_f64(&table.headers()[0].clone())?;
    let y = table.column_f64(&table.headers()[1].clone())?;

    let pairs: Vec<(f64, f64)> = x
        .iter()
        .zip(&y)
        .filter(|(a, b)| a.is_finite() && b.is_finite())
        .map(|(a, b)| (*a, *b))
        .collect();
    if pairs.len() < 5 {
        bail!("not enough points for a cubic fit");
    }
    let xs: Vec<f64> = pairs.iter().map(|p| p.0).collect();
    let ys: Vec<f64> = pairs.iter().map(|p| p.1).collect();

    let coeffs = polyfit(&xs, &ys, 3)?;

    // Smoothed curve over the observed range
    let x_min = xs.iter().copied().fold(f64::INFINITY, f64::min);
    let x_max = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let samples = 200usize;
    let fit_x: Vec<f64> = (0..samples)
        .map(|i| x_min + (x_max - x_min) * i as f64 / (samples - 1) as f64)
        .collect();
    let fit_y: Vec<f64> = fit_x.iter().map(|&v| polyval(&coeffs, v)).collect();

    // Peak of the fitted curve
    let (peak_x, peak_y) = fit_x
        .iter()
        .zip(&fit_y)
        .fold((fit_x[0], f64::NEG_INFINITY), |acc, (&px, &py)| {
            if py > acc.1 {
                (px, py)
            } else {
                acc
            }
        });

    // Correlation between observed and fitted values
    let predicted: Vec<f64> = xs.iter().map(|&v| polyval(&coeffs, v)).collect();
    let r = linear_regression(&ys, &predicted).map(|f| f.r).unwrap_or(f64::NAN);

    // 95% confidence band from the residual spread
    let n = xs.len();
    let residual_sd = {
        let ss: f64 = ys
            .iter()
            .zip(&predicted)
            .map(|(obs, fit)| (obs - fit).powi(2))
            .sum();
        (ss / n as f64).sqrt()
    };
    let t_value = student_t_975(n.saturating_sub(coeffs.len()));
    let mean_x = xs.iter().sum::<f64>() / n as f64;
    let sxx: f64 = xs.iter().map(|v| (v - mean_x).powi(2)).sum();

    let mut upper = Vec::with_capacity(samples);
    let mut lower = Vec::with_capacity(samples);
    for (&fx, &fy) in fit_x.iter().zip(&fit_y) {
        let delta =
            t_value * residual_sd * (1.0 / n as f64 + (fx - mean_x).powi(2) / sxx).sqrt();
        upper.push(fy + delta);
        lower.push(fy - delta);
    }

    // Figure
    let mut doc = SvgDocument::new(640.0, 420.0);
    doc.background(&style.background);

    let panel = Panel::new(80.0, 50.0, 520.0, 320.0, (0.0, 6.0), (0.0, 0.4));
    panel.frame(&mut doc, &style);

    let x_ticks: Vec<(f64, String)> = (0..=6).map(|i| (i as f64, format!("{i}"))).collect();
    // Probabilities formatted as percentages
    let y_ticks: Vec<(f64, String)> = (0..=4)
        .map(|i| {
            let v = i as f64 * 0.1;
            (v, format!("{}%", (v * 100.0) as i32))
        })
        .collect();
    panel.x_ticks(&mut doc, &style, &x_ticks, true);
    panel.y_ticks(&mut doc, &style, &y_ticks, true);

    // Peak uncertainty band, confidence band, curve, peak line, scatter
    let band_left = (peak_x - args.peak_band).max(0.0);
    let band_right = peak_x + args.peak_band;
    let bx0 = panel.x.to_pixel(band_left);
    let bx1 = panel.x.to_pixel(band_right);
    doc.polygon(
        &[
            (bx0, panel.top),
            (bx1, panel.top),
            (bx1, panel.top + panel.height),
            (bx0, panel.top + panel.height),
        ],
        "#ff0000",
        0.2,
    );
    panel.band(&mut doc, &fit_x, &lower, &upper, "#000000", 0.1);
    panel.line(
        &mut doc,
        &fit_x.iter().copied().zip(fit_y.iter().copied()).collect::<Vec<_>>(),
        "#ff0000",
        style.line_width,
    );
    panel.vline(&mut doc, peak_x, "#8b0000", 2.0);
    panel.scatter(&mut doc, &pairs, 3.5, "#000000");

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
    panel.annotation(
        &mut doc,
        &style,
        0.62,
        0.92,
        &format!("Peak: {peak_x:.2} ({:.1} ~ {:.1})", band_left, band_right),
        style.title_size,
        "normal",
    );
    panel.annotation(
        &mut doc,
        &style,
        0.62,
        0.82,
        &format!("R = {r:.2}"),
        style.title_size,
        "normal",
    );

    doc.text(
        panel.left + panel.width / 2.0,
        410.0,
        "TROPOMI FNR (HCHO/NO2)",
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
        "Ozone exceedance probability",
        &style.font_family,
        style.font_size,
        &style.axis_color,
        "middle",
    );

    let (svg_path, png_path) = figure_paths(&args.output_dir, &args.stem);
    write_figure(&doc, &svg_path, &png_path)?;
    info!(
        peak = format!("{peak_x:.2}"),
        max_probability = format!("{peak_y:.3}"),
        r = format!("{r:.2}"),
        svg = %svg_path.display(),
        "FNR curve written"
    );
    Ok(())
}
