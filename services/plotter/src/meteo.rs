//! Meteorology climatology bars.
//!
//! A station table (year/month/day plus parameter columns) is aggregated
//! into monthly or seasonal climatologies: plain means for temperature,
//! humidity and pressure; precipitation is summed per (year, period) first
//! and those sums averaged across years.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use chrono::NaiveDate;
use clap::Args;
use tracing::info;

use atmos_common::Season;
use chart_render::{format_tick, nice_ticks, write_figure, Panel, PlotStyle, SvgDocument};
use grid_store::Table;

use crate::util::{figure_paths, load_style};

const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

#[derive(Args, Debug, Clone)]
pub struct MeteoMonthlyArgs {
    /// Station CSV (semicolon or comma delimited)
    #[arg(long)]
    pub input: PathBuf,

    /// Directory for the figure files
    #[arg(long)]
    pub output_dir: PathBuf,

    /// Figure base name
    #[arg(long)]
    pub stem: String,

    /// Year/month/day column names
    #[arg(long, default_value = "year")]
    pub year_col: String,
    #[arg(long, default_value = "month")]
    pub month_col: String,
    #[arg(long, default_value = "day")]
    pub day_col: String,

    /// Parameter columns, mean-aggregated
    #[arg(long, value_delimiter = ',', default_value = "temp,hum,pres")]
    pub mean_params: Vec<String>,

    /// Parameter columns, sum-then-mean aggregated (precipitation)
    #[arg(long, value_delimiter = ',', default_value = "prec")]
    pub sum_params: Vec<String>,

    /// Panel titles, one per parameter in order
    #[arg(
        long,
        value_delimiter = ';',
        default_value = "Air Temperature (degC);Relative Humidity (%);Air Pressure (hPa);Precipitation (mm)"
    )]
    pub titles: Vec<String>,

    /// Optional style YAML
    #[arg(long)]
    pub style: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct MeteoSeasonalArgs {
    #[command(flatten)]
    pub base: MeteoMonthlyArgs,
}

/// One day of station data.
struct StationRow {
    date: NaiveDate,
    year: i32,
    values: Vec<f64>,
}

fn read_station(path: &Path, args: &MeteoMonthlyArgs, params: &[String]) -> Result<Vec<StationRow>> {
    let table = Table::read(path)?;

    let years = table.column_f64(&args.year_col)?;
    let months = table.column_f64(&args.month_col)?;
    let days = table.column_f64(&args.day_col)?;

    let mut columns = Vec::new();
    for param in params {
        columns.push(table.column_f64(param)?);
    }

    let mut rows = Vec::new();
    for i in 0..table.len() {
        let (y, m, d) = (years[i], months[i], days[i]);
        if !(y.is_finite() && m.is_finite() && d.is_finite()) {
            continue;
        }
        // Rows with an impossible date are dropped
        let Some(date) = NaiveDate::from_ymd_opt(y as i32, m as u32, d as u32) else {
            continue;
        };
        rows.push(StationRow {
            date,
            year: y as i32,
            values: columns.iter().map(|c| c[i]).collect(),
        });
    }

    if rows.is_empty() {
        bail!("no valid station rows in {}", path.display());
    }
    Ok(rows)
}

/// Aggregate one parameter into `n_periods` buckets.
fn aggregate(
    rows: &[StationRow],
    param_index: usize,
    period_of: impl Fn(&StationRow) -> usize,
    n_periods: usize,
    sum_first: bool,
) -> Vec<f64> {
    if sum_first {
        // Sum per (year, period), then average the sums across years
        let mut sums: HashMap<(i32, usize), f64> = HashMap::new();
        for row in rows {
            let value = row.values[param_index];
            if value.is_finite() {
                *sums.entry((row.year, period_of(row))).or_insert(0.0) += value;
            }
        }
        let mut per_period: Vec<(f64, usize)> = vec![(0.0, 0); n_periods];
        for ((_, period), total) in sums {
            per_period[period].0 += total;
            per_period[period].1 += 1;
        }
        per_period
            .into_iter()
            .map(|(total, n)| if n == 0 { f64::NAN } else { total / n as f64 })
            .collect()
    } else {
        let mut acc: Vec<(f64, usize)> = vec![(0.0, 0); n_periods];
        for row in rows {
            let value = row.values[param_index];
            if value.is_finite() {
                let period = period_of(row);
                acc[period].0 += value;
                acc[period].1 += 1;
            }
        }
        acc.into_iter()
            .map(|(total, n)| if n == 0 { f64::NAN } else { total / n as f64 })
            .collect()
    }
}

#[allow(clippy::too_many_arguments)]
fn draw_panels(
    style: &PlotStyle,
    titles: &[String],
    period_labels: &[&str],
    series: &[Vec<f64>],
    output_dir: &Path,
    stem: &str,
) -> Result<()> {
    let n_panels = series.len();
    let n_periods = period_labels.len();

    let panel_w = 760.0;
    let panel_h = 150.0;
    let margin_left = 70.0;
    let margin_top = 20.0;
    let gap = 10.0;
    let fig_w = margin_left + panel_w + 30.0;
    let fig_h = margin_top + n_panels as f64 * (panel_h + gap) + 50.0;

    let mut doc = SvgDocument::new(fig_w, fig_h);
    doc.background(&style.background);

    let x_ticks: Vec<(f64, String)> = period_labels
        .iter()
        .enumerate()
        .map(|(i, label)| (i as f64, label.to_string()))
        .collect();

    for (index, values) in series.iter().enumerate() {
        let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if finite.is_empty() {
            continue;
        }
        let v_min = finite.iter().copied().fold(f64::INFINITY, f64::min);
        let v_max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let pad = ((v_max - v_min) * 0.15).max(v_max.abs() * 0.02 + 1e-9);
        // Bars for always-positive quantities grow from zero
        let y_lo = if v_min >= 0.0 && v_min < v_max * 0.3 {
            0.0
        } else {
            v_min - pad
        };
        let y_hi = v_max + pad;

        let top = margin_top + index as f64 * (panel_h + gap);
        let panel = Panel::new(
            margin_left,
            top,
            panel_w,
            panel_h,
            (-0.7, n_periods as f64 - 0.3),
            (y_lo, y_hi),
        );

        let ticks = nice_ticks(y_lo, y_hi, 4);
        let y_ticks: Vec<(f64, String)> = ticks.iter().map(|&t| (t, format_tick(t))).collect();
        panel.grid_y(&mut doc, style, &ticks);

        let color = style.series_color(index).to_string();
        let bars: Vec<(f64, f64)> = values
            .iter()
            .enumerate()
            .map(|(i, &v)| (i as f64, v))
            .collect();
        panel.bars(&mut doc, &bars, 0.6, y_lo.max(0.0), &color, "none", 0.0);

        panel.frame(&mut doc, style);
        panel.x_ticks(&mut doc, style, &x_ticks, index == n_panels - 1);
        panel.y_ticks(&mut doc, style, &y_ticks, true);

        let title = titles.get(index).map(String::as_str).unwrap_or("");
        panel.annotation(&mut doc, style, 0.015, 0.85, title, style.title_size, "normal");
    }

    let (svg_path, png_path) = figure_paths(output_dir, stem);
    write_figure(&doc, &svg_path, &png_path)?;
    info!(svg = %svg_path.display(), panels = n_panels, "Meteorology figure written");
    Ok(())
}

fn all_params(args: &MeteoMonthlyArgs) -> (Vec<String>, Vec<bool>) {
    let mut params = Vec::new();
    let mut sum_flags = Vec::new();
    for p in &args.mean_params {
        params.push(p.clone());
        sum_flags.push(false);
    }
    for p in &args.sum_params {
        params.push(p.clone());
        sum_flags.push(true);
    }
    (params, sum_flags)
}

pub fn run_monthly(args: &MeteoMonthlyArgs) -> Result<()> {
    use chrono::Datelike;

    let style = load_style(args.style.as_deref())?;
    std::fs::create_dir_all(&args.output_dir)?;

    let (params, sum_flags) = all_params(args);
    let rows = read_station(&args.input, args, &params)?;

    let series: Vec<Vec<f64>> = (0..params.len())
        .map(|i| {
            aggregate(
                &rows,
                i,
                |row| row.date.month0() as usize,
                12,
                sum_flags[i],
            )
        })
        .collect();

    draw_panels(
        &style,
        &args.titles,
        &MONTH_LABELS,
        &series,
        &args.output_dir,
        &args.stem,
    )
}

pub fn run_seasonal(args: &MeteoSeasonalArgs) -> Result<()> {
    let args = &args.base;
    let style = load_style(args.style.as_deref())?;
    std::fs::create_dir_all(&args.output_dir)?;

    let (params, sum_flags) = all_params(args);
    let rows = read_station(&args.input, args, &params)?;

    let series: Vec<Vec<f64>> = (0..params.len())
        .map(|i| {
            aggregate(
                &rows,
                i,
                |row| Season::from_date(row.date).index(),
                4,
                sum_flags[i],
            )
        })
        .collect();

    let labels: Vec<&str> = Season::ORDER.iter().map(|s| s.label()).collect();
    draw_panels(
        &style,
        &args.titles,
        &labels,
        &series,
        &args.output_dir,
        &args.stem,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(y: i32, m: u32, d: u32, values: Vec<f64>) -> StationRow {
        StationRow {
            date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            year: y,
            values,
        }
    }

    #[test]
    fn test_mean_aggregation_by_month() {
        use chrono::Datelike;
        let rows = vec![
            row(2019, 1, 1, vec![10.0]),
            row(2020, 1, 1, vec![20.0]),
            row(2019, 2, 1, vec![5.0]),
        ];
        let monthly = aggregate(&rows, 0, |r| r.date.month0() as usize, 12, false);
        assert_eq!(monthly[0], 15.0);
        assert_eq!(monthly[1], 5.0);
        assert!(monthly[2].is_nan());
    }

    #[test]
    fn test_precipitation_sums_then_averages() {
        use chrono::Datelike;
        // Two Januaries: 2019 totals 30 mm, 2020 totals 10 mm
        let rows = vec![
            row(2019, 1, 1, vec![10.0]),
            row(2019, 1, 2, vec![20.0]),
            row(2020, 1, 5, vec![10.0]),
        ];
        let monthly = aggregate(&rows, 0, |r| r.date.month0() as usize, 12, true);
        assert_eq!(monthly[0], 20.0);
    }
}
