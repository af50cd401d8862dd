use plotters::coord::Shift;
use plotters::prelude::*;
use std::fmt::Display;
use std::ops::Range;
use std::path::Path;

use crate::error::{Error, Result};
use crate::experiment::ExperimentResults;

const PALETTE: [RGBColor; 6] = [BLUE, GREEN, RED, CYAN, MAGENTA, BLACK];

fn plot_error(e: impl Display) -> Error {
    Error::Plot(e.to_string())
}

/// Draws average reward and percent optimal action side by side, one line
/// per experiment.
pub fn plot_results(results: &[ExperimentResults], path: &Path) -> Result<()> {
    let plays: usize = results
        .iter()
        .map(|r| r.average_reward.len())
        .max()
        .unwrap_or(0);
    if plays == 0 {
        return Err(Error::Plot("nothing to plot".to_string()));
    }
    let rewards = results.iter().flat_map(|r| r.average_reward.iter().copied());
    let (low, high) = rewards.fold((0.0f64, 1.5f64), |(lo, hi), v| (lo.min(v), hi.max(v)));

    let root = BitMapBackend::new(path, (1280, 540)).into_drawing_area();
    root.fill(&WHITE).map_err(plot_error)?;
    let (left, right) = root.split_horizontally(640);

    draw_panel(
        &left,
        "Average reward",
        results,
        |r| &r.average_reward,
        plays,
        low..high,
    )?;
    draw_panel(
        &right,
        "Percent optimal action",
        results,
        |r| &r.percent_optimal,
        plays,
        0.0..100.0,
    )?;
    root.present().map_err(plot_error)?;
    Ok(())
}

fn draw_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    y_desc: &str,
    results: &[ExperimentResults],
    series: fn(&ExperimentResults) -> &Vec<f64>,
    plays: usize,
    y_range: Range<f64>,
) -> Result<()> {
    let mut chart = ChartBuilder::on(area)
        .caption(y_desc, ("sans-serif", 24))
        .margin(12)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0f64..plays as f64, y_range)
        .map_err(plot_error)?;
    chart
        .configure_mesh()
        .x_desc("Plays")
        .y_desc(y_desc)
        .draw()
        .map_err(plot_error)?;

    for (i, result) in results.iter().enumerate() {
        let color: RGBColor = PALETTE[i % PALETTE.len()];
        let points = series(result)
            .iter()
            .enumerate()
            .map(|(x, y)| (x as f64, *y));
        chart
            .draw_series(LineSeries::new(points, &color))
            .map_err(plot_error)?
            .label(format!("epsilon = {}", result.config.epsilon))
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &color));
    }
    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(plot_error)?;
    Ok(())
}
