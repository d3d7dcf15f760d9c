//! Waveform oscilloscope widget.
//!
//! Maps the sample series onto a ratatui line chart: X is the sample
//! index normalized into [0,1], Y is the amplitude. The Y range is a
//! policy, not a constant: `Fixed` keeps the classic [-1,1] window,
//! `Fit` rescales to the current extent so quiet signals stay legible.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};

use crate::config::AxisMode;

/// Smallest half-range the fit policy will zoom to. Keeps noise floors
/// from blowing up into a full-screen waveform.
const MIN_FIT_AMPLITUDE: f64 = 0.01;

/// Maps samples to chart points, index → X in [0,1], amplitude → Y.
///
/// An empty series maps to no points at all.
pub fn series_points(samples: &[f64]) -> Vec<(f64, f64)> {
    let len = samples.len();
    samples
        .iter()
        .enumerate()
        .map(|(i, &sample)| (i as f64 / len as f64, sample))
        .collect()
}

/// Y-axis bounds for the given series under the chosen policy.
pub fn y_bounds(samples: &[f64], mode: AxisMode) -> [f64; 2] {
    match mode {
        AxisMode::Fixed => [-1.0, 1.0],
        AxisMode::Fit => {
            let peak = samples
                .iter()
                .fold(0.0_f64, |acc, &s| acc.max(s.abs()))
                .max(MIN_FIT_AMPLITUDE);
            // Small headroom so the trace never touches the border.
            let half = peak * 1.1;
            [-half, half]
        }
    }
}

/// Renders the waveform chart. An empty series draws an empty chart.
pub fn render_waveform(frame: &mut Frame, area: Rect, samples: &[f64], axis: AxisMode) {
    let title = format!(" Waveform ({axis}) ");
    let block = Block::default().title(title).borders(Borders::ALL);

    let data = series_points(samples);

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Cyan))
        .data(&data);

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([0.0, 1.0])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds(y_bounds(samples, axis))
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_series_draws_no_points() {
        assert!(series_points(&[]).is_empty());
    }

    #[test]
    fn points_preserve_order_and_span_unit_interval() {
        let points = series_points(&[0.5, -0.5, 0.25, 0.0]);
        assert_eq!(points.len(), 4);
        assert_eq!(points[0], (0.0, 0.5));
        assert_eq!(points[1], (0.25, -0.5));
        assert_eq!(points[3], (0.75, 0.0));
        assert!(points.iter().all(|&(x, _)| (0.0..1.0).contains(&x)));
    }

    #[test]
    fn fixed_bounds_ignore_the_data() {
        assert_eq!(y_bounds(&[0.001, -0.002], AxisMode::Fixed), [-1.0, 1.0]);
        assert_eq!(y_bounds(&[], AxisMode::Fixed), [-1.0, 1.0]);
    }

    #[test]
    fn fit_bounds_track_the_peak_symmetrically() {
        let bounds = y_bounds(&[0.1, -0.5, 0.3], AxisMode::Fit);
        assert_eq!(bounds[0], -bounds[1]);
        assert!((bounds[1] - 0.55).abs() < 1e-12);
    }

    #[test]
    fn fit_bounds_never_zoom_below_the_floor() {
        let bounds = y_bounds(&[0.0001, -0.0002], AxisMode::Fit);
        assert!(bounds[1] >= MIN_FIT_AMPLITUDE);
        let empty = y_bounds(&[], AxisMode::Fit);
        assert!(empty[1] >= MIN_FIT_AMPLITUDE);
    }
}
