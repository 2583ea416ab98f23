//! Comparative scaling plots rendered to SVG.

use std::fmt::Display;
use std::fs;
use std::path::Path;

use plotters::prelude::*;
use shared::{AppError, AppResult};
use tracing::{info, warn};

use crate::curve::{non_decreasing_fraction, smooth_curve, SMOOTHING_SAMPLES};

const FIGURE_SIZE: (u32, u32) = (1024, 768);
const MONOTONIC_WARN_THRESHOLD: f64 = 0.9;

#[derive(Debug, Clone)]
pub struct Curve {
    pub label: String,
    pub points: Vec<(f64, f64)>,
}

/// A figure collecting one smoothed curve per solver.
#[derive(Debug, Clone)]
pub struct Figure {
    title: String,
    x_label: String,
    y_label: String,
    curves: Vec<Curve>,
}

impl Figure {
    pub fn new(title: impl Into<String>, x_label: impl Into<String>, y_label: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            x_label: x_label.into(),
            y_label: y_label.into(),
            curves: Vec::new(),
        }
    }

    pub fn curves(&self) -> &[Curve] {
        &self.curves
    }

    /// Smooth `y` against `x` and add it as a labelled curve.
    pub fn plot(&mut self, x: &[f64], y: &[f64], label: impl Into<String>) -> AppResult<()> {
        let label = label.into();
        let points = smooth_curve(x, y, SMOOTHING_SAMPLES)?;

        if x.windows(2).all(|pair| pair[1] > pair[0]) {
            let steady = non_decreasing_fraction(&points, 1e-9);
            if steady < MONOTONIC_WARN_THRESHOLD {
                warn!(
                    curve = %label,
                    steady = format!("{:.1}%", steady * 100.0),
                    "smoothed x path overshoots heavily"
                );
            }
        }

        self.curves.push(Curve { label, points });
        Ok(())
    }

    /// Write the figure as SVG with title, axis labels and an upper-left legend.
    pub fn save(&self, path: &Path) -> AppResult<()> {
        let ((x_min, x_max), (y_min, y_max)) = self.bounds()?;
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|err| AppError::io(format!("failed to create plot directory {parent:?}"), err))?;
        }

        let root = SVGBackend::new(path, FIGURE_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(render_error)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(self.title.as_str(), ("sans-serif", 28).into_font())
            .margin(16)
            .x_label_area_size(48)
            .y_label_area_size(72)
            .build_cartesian_2d(x_min..x_max, y_min..y_max)
            .map_err(render_error)?;

        chart
            .configure_mesh()
            .x_desc(self.x_label.as_str())
            .y_desc(self.y_label.as_str())
            .draw()
            .map_err(render_error)?;

        for (index, curve) in self.curves.iter().enumerate() {
            let colour = Palette99::pick(index).to_rgba();
            chart
                .draw_series(LineSeries::new(
                    curve.points.iter().copied(),
                    colour.stroke_width(2),
                ))
                .map_err(render_error)?
                .label(curve.label.as_str())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], colour.stroke_width(2)));
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()
            .map_err(render_error)?;

        root.present().map_err(render_error)?;
        info!(path = ?path, curves = self.curves.len(), "saved plot");
        Ok(())
    }

    fn bounds(&self) -> AppResult<((f64, f64), (f64, f64))> {
        let mut points = self.curves.iter().flat_map(|curve| curve.points.iter());
        let first = points
            .next()
            .ok_or_else(|| AppError::Render(format!("figure '{}' has no curves", self.title)))?;
        let (mut x_min, mut x_max, mut y_min, mut y_max) = (first.0, first.0, first.1, first.1);
        for &(x, y) in points {
            x_min = x_min.min(x);
            x_max = x_max.max(x);
            y_min = y_min.min(y);
            y_max = y_max.max(y);
        }

        // Timings start from zero; overshoot below it stays visible.
        let y_min = y_min.min(0.0);
        Ok((padded(x_min, x_max), padded(y_min, y_max * 1.05)))
    }
}

fn padded(min: f64, max: f64) -> (f64, f64) {
    if max > min {
        (min, max)
    } else {
        (min - 0.5, min + 0.5)
    }
}

fn render_error<E: Display>(err: E) -> AppError {
    AppError::Render(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plot_adds_one_smoothed_curve_per_call() {
        let mut figure = Figure::new("Small General Tests", "Data size", "Time (ms)");
        let x = [5.0, 10.0, 15.0, 20.0];
        figure.plot(&x, &[0.1, 0.2, 0.4, 0.8], "Brute").unwrap();
        figure.plot(&x, &[0.1, 0.1, 0.1, 0.1], "FPTAS").unwrap();

        assert_eq!(figure.curves().len(), 2);
        assert_eq!(figure.curves()[0].label, "Brute");
        assert_eq!(figure.curves()[1].points.len(), SMOOTHING_SAMPLES);
    }

    #[test]
    fn empty_figure_cannot_be_saved() {
        let dir = tempfile::tempdir().unwrap();
        let figure = Figure::new("Empty", "x", "y");
        let err = figure.save(&dir.path().join("empty.svg")).unwrap_err();
        assert!(matches!(err, AppError::Render(_)));
    }

    #[test]
    fn flat_series_get_a_non_degenerate_range() {
        assert_eq!(padded(2.0, 2.0), (1.5, 2.5));
        assert_eq!(padded(0.0, 3.0), (0.0, 3.0));
    }

    #[test]
    fn saves_svg_with_title_and_legend() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plots").join("Increasing Weight.svg");
        let mut figure = Figure::new("Increasing Weight", "Weight", "Time (ms)");
        let x = [100.0, 1100.0, 2100.0, 3100.0, 4100.0];
        figure.plot(&x, &[1.0, 2.0, 4.0, 7.0, 11.0], "Weights dynamic").unwrap();
        figure.plot(&x, &[1.0, 1.0, 1.1, 1.0, 1.2], "Values dynamic").unwrap();

        figure.save(&path).unwrap();

        let svg = fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Increasing Weight"));
        assert!(svg.contains("Weights dynamic"));
        assert!(svg.contains("Values dynamic"));
    }
}
