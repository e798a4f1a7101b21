//! Chart rendering with `plotters`.
//!
//! Every chart is drawn into an in-memory SVG document and embedded in the
//! report as base64 data, so nothing touches the filesystem and no system
//! fonts are required.

mod distribution;
mod heatmap;
mod relationship;

pub use distribution::{categorical_distribution, numeric_distribution};
pub use heatmap::{ColorScale, correlation_heatmap};
pub use relationship::{category_numeric_plot, pair_plot, scatter_plot};

use crate::error::{InsightError, Result};
use crate::profiler::quantile;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::ops::Range;

/// MIME type of the images produced by this module.
pub const IMAGE_MIME: &str = "image/svg+xml";

pub(crate) type SvgArea<'a> = DrawingArea<SVGBackend<'a>, Shift>;
pub(crate) type DrawResult = std::result::Result<(), Box<dyn std::error::Error>>;

// =============================================================================
// Rendering
// =============================================================================

/// Draw a chart on a fresh white canvas and return the SVG document.
pub(crate) fn render_svg<F>(chart: &str, size: (u32, u32), draw: F) -> Result<String>
where
    F: FnOnce(&SvgArea<'_>) -> DrawResult,
{
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, size).into_drawing_area();
        root.fill(&WHITE).map_err(|e| InsightError::plot(chart, e))?;
        draw(&root).map_err(|e| InsightError::plot(chart, e))?;
        root.present().map_err(|e| InsightError::plot(chart, e))?;
    }
    Ok(svg)
}

/// Base64-encode an SVG document for use in a `data:` URI.
pub fn encode_svg(svg: &str) -> String {
    STANDARD.encode(svg.as_bytes())
}

/// Write a centered message on an area that has nothing to plot.
pub(crate) fn draw_empty_notice(area: &SvgArea<'_>, message: &str) -> DrawResult {
    let (width, height) = area.dim_in_pixel();
    let style = text_style(16).pos(Pos::new(HPos::Center, VPos::Center));
    area.draw(&Text::new(
        message.to_string(),
        (width as i32 / 2, height as i32 / 2),
        style,
    ))?;
    Ok(())
}

// =============================================================================
// Styling
// =============================================================================

pub(crate) const BAR_COLOR: RGBColor = RGBColor(76, 114, 176);
pub(crate) const ACCENT_COLOR: RGBColor = RGBColor(221, 132, 82);
pub(crate) const BOX_COLOR: RGBColor = RGBColor(129, 178, 214);

pub(crate) fn text_style(size: u32) -> TextStyle<'static> {
    ("sans-serif", size).into_font().color(&BLACK)
}

pub(crate) use plotters::style::text_anchor::{HPos, Pos, VPos};

/// Linear blend between two colors, `t` in `[0, 1]`.
pub(crate) fn blend(a: RGBColor, b: RGBColor, t: f64) -> RGBColor {
    let t = t.clamp(0.0, 1.0);
    let mix = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * t).round() as u8;
    RGBColor(mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}

// =============================================================================
// Geometry helpers
// =============================================================================

/// Axis range covering all values with a small margin on both sides.
pub(crate) fn padded_range<'a>(values: impl IntoIterator<Item = &'a f64>) -> Range<f64> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &v in values {
        min = min.min(v);
        max = max.max(v);
    }
    if !min.is_finite() || !max.is_finite() {
        return 0.0..1.0;
    }
    if (max - min).abs() < f64::EPSILON {
        return (min - 0.5)..(max + 0.5);
    }
    let pad = (max - min) * 0.05;
    (min - pad)..(max + pad)
}

/// Label for a category axis whose categories sit at integer positions.
pub(crate) fn category_label(labels: &[String], position: f64) -> String {
    let rounded = position.round();
    if (position - rounded).abs() > 1e-6 || rounded < 0.0 {
        return String::new();
    }
    labels.get(rounded as usize).cloned().unwrap_or_default()
}

/// Equal-width histogram of a set of values.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Histogram {
    pub start: f64,
    pub bin_width: f64,
    pub counts: Vec<usize>,
}

impl Histogram {
    /// Bin values using Sturges' rule (capped at 50 bins).
    pub fn from_values(values: &[f64]) -> Self {
        let n = values.len().max(1) as f64;
        let bins = ((n.log2().ceil() as usize) + 1).clamp(1, 50);

        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let (start, end) = if !min.is_finite() {
            (0.0, 1.0)
        } else if max - min < f64::EPSILON {
            (min - 0.5, max + 0.5)
        } else {
            (min, max)
        };

        let bin_width = (end - start) / bins as f64;
        let mut counts = vec![0usize; bins];
        for &v in values {
            let idx = (((v - start) / bin_width) as usize).min(bins - 1);
            counts[idx] += 1;
        }

        Self {
            start,
            bin_width,
            counts,
        }
    }

    pub fn end(&self) -> f64 {
        self.start + self.bin_width * self.counts.len() as f64
    }

    pub fn max_count(&self) -> usize {
        self.counts.iter().copied().max().unwrap_or(0)
    }

    /// Bars as `(left, right, count)`.
    pub fn bars(&self) -> impl Iterator<Item = (f64, f64, usize)> + '_ {
        self.counts.iter().enumerate().map(move |(i, &count)| {
            let left = self.start + i as f64 * self.bin_width;
            (left, left + self.bin_width, count)
        })
    }
}

/// Gaussian kernel density estimate evaluated at `points`.
///
/// Uses Scott's rule for the bandwidth. Returns `None` when the data has
/// fewer than two values or no spread.
pub(crate) fn gaussian_kde(values: &[f64], points: &[f64]) -> Option<Vec<f64>> {
    let n = values.len();
    if n < 2 {
        return None;
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    let std = variance.sqrt();
    if std <= 0.0 || !std.is_finite() {
        return None;
    }

    let bandwidth = std * (n as f64).powf(-0.2);
    let norm = 1.0 / (n as f64 * bandwidth * (2.0 * std::f64::consts::PI).sqrt());
    Some(
        points
            .iter()
            .map(|&x| {
                values
                    .iter()
                    .map(|&v| (-0.5 * ((x - v) / bandwidth).powi(2)).exp())
                    .sum::<f64>()
                    * norm
            })
            .collect(),
    )
}

/// Evenly spaced points over a range, endpoints included.
pub(crate) fn linspace(range: &Range<f64>, count: usize) -> Vec<f64> {
    if count < 2 {
        return vec![range.start];
    }
    let step = (range.end - range.start) / (count - 1) as f64;
    (0..count).map(|i| range.start + step * i as f64).collect()
}

/// Five-number summary used to draw a box plot.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct BoxStats {
    pub lower_whisker: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
}

impl BoxStats {
    /// Whiskers reach the furthest values within 1.5 * IQR of the box.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let q1 = quantile(&sorted, 0.25);
        let median = quantile(&sorted, 0.5);
        let q3 = quantile(&sorted, 0.75);
        let iqr = q3 - q1;
        let low_fence = q1 - 1.5 * iqr;
        let high_fence = q3 + 1.5 * iqr;

        let inside: Vec<f64> = sorted
            .iter()
            .copied()
            .filter(|v| *v >= low_fence && *v <= high_fence)
            .collect();
        let lower_whisker = inside.first().copied().unwrap_or(q1);
        let upper_whisker = inside.last().copied().unwrap_or(q3);
        let outliers = sorted
            .into_iter()
            .filter(|v| *v < low_fence || *v > high_fence)
            .collect();

        Some(Self {
            lower_whisker,
            q1,
            median,
            q3,
            upper_whisker,
            outliers,
        })
    }

    /// Shapes of a box centered at `center` on the category axis.
    ///
    /// With `horizontal` the values run along x and the category along y.
    pub fn glyph(&self, center: f64, half_width: f64, horizontal: bool) -> BoxGlyph {
        let at = |value: f64, offset: f64| {
            if horizontal {
                (value, center + offset)
            } else {
                (center + offset, value)
            }
        };
        let cap = half_width / 2.0;

        BoxGlyph {
            body: [at(self.q1, -half_width), at(self.q3, half_width)],
            segments: vec![
                [at(self.median, -half_width), at(self.median, half_width)],
                [at(self.lower_whisker, 0.0), at(self.q1, 0.0)],
                [at(self.q3, 0.0), at(self.upper_whisker, 0.0)],
                [at(self.lower_whisker, -cap), at(self.lower_whisker, cap)],
                [at(self.upper_whisker, -cap), at(self.upper_whisker, cap)],
            ],
            outliers: self.outliers.iter().map(|&v| at(v, 0.0)).collect(),
        }
    }
}

/// Drawable pieces of a box plot in data coordinates.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct BoxGlyph {
    pub body: [(f64, f64); 2],
    pub segments: Vec<[(f64, f64); 2]>,
    pub outliers: Vec<(f64, f64)>,
}
