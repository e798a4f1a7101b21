//! Per-column distribution charts.

use super::{
    BAR_COLOR, BOX_COLOR, BoxStats, DrawResult, HPos, Histogram, Pos, SvgArea, VPos,
    category_label, draw_empty_notice, gaussian_kde, linspace, padded_range, render_svg,
    text_style,
};
use crate::error::Result;
use crate::types::FrequencyEntry;
use crate::utils::truncate_label;
use plotters::prelude::*;

const KDE_POINTS: usize = 200;

/// Histogram with a density curve next to a box plot.
pub fn numeric_distribution(column: &str, values: &[f64]) -> Result<String> {
    render_svg(column, (1000, 400), |root| {
        let root = root.titled(&format!("Distribution of {}", column), text_style(20))?;
        if values.is_empty() {
            return draw_empty_notice(&root, "No values to plot");
        }

        let panels = root.split_evenly((1, 2));
        draw_histogram(&panels[0], column, values)?;
        draw_box(&panels[1], column, values)?;
        Ok(())
    })
}

fn draw_histogram(area: &SvgArea<'_>, column: &str, values: &[f64]) -> DrawResult {
    let hist = Histogram::from_values(values);
    let x_range = hist.start..hist.end();
    let y_max = (hist.max_count() as f64 * 1.1).max(1.0);

    let mut chart = ChartBuilder::on(area)
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(x_range.clone(), 0f64..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc(column)
        .y_desc("Count")
        .label_style(text_style(12))
        .draw()?;

    chart.draw_series(hist.bars().map(|(left, right, count)| {
        Rectangle::new([(left, 0.0), (right, count as f64)], BAR_COLOR.mix(0.7).filled())
    }))?;

    // Density scaled to counts so it shares the histogram's axis.
    let points = linspace(&x_range, KDE_POINTS);
    if let Some(density) = gaussian_kde(values, &points) {
        let scale = values.len() as f64 * hist.bin_width;
        chart.draw_series(LineSeries::new(
            points.iter().zip(density).map(|(&x, d)| (x, d * scale)),
            BAR_COLOR.stroke_width(2),
        ))?;
    }
    Ok(())
}

fn draw_box(area: &SvgArea<'_>, column: &str, values: &[f64]) -> DrawResult {
    let Some(stats) = BoxStats::from_values(values) else {
        return draw_empty_notice(area, "No values to plot");
    };
    let x_range = padded_range(values);

    let mut chart = ChartBuilder::on(area)
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(20)
        .build_cartesian_2d(x_range, -1f64..1f64)?;

    chart
        .configure_mesh()
        .disable_y_mesh()
        .y_labels(0)
        .x_desc(column)
        .label_style(text_style(12))
        .draw()?;

    let glyph = stats.glyph(0.0, 0.4, true);
    chart.draw_series(std::iter::once(Rectangle::new(glyph.body, BOX_COLOR.filled())))?;
    chart.draw_series(std::iter::once(Rectangle::new(glyph.body, BLACK.stroke_width(1))))?;
    chart.draw_series(
        glyph
            .segments
            .iter()
            .map(|segment| PathElement::new(segment.to_vec(), BLACK.stroke_width(1))),
    )?;
    chart.draw_series(
        glyph
            .outliers
            .iter()
            .map(|&point| Circle::new(point, 3, BLACK.stroke_width(1))),
    )?;
    Ok(())
}

/// Horizontal bar chart of the most frequent values, largest on top.
pub fn categorical_distribution(column: &str, top: &[FrequencyEntry]) -> Result<String> {
    render_svg(column, (1000, 400), |root| {
        let root = root.titled(&format!("Top values of {}", column), text_style(20))?;
        if top.is_empty() {
            return draw_empty_notice(&root, "No values to plot");
        }

        // Category i is drawn at y = n - 1 - i so the most frequent is on top.
        let n = top.len();
        let labels: Vec<String> = top
            .iter()
            .rev()
            .map(|entry| truncate_label(&entry.value, 24))
            .collect();
        let x_max = top.iter().map(|e| e.count).max().unwrap_or(1) as f64 * 1.15;

        let mut chart = ChartBuilder::on(&root)
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(180)
            .build_cartesian_2d(0f64..x_max, -0.5f64..(n as f64 - 0.5))?;

        chart
            .configure_mesh()
            .disable_y_mesh()
            .y_labels(n * 2 + 1)
            .y_label_formatter(&|y| category_label(&labels, *y))
            .x_desc("Count")
            .label_style(text_style(12))
            .draw()?;

        chart.draw_series(top.iter().enumerate().map(|(i, entry)| {
            let y = (n - 1 - i) as f64;
            Rectangle::new(
                [(0.0, y - 0.4), (entry.count as f64, y + 0.4)],
                BAR_COLOR.filled(),
            )
        }))?;

        let count_style = text_style(11).pos(Pos::new(HPos::Left, VPos::Center));
        chart.draw_series(top.iter().enumerate().map(|(i, entry)| {
            let y = (n - 1 - i) as f64;
            Text::new(
                format!(" {}", entry.count),
                (entry.count as f64, y),
                count_style.clone(),
            )
        }))?;
        Ok(())
    })
}
