//! Multi-column relationship charts.

use super::{
    ACCENT_COLOR, BAR_COLOR, BOX_COLOR, BoxStats, DrawResult, Histogram, SvgArea,
    category_label, draw_empty_notice, padded_range, render_svg, text_style,
};
use crate::error::Result;
use crate::profiler::calculate_mean;
use crate::utils::truncate_label;
use plotters::prelude::*;

const PAIR_CELL: u32 = 220;

/// Grid of scatter plots between every pair of columns, with histograms on
/// the diagonal.
pub fn pair_plot(columns: &[(String, Vec<Option<f64>>)]) -> Result<String> {
    let k = columns.len().max(1) as u32;
    let size = (PAIR_CELL * k, PAIR_CELL * k + 40);

    render_svg("pairplot", size, |root| {
        let root = root.titled("Pair Plot", text_style(20))?;
        let cells = root.split_evenly((k as usize, k as usize));

        for (i, (y_name, y_values)) in columns.iter().enumerate() {
            for (j, (x_name, x_values)) in columns.iter().enumerate() {
                let area = &cells[i * columns.len() + j];
                let x_desc = if i + 1 == columns.len() { x_name.as_str() } else { "" };
                let y_desc = if j == 0 { y_name.as_str() } else { "" };
                if i == j {
                    let values: Vec<f64> = x_values.iter().flatten().copied().collect();
                    draw_mini_histogram(area, &values, x_desc, y_desc)?;
                } else {
                    let points = complete_pairs(x_values, y_values);
                    draw_points(area, &points, x_desc, y_desc, 2)?;
                }
            }
        }
        Ok(())
    })
}

/// Scatter plot of two numeric columns.
pub fn scatter_plot(
    x_name: &str,
    x_values: &[Option<f64>],
    y_name: &str,
    y_values: &[Option<f64>],
) -> Result<String> {
    render_svg("scatterplot", (900, 600), |root| {
        let root = root.titled(&format!("{} vs {}", x_name, y_name), text_style(20))?;
        let points = complete_pairs(x_values, y_values);
        if points.is_empty() {
            return draw_empty_notice(&root, "No complete pairs to plot");
        }
        draw_points(&root, &points, x_name, y_name, 3)
    })
}

/// Box plots and mean bars of a numeric column per category.
///
/// `groups` holds the category label and the numeric values of its rows,
/// in display order.
pub fn category_numeric_plot(
    category: &str,
    numeric: &str,
    groups: &[(String, Vec<f64>)],
) -> Result<String> {
    render_svg("cat_num", (1200, 500), |root| {
        let root = root.titled(&format!("{} by {}", numeric, category), text_style(20))?;
        if groups.iter().all(|(_, values)| values.is_empty()) {
            return draw_empty_notice(&root, "No values to plot");
        }

        let labels: Vec<String> = groups
            .iter()
            .map(|(label, _)| truncate_label(label, 12))
            .collect();
        let panels = root.split_evenly((1, 2));
        draw_grouped_boxes(&panels[0], &labels, groups, category, numeric)?;
        draw_group_means(&panels[1], &labels, groups, category, numeric)?;
        Ok(())
    })
}

fn complete_pairs(x: &[Option<f64>], y: &[Option<f64>]) -> Vec<(f64, f64)> {
    x.iter()
        .zip(y)
        .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
        .collect()
}

fn draw_points(
    area: &SvgArea<'_>,
    points: &[(f64, f64)],
    x_desc: &str,
    y_desc: &str,
    radius: i32,
) -> DrawResult {
    let x_range = padded_range(points.iter().map(|p| &p.0));
    let y_range = padded_range(points.iter().map(|p| &p.1));

    let mut chart = ChartBuilder::on(area)
        .margin(6)
        .x_label_area_size(if x_desc.is_empty() { 20 } else { 40 })
        .y_label_area_size(if y_desc.is_empty() { 35 } else { 55 })
        .build_cartesian_2d(x_range, y_range)?;

    chart
        .configure_mesh()
        .x_labels(5)
        .y_labels(5)
        .x_desc(x_desc)
        .y_desc(y_desc)
        .label_style(text_style(10))
        .draw()?;

    chart.draw_series(
        points
            .iter()
            .map(|&p| Circle::new(p, radius, BAR_COLOR.mix(0.6).filled())),
    )?;
    Ok(())
}

fn draw_mini_histogram(area: &SvgArea<'_>, values: &[f64], x_desc: &str, y_desc: &str) -> DrawResult {
    if values.is_empty() {
        return draw_empty_notice(area, "no data");
    }
    let hist = Histogram::from_values(values);
    let y_max = (hist.max_count() as f64 * 1.1).max(1.0);

    let mut chart = ChartBuilder::on(area)
        .margin(6)
        .x_label_area_size(if x_desc.is_empty() { 20 } else { 40 })
        .y_label_area_size(if y_desc.is_empty() { 35 } else { 55 })
        .build_cartesian_2d(hist.start..hist.end(), 0f64..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(5)
        .y_labels(5)
        .x_desc(x_desc)
        .y_desc(y_desc)
        .label_style(text_style(10))
        .draw()?;

    chart.draw_series(hist.bars().map(|(left, right, count)| {
        Rectangle::new([(left, 0.0), (right, count as f64)], BAR_COLOR.mix(0.7).filled())
    }))?;
    Ok(())
}

fn draw_grouped_boxes(
    area: &SvgArea<'_>,
    labels: &[String],
    groups: &[(String, Vec<f64>)],
    category: &str,
    numeric: &str,
) -> DrawResult {
    let n = groups.len();
    let y_range = padded_range(groups.iter().flat_map(|(_, values)| values.iter()));

    let mut chart = ChartBuilder::on(area)
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), y_range)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(n * 2 + 1)
        .x_label_formatter(&|x| category_label(labels, *x))
        .x_desc(category)
        .y_desc(numeric)
        .label_style(text_style(11))
        .draw()?;

    for (i, (_, values)) in groups.iter().enumerate() {
        let Some(stats) = BoxStats::from_values(values) else {
            continue;
        };
        let glyph = stats.glyph(i as f64, 0.35, false);
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
    }
    Ok(())
}

fn draw_group_means(
    area: &SvgArea<'_>,
    labels: &[String],
    groups: &[(String, Vec<f64>)],
    category: &str,
    numeric: &str,
) -> DrawResult {
    let n = groups.len();
    let means: Vec<Option<f64>> = groups
        .iter()
        .map(|(_, values)| (!values.is_empty()).then(|| calculate_mean(values)))
        .collect();

    let low = means.iter().flatten().copied().fold(0.0f64, f64::min);
    let high = means.iter().flatten().copied().fold(0.0f64, f64::max);
    let pad = ((high - low) * 0.1).max(1e-9);
    let y_range = if high - low < f64::EPSILON {
        (low - 1.0)..(high + 1.0)
    } else {
        (low - if low < 0.0 { pad } else { 0.0 })..(high + if high > 0.0 { pad } else { 0.0 })
    };

    let mut chart = ChartBuilder::on(area)
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), y_range)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(n * 2 + 1)
        .x_label_formatter(&|x| category_label(labels, *x))
        .x_desc(category)
        .y_desc(format!("mean {}", numeric))
        .label_style(text_style(11))
        .draw()?;

    chart.draw_series(means.iter().enumerate().filter_map(|(i, mean)| {
        let mean = (*mean)?;
        let x = i as f64;
        Some(Rectangle::new([(x - 0.35, 0.0), (x + 0.35, mean)], ACCENT_COLOR.filled()))
    }))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(name: &str, values: &[f64]) -> (String, Vec<Option<f64>>) {
        (name.to_string(), values.iter().copied().map(Some).collect())
    }

    #[test]
    fn test_pair_plot_renders_grid() {
        let columns = vec![
            column("a", &[1.0, 2.0, 3.0, 4.0]),
            column("b", &[2.0, 1.0, 4.0, 3.0]),
            column("c", &[5.0, 5.5, 6.0, 9.0]),
        ];
        let svg = pair_plot(&columns).unwrap();
        assert!(svg.contains("Pair Plot"));
        assert!(svg.contains("<circle"));
    }

    #[test]
    fn test_scatter_plot_skips_incomplete_rows() {
        let svg = scatter_plot(
            "x",
            &[Some(1.0), None, Some(3.0)],
            "y",
            &[Some(2.0), Some(5.0), None],
        )
        .unwrap();
        assert!(svg.contains("x vs y"));
    }

    #[test]
    fn test_scatter_plot_without_pairs() {
        let svg = scatter_plot("x", &[None], "y", &[Some(1.0)]).unwrap();
        assert!(svg.contains("No complete pairs to plot"));
    }

    #[test]
    fn test_category_numeric_plot() {
        let groups = vec![
            ("north".to_string(), vec![1.0, 2.0, 3.0]),
            ("south".to_string(), vec![-4.0, 5.0]),
            ("east".to_string(), Vec::new()),
        ];
        let svg = category_numeric_plot("region", "sales", &groups).unwrap();
        assert!(svg.contains("sales by region"));
        assert!(svg.contains("north"));
    }

    #[test]
    fn test_complete_pairs() {
        let pairs = complete_pairs(&[Some(1.0), None, Some(2.0)], &[Some(3.0), Some(4.0), None]);
        assert_eq!(pairs, vec![(1.0, 3.0)]);
    }
}
