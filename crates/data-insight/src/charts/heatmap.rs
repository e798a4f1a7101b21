//! Annotated heatmaps for association matrices.

use super::{DrawResult, HPos, Pos, SvgArea, VPos, blend, render_svg, text_style};
use crate::error::Result;
use crate::types::CorrelationMatrix;
use crate::utils::truncate_label;
use plotters::prelude::*;

const LABEL_WIDTH: i32 = 150;
const TITLE_HEIGHT: i32 = 50;
const AXIS_HEIGHT: i32 = 40;
const LEGEND_WIDTH: i32 = 90;
const MISSING_COLOR: RGBColor = RGBColor(235, 235, 235);

/// Color mapping for matrix cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorScale {
    /// Blue through white to red over `[-1, 1]` (signed correlations).
    Diverging,
    /// White to blue over `[0, 1]` (association strengths).
    Sequential,
}

impl ColorScale {
    fn range(&self) -> (f64, f64) {
        match self {
            Self::Diverging => (-1.0, 1.0),
            Self::Sequential => (0.0, 1.0),
        }
    }

    pub(crate) fn color(&self, value: f64) -> RGBColor {
        const BLUE_END: RGBColor = RGBColor(59, 76, 192);
        const NEUTRAL: RGBColor = RGBColor(221, 221, 221);
        const RED_END: RGBColor = RGBColor(180, 4, 38);
        const LIGHT: RGBColor = RGBColor(247, 251, 255);
        const DARK_BLUE: RGBColor = RGBColor(8, 48, 107);

        match self {
            Self::Diverging => {
                if value < 0.0 {
                    blend(NEUTRAL, BLUE_END, -value)
                } else {
                    blend(NEUTRAL, RED_END, value)
                }
            }
            Self::Sequential => blend(LIGHT, DARK_BLUE, value),
        }
    }

    /// Whether annotations on a cell of this value need light text.
    fn needs_light_text(&self, value: f64) -> bool {
        match self {
            Self::Diverging => value.abs() > 0.6,
            Self::Sequential => value > 0.6,
        }
    }
}

/// Render a square matrix as a heatmap with the value written in each cell.
///
/// Undefined cells are drawn grey and labelled `n/a`.
pub fn correlation_heatmap(
    title: &str,
    matrix: &CorrelationMatrix,
    scale: ColorScale,
) -> Result<String> {
    let n = matrix.len().max(1) as i32;
    let cell = (560 / n).clamp(40, 90);
    let width = LABEL_WIDTH + n * cell + LEGEND_WIDTH;
    let height = TITLE_HEIGHT + n * cell + AXIS_HEIGHT;

    render_svg(title, (width as u32, height as u32), |root| {
        draw_title(root, title, width)?;
        draw_cells(root, matrix, scale, cell)?;
        draw_labels(root, matrix, cell)?;
        draw_legend(root, scale, LABEL_WIDTH + n * cell + 20, n * cell)?;
        Ok(())
    })
}

fn draw_title(root: &SvgArea<'_>, title: &str, width: i32) -> DrawResult {
    let style = text_style(18).pos(Pos::new(HPos::Center, VPos::Center));
    root.draw(&Text::new(title.to_string(), (width / 2, TITLE_HEIGHT / 2), style))?;
    Ok(())
}

fn draw_cells(
    root: &SvgArea<'_>,
    matrix: &CorrelationMatrix,
    scale: ColorScale,
    cell: i32,
) -> DrawResult {
    let dark = text_style(12).pos(Pos::new(HPos::Center, VPos::Center));
    let light = ("sans-serif", 12)
        .into_font()
        .color(&WHITE)
        .pos(Pos::new(HPos::Center, VPos::Center));

    for (i, row) in matrix.values.iter().enumerate() {
        for (j, value) in row.iter().enumerate() {
            let x0 = LABEL_WIDTH + j as i32 * cell;
            let y0 = TITLE_HEIGHT + i as i32 * cell;
            let (fill, label, style) = match value {
                Some(v) => (
                    scale.color(*v),
                    format!("{:.2}", v),
                    if scale.needs_light_text(*v) { &light } else { &dark },
                ),
                None => (MISSING_COLOR, "n/a".to_string(), &dark),
            };

            root.draw(&Rectangle::new([(x0, y0), (x0 + cell, y0 + cell)], fill.filled()))?;
            root.draw(&Rectangle::new(
                [(x0, y0), (x0 + cell, y0 + cell)],
                WHITE.stroke_width(1),
            ))?;
            root.draw(&Text::new(label, (x0 + cell / 2, y0 + cell / 2), style.clone()))?;
        }
    }
    Ok(())
}

fn draw_labels(root: &SvgArea<'_>, matrix: &CorrelationMatrix, cell: i32) -> DrawResult {
    let row_style = text_style(12).pos(Pos::new(HPos::Right, VPos::Center));
    let col_style = text_style(12).pos(Pos::new(HPos::Center, VPos::Top));
    let col_chars = (cell / 7).max(4) as usize;
    let bottom = TITLE_HEIGHT + matrix.len() as i32 * cell;

    for (i, name) in matrix.columns.iter().enumerate() {
        let offset = i as i32 * cell + cell / 2;
        root.draw(&Text::new(
            truncate_label(name, 20),
            (LABEL_WIDTH - 8, TITLE_HEIGHT + offset),
            row_style.clone(),
        ))?;
        root.draw(&Text::new(
            truncate_label(name, col_chars),
            (LABEL_WIDTH + offset, bottom + 8),
            col_style.clone(),
        ))?;
    }
    Ok(())
}

fn draw_legend(root: &SvgArea<'_>, scale: ColorScale, x: i32, span: i32) -> DrawResult {
    const STEPS: i32 = 40;
    let (low, high) = scale.range();
    let bar_width = 16;
    let step_height = (span / STEPS).max(1);

    for s in 0..STEPS {
        // Top of the bar is the high end of the scale.
        let t = 1.0 - (s as f64 + 0.5) / STEPS as f64;
        let value = low + (high - low) * t;
        let y0 = TITLE_HEIGHT + s * step_height;
        root.draw(&Rectangle::new(
            [(x, y0), (x + bar_width, y0 + step_height)],
            scale.color(value).filled(),
        ))?;
    }

    let style = text_style(11).pos(Pos::new(HPos::Left, VPos::Center));
    root.draw(&Text::new(
        format!("{:.1}", high),
        (x + bar_width + 6, TITLE_HEIGHT),
        style.clone(),
    ))?;
    root.draw(&Text::new(
        format!("{:.1}", low),
        (x + bar_width + 6, TITLE_HEIGHT + STEPS * step_height),
        style,
    ))?;
    Ok(())
}
