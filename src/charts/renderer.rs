//! Static Chart Renderer
//! Draws the stacked bar chart with plotters, as an SVG string or a PNG file.
//!
//! Layout:
//! 1. Title centered on top
//! 2. Stacked bars per year, one color per country, abandoned blocks
//!    cross-hatched
//! 3. Key in the upper right explaining plain vs. hatched blocks
//! 4. Country legend below the plot, in a grid

use crate::charts::{BarSegment, StackedBarData};
use crate::config::ChartOptions;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("No color configured for country '{0}'")]
    UnknownCountry(String),
    #[error("Invalid color '{value}' for country '{country}'")]
    InvalidColor { country: String, value: String },
    #[error("Failed to draw chart: {0}")]
    Render(String),
    #[error("Failed to render page: {0}")]
    Template(#[from] askama::Error),
    #[error("Failed to write chart: {0}")]
    Io(#[from] std::io::Error),
}

const BAR_HALF_WIDTH: f64 = 0.4;
const LEGEND_COLUMNS: usize = 8;
const LEGEND_ROW_HEIGHT: u32 = 18;
const LEGEND_PADDING: u32 = 12;
const KEY_BOX: (i32, i32) = (40, 14);

const ACTIVE_LABEL: &str = "Construction Completed or Underway";
const ABANDONED_LABEL: &str = "Construction Later Abandoned or Never Commissioned";

fn render_error<E: std::fmt::Display>(err: E) -> ChartError {
    ChartError::Render(err.to_string())
}

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Render the chart into an SVG document.
    pub fn render_svg(data: &StackedBarData, options: &ChartOptions) -> Result<String, ChartError> {
        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, (options.width, options.height))
                .into_drawing_area();
            Self::draw(&root, data, options)?;
            root.present().map_err(render_error)?;
        }
        Ok(svg)
    }

    /// Render the chart into a PNG file.
    pub fn render_png(data: &StackedBarData, options: &ChartOptions, path: &Path) -> Result<(), ChartError> {
        let root = BitMapBackend::new(path, (options.width, options.height)).into_drawing_area();
        Self::draw(&root, data, options)?;
        root.present().map_err(render_error)?;
        tracing::info!(path = %path.display(), "wrote PNG chart");
        Ok(())
    }

    /// Upper bound of the y axis: the configured maximum unless a bar is taller.
    pub fn y_max(data: &StackedBarData, options: &ChartOptions) -> f64 {
        let tallest = data.max_stack() as f64;
        if tallest > options.y_max {
            tracing::warn!(
                tallest,
                configured = options.y_max,
                "bars exceed the configured y axis, extending it"
            );
            (tallest * 1.05).ceil()
        } else {
            options.y_max
        }
    }

    fn draw<DB: DrawingBackend>(
        root: &DrawingArea<DB, Shift>,
        data: &StackedBarData,
        options: &ChartOptions,
    ) -> Result<(), ChartError> {
        root.fill(&WHITE).map_err(render_error)?;

        let (width, height) = root.dim_in_pixel();
        let legend_count = data.legend().count();
        let legend_rows = legend_count.div_ceil(LEGEND_COLUMNS) as u32;
        let legend_h = legend_rows * LEGEND_ROW_HEIGHT + LEGEND_PADDING;
        let (plot_area, legend_area) = root.split_vertically(height.saturating_sub(legend_h) as i32);

        let first = data.years.first().copied().unwrap_or_default() as f64;
        let last = data.years.last().copied().unwrap_or_default() as f64;
        let y_max = Self::y_max(data, options);

        let mut chart = ChartBuilder::on(&plot_area)
            .caption(&options.title, ("sans-serif", 15))
            .margin(10)
            .x_label_area_size(30)
            .y_label_area_size(55)
            .build_cartesian_2d((first - 0.5)..(last + 0.5), 0f64..y_max)
            .map_err(render_error)?;

        let grid = RGBColor(128, 128, 128).mix(0.1);
        chart
            .configure_mesh()
            .bold_line_style(grid.stroke_width(1))
            .light_line_style(TRANSPARENT.stroke_width(0))
            .x_labels(data.years.len().clamp(2, 15))
            .x_label_formatter(&|x: &f64| format!("{:.0}", x))
            .y_desc(options.y_label.as_str())
            .label_style(("sans-serif", 12))
            .draw()
            .map_err(render_error)?;

        let segments = data.segments();
        chart
            .draw_series(segments.iter().map(|seg| {
                let x = seg.year as f64;
                Rectangle::new(
                    [
                        (x - BAR_HALF_WIDTH, seg.bottom as f64),
                        (x + BAR_HALF_WIDTH, seg.top as f64),
                    ],
                    seg.color.filled(),
                )
            }))
            .map_err(render_error)?;
        chart
            .draw_series(segments.iter().flat_map(Self::hatch_lines))
            .map_err(render_error)?;

        Self::draw_key(&plot_area, width)?;
        Self::draw_legend(&legend_area, data, width)?;
        Ok(())
    }

    /// An "x" across every reactor unit of an abandoned segment.
    fn hatch_lines(seg: &BarSegment) -> Vec<PathElement<(f64, f64)>> {
        let Some(hatch) = seg.hatch else {
            return Vec::new();
        };
        let style = hatch.stroke_width(1);
        let x = seg.year as f64;
        let (left, right) = (x - BAR_HALF_WIDTH, x + BAR_HALF_WIDTH);

        (seg.bottom..seg.top)
            .flat_map(|unit| {
                let (low, high) = (unit as f64, unit as f64 + 1.0);
                [
                    PathElement::new(vec![(left, low), (right, high)], style),
                    PathElement::new(vec![(left, high), (right, low)], style),
                ]
            })
            .collect()
    }

    fn draw_key<DB: DrawingBackend>(area: &DrawingArea<DB, Shift>, width: u32) -> Result<(), ChartError> {
        let (box_w, box_h) = KEY_BOX;
        let x = (width as f64 * 0.58) as i32;
        let rows = [(ACTIVE_LABEL, 40, false), (ABANDONED_LABEL, 62, true)];

        for (label, y, hatched) in rows {
            area.draw(&Rectangle::new(
                [(x, y), (x + box_w, y + box_h)],
                BLACK.stroke_width(1),
            ))
            .map_err(render_error)?;
            if hatched {
                for (from, to) in [((x, y), (x + box_w, y + box_h)), ((x, y + box_h), (x + box_w, y))] {
                    area.draw(&PathElement::new(vec![from, to], BLACK.stroke_width(1)))
                        .map_err(render_error)?;
                }
            }
            area.draw(&Text::new(
                label,
                (x + box_w + 8, y),
                ("sans-serif", 12).into_font(),
            ))
            .map_err(render_error)?;
        }
        Ok(())
    }

    fn draw_legend<DB: DrawingBackend>(
        area: &DrawingArea<DB, Shift>,
        data: &StackedBarData,
        width: u32,
    ) -> Result<(), ChartError> {
        let cell_w = (width / LEGEND_COLUMNS as u32) as i32;
        let row_h = LEGEND_ROW_HEIGHT as i32;

        for (i, (country, color)) in data.legend().enumerate() {
            let x = (i % LEGEND_COLUMNS) as i32 * cell_w + 10;
            let y = (i / LEGEND_COLUMNS) as i32 * row_h + 4;
            area.draw(&Rectangle::new([(x, y), (x + 12, y + 12)], color.filled()))
                .map_err(render_error)?;
            area.draw(&Text::new(country, (x + 17, y), ("sans-serif", 10).into_font()))
                .map_err(render_error)?;
        }
        Ok(())
    }
}
