//! HTML export of the rendered chart.

use crate::charts::{ChartError, StackedBarData};
use askama::Template;
use std::fs;
use std::path::Path;

/// Standalone page: the inline SVG chart followed by a per-year table of the
/// plotted counts. Renders `templates/index.html`.
#[derive(Template)]
#[template(path = "index.html")]
pub struct ChartPage<'a> {
    pub title: &'a str,
    pub svg: &'a str,
    pub countries: Vec<&'a str>,
    pub rows: Vec<YearRow>,
}

/// One table row; abandoned reactors are shown in parentheses.
pub struct YearRow {
    pub year: i32,
    pub total: u32,
    pub cells: Vec<String>,
}

impl<'a> ChartPage<'a> {
    pub fn new(title: &'a str, svg: &'a str, data: &'a StackedBarData) -> Self {
        let countries: Vec<&str> = data.legend().map(|(country, _)| country).collect();
        let rows = data
            .years
            .iter()
            .map(|&year| {
                let counts: Vec<(u32, u32)> = countries
                    .iter()
                    .map(|c| (data.value(year, c, false), data.value(year, c, true)))
                    .collect();
                YearRow {
                    year,
                    total: counts.iter().map(|(a, b)| a + b).sum(),
                    cells: counts
                        .into_iter()
                        .map(|counts| match counts {
                            (0, 0) => String::new(),
                            (a, 0) => a.to_string(),
                            (a, b) => format!("{a} ({b})"),
                        })
                        .collect(),
                }
            })
            .collect();

        Self {
            title,
            svg,
            countries,
            rows,
        }
    }
}

/// Writes the standalone page and hands it to the system viewer.
pub struct HtmlExporter;

impl HtmlExporter {
    pub fn render_page(title: &str, svg: &str, data: &StackedBarData) -> Result<String, ChartError> {
        Ok(ChartPage::new(title, svg, data).render()?)
    }

    pub fn write(path: &Path, page: &str) -> Result<(), ChartError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, page)?;
        tracing::info!(path = %path.display(), bytes = page.len(), "wrote HTML chart");
        Ok(())
    }

    /// Open the page in the default viewer. A missing viewer is not an error.
    pub fn open_in_viewer(path: &Path) {
        match open::that(path) {
            Ok(()) => tracing::info!(path = %path.display(), "opened chart in viewer"),
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "could not open viewer"),
        }
    }
}
