//! Reactor Timeline Pipeline
//! Load -> aggregate -> render, driven by `Settings`.

use crate::charts::{ChartError, HtmlExporter, Palette, StackedBarData, StaticChartRenderer};
use crate::config::{ConfigError, Settings};
use crate::data::{DataLoader, LoaderError};
use crate::timeline::Timeline;
use polars::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Load(#[from] LoaderError),
    #[error(transparent)]
    Chart(#[from] ChartError),
    #[error("Failed to write summary {path}: {source}")]
    Summary {
        path: PathBuf,
        #[source]
        source: PolarsError,
    },
    #[error("Failed to create {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// What a run produced.
#[derive(Debug)]
pub struct RunReport {
    pub records: usize,
    pub countries: usize,
    pub peak: Option<(i32, u32)>,
    pub html: PathBuf,
    pub timeline: Timeline,
}

pub struct Pipeline {
    settings: Settings,
}

impl Pipeline {
    pub fn new(settings: Settings) -> Result<Self, PipelineError> {
        settings.validate()?;
        Ok(Self { settings })
    }

    /// Run every stage. The viewer is launched last, only after all outputs
    /// were written.
    pub fn run(&self) -> Result<RunReport, PipelineError> {
        let settings = &self.settings;

        // Fail on bad palette overrides before touching the input.
        let palette = Palette::default().with_overrides(&settings.palette)?;

        let mut loader = DataLoader::new();
        loader.load(&settings.input)?;
        let records = loader.records()?;
        tracing::info!(
            rows = loader.get_row_count(),
            records = records.len(),
            "extracted reactor records"
        );

        let timeline = Timeline::aggregate(&records, settings.years);
        let peak = timeline.peak();
        if let Some((year, total)) = peak {
            tracing::info!(year, total, "peak construction year");
        }

        // Missing colors are reported before any output is written.
        let data = StackedBarData::from_timeline(&timeline, &palette)?;

        if let Some(path) = &settings.summary_csv {
            Self::write_summary(&timeline, path)?;
        }

        let svg = StaticChartRenderer::render_svg(&data, &settings.chart)?;
        let page = HtmlExporter::render_page(&settings.chart.title, &svg, &data)?;
        HtmlExporter::write(&settings.output, &page)?;

        if let Some(path) = &settings.png {
            StaticChartRenderer::render_png(&data, &settings.chart, path)?;
        }

        if settings.open_viewer {
            HtmlExporter::open_in_viewer(&settings.output);
        }

        Ok(RunReport {
            records: records.len(),
            countries: timeline.countries().len(),
            peak,
            html: settings.output.clone(),
            timeline,
        })
    }

    /// Write the long-format aggregation table as CSV.
    fn write_summary(timeline: &Timeline, path: &Path) -> Result<(), PipelineError> {
        let summary_error = |source: PolarsError| PipelineError::Summary {
            path: path.to_path_buf(),
            source,
        };

        let mut df = timeline.to_frame().map_err(summary_error)?;
        let mut file = File::create(path).map_err(|source| PipelineError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        CsvWriter::new(&mut file)
            .include_header(true)
            .finish(&mut df)
            .map_err(summary_error)?;

        tracing::info!(path = %path.display(), rows = df.height(), "wrote summary CSV");
        Ok(())
    }
}
