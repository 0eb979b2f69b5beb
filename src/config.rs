//! Run settings: built-in defaults, optionally overridden by a JSON file and
//! then by command-line flags.

use crate::timeline::{TimelineError, YearRange};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_INPUT: &str = "data/nuclear_power_plants.xlsx";
pub const DEFAULT_OUTPUT: &str = "index.html";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Years(#[from] TimelineError),
    #[error("Chart size must be positive, got {width}x{height}")]
    InvalidSize { width: u32, height: u32 },
    #[error("Y axis maximum must be positive, got {0}")]
    InvalidAxis(f64),
}

/// Layout and labels of the rendered chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartOptions {
    pub title: String,
    pub y_label: String,
    pub width: u32,
    pub height: u32,
    /// Upper bound of the y axis; raised automatically if a bar is taller.
    pub y_max: f64,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            title: "Evolution of Nuclear Power Plant Construction in Europe: \
                    Total Number of Nuclear Reactors Being Built by Country and Year"
                .to_string(),
            y_label: "Number of Nuclear Reactors under Construction".to_string(),
            width: 997,
            height: 580,
            y_max: 105.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub input: PathBuf,
    pub output: PathBuf,
    pub years: YearRange,
    pub chart: ChartOptions,
    pub open_viewer: bool,
    pub png: Option<PathBuf>,
    pub summary_csv: Option<PathBuf>,
    /// Extra or replacement country colors as `#RRGGBB`.
    pub palette: BTreeMap<String, String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            output: PathBuf::from(DEFAULT_OUTPUT),
            years: YearRange::default(),
            chart: ChartOptions::default(),
            open_viewer: true,
            png: None,
            summary_csv: None,
            palette: BTreeMap::new(),
        }
    }
}

impl Settings {
    /// Load settings from a JSON file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Settings = serde_json::from_str(&text)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Replace the year range, keeping whichever bound is not given.
    pub fn with_years(mut self, first: Option<i32>, last: Option<i32>) -> Result<Self, ConfigError> {
        if first.is_some() || last.is_some() {
            self.years = YearRange::new(
                first.unwrap_or(self.years.first()),
                last.unwrap_or(self.years.last()),
            )?;
        }
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let ChartOptions {
            width,
            height,
            y_max,
            ..
        } = self.chart;
        if width == 0 || height == 0 {
            return Err(ConfigError::InvalidSize { width, height });
        }
        if !(y_max > 0.0) {
            return Err(ConfigError::InvalidAxis(y_max));
        }
        Ok(())
    }
}
