//! Reactor Timeline CLI
//!
//! Usage:
//!   reactor_timeline [INPUT] [--output index.html] [--config settings.json]
//!
//! With no arguments it reads `data/nuclear_power_plants.xlsx`, writes
//! `index.html` and opens it.

use anyhow::Context;
use clap::Parser;
use reactor_timeline::{Pipeline, Settings};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "reactor_timeline")]
#[command(about = "Chart the number of nuclear reactors under construction per country and year")]
#[command(version)]
struct Cli {
    /// Reactor spreadsheet (.xlsx, .ods or .csv)
    input: Option<PathBuf>,

    /// HTML output path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// JSON settings file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// First year on the chart
    #[arg(long)]
    first_year: Option<i32>,

    /// Last year on the chart
    #[arg(long)]
    last_year: Option<i32>,

    /// Also export the chart as PNG
    #[arg(long)]
    png: Option<PathBuf>,

    /// Write the per-year counts as CSV
    #[arg(long)]
    summary_csv: Option<PathBuf>,

    /// Do not open the chart after writing it
    #[arg(long)]
    no_open: bool,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, conflicts_with = "quiet")]
    verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    fn log_level(&self) -> &'static str {
        match (self.quiet, self.verbose) {
            (true, _) => "warn",
            (false, 0) => "info",
            (false, 1) => "debug",
            (false, _) => "trace",
        }
    }

    /// Defaults, then the config file, then flags.
    fn settings(self) -> anyhow::Result<Settings> {
        let mut settings = match &self.config {
            Some(path) => Settings::from_file(path)
                .with_context(|| format!("loading settings from {}", path.display()))?,
            None => Settings::default(),
        };

        if let Some(input) = self.input {
            settings.input = input;
        }
        if let Some(output) = self.output {
            settings.output = output;
        }
        if self.png.is_some() {
            settings.png = self.png;
        }
        if self.summary_csv.is_some() {
            settings.summary_csv = self.summary_csv;
        }
        if self.no_open {
            settings.open_viewer = false;
        }
        settings
            .with_years(self.first_year, self.last_year)
            .context("invalid year range")
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let settings = cli.settings()?;
    let input = settings.input.clone();

    let report = Pipeline::new(settings)?
        .run()
        .with_context(|| format!("charting reactors from {}", input.display()))?;

    tracing::info!(
        records = report.records,
        countries = report.countries,
        output = %report.html.display(),
        "done"
    );
    Ok(())
}
