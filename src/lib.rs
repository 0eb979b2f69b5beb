//! Reactor Timeline - Nuclear Reactor Construction Chart Generator
//!
//! Reads a spreadsheet of reactor lifecycle dates, counts the reactors under
//! construction per country and year, and renders a stacked bar chart to HTML.

pub mod charts;
pub mod config;
pub mod data;
pub mod pipeline;
pub mod timeline;

pub use config::Settings;
pub use pipeline::{Pipeline, PipelineError, RunReport};
