//! Timeline module - per-year aggregation of reactors under construction

mod aggregator;
mod snapshot;

pub use aggregator::{Timeline, TimelineError, YearRange, DEFAULT_FIRST_YEAR, DEFAULT_LAST_YEAR};
pub use snapshot::{ConstructionCounts, YearSnapshot};
