//! Timeline Aggregator Module
//! Computes one snapshot per year of the range, in parallel with rayon.

use crate::data::ReactorRecord;
use crate::timeline::YearSnapshot;
use chrono::NaiveDate;
use polars::prelude::*;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::ops::RangeInclusive;
use thiserror::Error;

pub const DEFAULT_FIRST_YEAR: i32 = 1955;
pub const DEFAULT_LAST_YEAR: i32 = 2023;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TimelineError {
    #[error("Invalid year range {first}..={last}")]
    InvalidRange { first: i32, last: i32 },
}

/// Inclusive range of evaluated years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawYearRange")]
pub struct YearRange {
    first: i32,
    last: i32,
}

#[derive(Deserialize)]
struct RawYearRange {
    first: i32,
    last: i32,
}

impl TryFrom<RawYearRange> for YearRange {
    type Error = TimelineError;

    fn try_from(raw: RawYearRange) -> Result<Self, Self::Error> {
        YearRange::new(raw.first, raw.last)
    }
}

impl Default for YearRange {
    fn default() -> Self {
        Self {
            first: DEFAULT_FIRST_YEAR,
            last: DEFAULT_LAST_YEAR,
        }
    }
}

impl YearRange {
    pub fn new(first: i32, last: i32) -> Result<Self, TimelineError> {
        if first > last || first < 1 || last > 9999 {
            return Err(TimelineError::InvalidRange { first, last });
        }
        Ok(Self { first, last })
    }

    pub fn first(&self) -> i32 {
        self.first
    }

    pub fn last(&self) -> i32 {
        self.last
    }

    pub fn years(&self) -> RangeInclusive<i32> {
        self.first..=self.last
    }

    /// December 31st of `year`, the inclusion boundary for that year.
    pub fn cutoff(year: i32) -> NaiveDate {
        // Years are bounded by `new`, so the date always exists.
        NaiveDate::from_ymd_opt(year, 12, 31).unwrap_or(NaiveDate::MAX)
    }
}

/// Snapshots for every year of a range, ordered by year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timeline {
    range: YearRange,
    snapshots: Vec<YearSnapshot>,
}

impl Timeline {
    /// Aggregate `records` for every year of `range`.
    ///
    /// Each year is independent of the others, so years are fanned out over
    /// the rayon pool; the output order is still by year.
    pub fn aggregate(records: &[ReactorRecord], range: YearRange) -> Self {
        let snapshots: Vec<YearSnapshot> = range
            .years()
            .into_par_iter()
            .map(|year| YearSnapshot::from_records(year, YearRange::cutoff(year), records))
            .collect();

        for snapshot in &snapshots {
            tracing::debug!(
                year = snapshot.year,
                total = snapshot.total(),
                "reactors under construction"
            );
        }

        Self { range, snapshots }
    }

    pub fn range(&self) -> YearRange {
        self.range
    }

    pub fn snapshots(&self) -> &[YearSnapshot] {
        &self.snapshots
    }

    pub fn snapshot(&self, year: i32) -> Option<&YearSnapshot> {
        if !self.range.years().contains(&year) {
            return None;
        }
        self.snapshots.get((year - self.range.first()) as usize)
    }

    pub fn years(&self) -> Vec<i32> {
        self.snapshots.iter().map(|s| s.year).collect()
    }

    /// Sorted union of countries over all years.
    pub fn countries(&self) -> Vec<String> {
        let countries: BTreeSet<&str> = self
            .snapshots
            .iter()
            .flat_map(YearSnapshot::countries)
            .collect();
        countries.into_iter().map(str::to_string).collect()
    }

    /// Counts for one (country, abandoned) group, one entry per year.
    pub fn series(&self, country: &str, abandoned: bool) -> Vec<u32> {
        self.snapshots
            .iter()
            .map(|s| s.count(country, abandoned))
            .collect()
    }

    /// Total per year.
    pub fn totals(&self) -> Vec<(i32, u32)> {
        self.snapshots.iter().map(|s| (s.year, s.total())).collect()
    }

    /// Year with the most reactors under construction; the earliest wins ties.
    pub fn peak(&self) -> Option<(i32, u32)> {
        self.totals()
            .into_iter()
            .fold(None, |best, (year, total)| match best {
                Some((_, best_total)) if best_total >= total => best,
                _ => Some((year, total)),
            })
    }

    /// Long-format table: one row per (year, country, abandoned) group with a
    /// non-zero count.
    pub fn to_frame(&self) -> PolarsResult<DataFrame> {
        let mut years: Vec<i32> = Vec::new();
        let mut countries: Vec<String> = Vec::new();
        let mut abandoned: Vec<bool> = Vec::new();
        let mut reactors: Vec<u32> = Vec::new();

        for snapshot in &self.snapshots {
            for (country, counts) in snapshot.iter() {
                for flag in [false, true] {
                    let count = counts.get(flag);
                    if count == 0 {
                        continue;
                    }
                    years.push(snapshot.year);
                    countries.push(country.to_string());
                    abandoned.push(flag);
                    reactors.push(count);
                }
            }
        }

        DataFrame::new(vec![
            Column::new("year".into(), years),
            Column::new("country".into(), countries),
            Column::new("abandoned".into(), abandoned),
            Column::new("reactors".into(), reactors),
        ])
    }
}
