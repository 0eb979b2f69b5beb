//! Year Snapshot Module
//! Per-country reactor counts for a single cutoff year.

use crate::data::ReactorRecord;
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Reactors under construction in one country, split by abandonment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConstructionCounts {
    pub active: u32,
    pub abandoned: u32,
}

impl ConstructionCounts {
    pub fn get(&self, abandoned: bool) -> u32 {
        if abandoned {
            self.abandoned
        } else {
            self.active
        }
    }

    pub fn total(&self) -> u32 {
        self.active + self.abandoned
    }

    fn add(&mut self, abandoned: bool) {
        if abandoned {
            self.abandoned += 1;
        } else {
            self.active += 1;
        }
    }
}

/// Counts of reactors under construction at the end of one year.
///
/// Only countries with at least one counted reactor appear.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearSnapshot {
    pub year: i32,
    counts: BTreeMap<String, ConstructionCounts>,
}

impl YearSnapshot {
    pub fn new(year: i32) -> Self {
        Self {
            year,
            counts: BTreeMap::new(),
        }
    }

    /// Count every record under construction at `cutoff`, grouped by country
    /// and abandonment.
    pub fn from_records(year: i32, cutoff: NaiveDate, records: &[ReactorRecord]) -> Self {
        let mut snapshot = Self::new(year);
        for record in records.iter().filter(|r| r.is_under_construction(cutoff)) {
            snapshot
                .counts
                .entry(record.country.clone())
                .or_default()
                .add(record.is_abandoned());
        }
        snapshot
    }

    /// Count for one (country, abandoned) group; zero when absent.
    pub fn count(&self, country: &str, abandoned: bool) -> u32 {
        self.counts
            .get(country)
            .map(|c| c.get(abandoned))
            .unwrap_or(0)
    }

    /// Both groups for a country.
    pub fn country_counts(&self, country: &str) -> ConstructionCounts {
        self.counts.get(country).copied().unwrap_or_default()
    }

    /// Total reactors under construction across all countries.
    pub fn total(&self) -> u32 {
        self.counts.values().map(ConstructionCounts::total).sum()
    }

    /// Countries present in this year, sorted.
    pub fn countries(&self) -> impl Iterator<Item = &str> {
        self.counts.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConstructionCounts)> {
        self.counts.iter().map(|(c, counts)| (c.as_str(), counts))
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}
