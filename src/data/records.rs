//! Reactor Record Module
//! Typed view of one spreadsheet row and the under-construction predicate.

use chrono::NaiveDate;
use polars::prelude::*;

/// Column holding the country name.
pub const COUNTRY_COL: &str = "Land";
/// Column holding the construction start date.
pub const CONSTRUCTION_START_COL: &str = "Baubeginn";
/// Column holding the first grid synchronization date.
pub const GRID_SYNC_COL: &str = "erste Netzsynchronisation";
/// Column holding the commercial operation date.
pub const COMMERCIAL_OPERATION_COL: &str = "Kommerzieller Betrieb";
/// Column holding the shutdown date.
pub const SHUTDOWN_COL: &str = "Abschaltung";
/// Column holding the date construction or the project was abandoned.
pub const ABANDONMENT_COL: &str = "Bau/Projekt eingestellt";

/// Date columns in the order they appear in the source schema.
pub const DATE_COLUMNS: [&str; 5] = [
    CONSTRUCTION_START_COL,
    GRID_SYNC_COL,
    COMMERCIAL_OPERATION_COL,
    SHUTDOWN_COL,
    ABANDONMENT_COL,
];

/// Polars stores dates as days since the Unix epoch.
fn unix_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default()
}

/// Convert a date into polars' physical `Date` representation.
pub fn date_to_days(date: NaiveDate) -> i32 {
    (date - unix_epoch()).num_days() as i32
}

/// Convert polars' physical `Date` representation back into a date.
pub fn days_to_date(days: i32) -> Option<NaiveDate> {
    unix_epoch().checked_add_signed(chrono::Duration::days(days as i64))
}

/// One reactor and its lifecycle dates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactorRecord {
    pub country: String,
    pub construction_start: Option<NaiveDate>,
    pub grid_sync: Option<NaiveDate>,
    pub commercial_operation: Option<NaiveDate>,
    pub shutdown: Option<NaiveDate>,
    pub abandonment: Option<NaiveDate>,
}

impl ReactorRecord {
    /// Create a record with only a country set.
    pub fn new(country: impl Into<String>) -> Self {
        Self {
            country: country.into(),
            construction_start: None,
            grid_sync: None,
            commercial_operation: None,
            shutdown: None,
            abandonment: None,
        }
    }

    pub fn with_construction_start(mut self, date: NaiveDate) -> Self {
        self.construction_start = Some(date);
        self
    }

    pub fn with_grid_sync(mut self, date: NaiveDate) -> Self {
        self.grid_sync = Some(date);
        self
    }

    pub fn with_commercial_operation(mut self, date: NaiveDate) -> Self {
        self.commercial_operation = Some(date);
        self
    }

    pub fn with_shutdown(mut self, date: NaiveDate) -> Self {
        self.shutdown = Some(date);
        self
    }

    pub fn with_abandonment(mut self, date: NaiveDate) -> Self {
        self.abandonment = Some(date);
        self
    }

    /// A reactor counts as abandoned whenever an abandonment date is set,
    /// regardless of its other dates.
    pub fn is_abandoned(&self) -> bool {
        self.abandonment.is_some()
    }

    /// Whether the reactor counts as under construction at `cutoff`.
    ///
    /// Construction must have started on or before the cutoff, and then either
    /// no later lifecycle date is known at all, or grid sync, commercial
    /// operation or abandonment falls on or after the cutoff.
    ///
    /// A shutdown date only matters through the "no later date known" branch:
    /// a record whose sole later date is a shutdown is never counted.
    pub fn is_under_construction(&self, cutoff: NaiveDate) -> bool {
        let Some(start) = self.construction_start else {
            return false;
        };
        if start > cutoff {
            return false;
        }

        let unresolved = self.grid_sync.is_none()
            && self.commercial_operation.is_none()
            && self.shutdown.is_none()
            && self.abandonment.is_none();
        if unresolved {
            return true;
        }

        let not_before_cutoff = |date: Option<NaiveDate>| date.is_some_and(|d| d >= cutoff);
        not_before_cutoff(self.grid_sync)
            || not_before_cutoff(self.commercial_operation)
            || not_before_cutoff(self.abandonment)
    }

    /// Extract records from a normalized reactor table.
    ///
    /// The frame must carry the country column as strings and the five date
    /// columns as `Date`. Rows without a country are dropped.
    pub fn from_frame(df: &DataFrame) -> PolarsResult<Vec<ReactorRecord>> {
        let countries = df.column(COUNTRY_COL)?.str()?;

        let mut date_values: Vec<Vec<Option<NaiveDate>>> = Vec::with_capacity(DATE_COLUMNS.len());
        for name in DATE_COLUMNS {
            let days = df.column(name)?.cast(&DataType::Int32)?;
            let days_ca = days.i32()?;
            date_values.push(
                days_ca
                    .into_iter()
                    .map(|d| d.and_then(days_to_date))
                    .collect(),
            );
        }

        let mut records = Vec::with_capacity(df.height());
        for (i, country) in countries.into_iter().enumerate() {
            let Some(country) = country.map(str::trim).filter(|c| !c.is_empty()) else {
                continue;
            };
            records.push(ReactorRecord {
                country: country.to_string(),
                construction_start: date_values[0][i],
                grid_sync: date_values[1][i],
                commercial_operation: date_values[2][i],
                shutdown: date_values[3][i],
                abandonment: date_values[4][i],
            });
        }

        Ok(records)
    }
}
