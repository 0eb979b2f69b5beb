//! Data module - reactor spreadsheet loading and typed records

mod loader;
mod records;

pub use loader::{DataLoader, LoaderError};
pub use records::{
    date_to_days, days_to_date, ReactorRecord, ABANDONMENT_COL, COMMERCIAL_OPERATION_COL,
    CONSTRUCTION_START_COL, COUNTRY_COL, DATE_COLUMNS, GRID_SYNC_COL, SHUTDOWN_COL,
};
