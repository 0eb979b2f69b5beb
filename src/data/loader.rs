//! Reactor Data Loader Module
//! Reads the reactor spreadsheet (xlsx via calamine, CSV via Polars) into a
//! normalized DataFrame with parsed date columns.

use crate::data::records::{date_to_days, ReactorRecord, COUNTRY_COL, DATE_COLUMNS};
use calamine::{open_workbook_auto, Data, ExcelDateTime, Reader};
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to read spreadsheet: {0}")]
    SpreadsheetError(#[from] calamine::Error),
    #[error("Table error: {0}")]
    TableError(#[from] PolarsError),
    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(PathBuf),
    #[error("Workbook has no worksheets")]
    EmptyWorkbook,
    #[error("Missing required column '{0}'")]
    MissingColumn(String),
    #[error("Invalid date '{value}' in column '{column}' at row {row}")]
    InvalidDate {
        column: String,
        row: usize,
        value: String,
    },
    #[error("No data loaded")]
    NoData,
}

/// Raw cell content before date parsing, shared by both readers.
enum RawDate<'a> {
    Empty,
    Serial(f64),
    /// Date-formatted workbook cell; carries the workbook's date system.
    DateTime(ExcelDateTime),
    Text(&'a str),
}

/// Handles reactor spreadsheet loading into a Polars DataFrame.
pub struct DataLoader {
    df: Option<DataFrame>,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    pub fn new() -> Self {
        Self { df: None }
    }

    /// Load a spreadsheet, picking the reader from the file extension.
    pub fn load(&mut self, file_path: &Path) -> Result<&DataFrame, LoaderError> {
        let extension = file_path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        let df = match extension.as_str() {
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Self::read_workbook(file_path)?,
            "csv" => Self::read_csv(file_path)?,
            _ => return Err(LoaderError::UnsupportedFormat(file_path.to_path_buf())),
        };

        tracing::info!(
            path = %file_path.display(),
            rows = df.height(),
            "loaded reactor table"
        );

        self.df = Some(df);
        self.df.as_ref().ok_or(LoaderError::NoData)
    }

    /// Read the first worksheet of a workbook. The first row is the header.
    fn read_workbook(file_path: &Path) -> Result<DataFrame, LoaderError> {
        let mut workbook = open_workbook_auto(file_path)?;
        let sheet = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or(LoaderError::EmptyWorkbook)?;
        let range = workbook.worksheet_range(&sheet)?;

        let mut rows = range.rows();
        let header: Vec<String> = rows
            .next()
            .map(|cells| cells.iter().map(|c| c.to_string().trim().to_string()).collect())
            .unwrap_or_default();

        let country_idx = Self::column_index(&header, COUNTRY_COL)?;
        let date_idx = DATE_COLUMNS
            .iter()
            .map(|name| Self::column_index(&header, name))
            .collect::<Result<Vec<_>, _>>()?;

        let mut countries: Vec<Option<String>> = Vec::new();
        let mut dates: Vec<Vec<Option<i32>>> = vec![Vec::new(); DATE_COLUMNS.len()];

        // Spreadsheet row numbers are 1-based and the header is row 1.
        for (offset, cells) in rows.enumerate() {
            let row = offset + 2;
            if cells.iter().all(|c| matches!(c, Data::Empty)) {
                continue;
            }

            countries.push(match cells.get(country_idx) {
                None | Some(Data::Empty) => None,
                Some(Data::String(s)) => Some(s.trim().to_string()),
                Some(other) => Some(other.to_string()),
            });

            for (col, &idx) in date_idx.iter().enumerate() {
                let raw = match cells.get(idx) {
                    None | Some(Data::Empty) => RawDate::Empty,
                    Some(Data::DateTime(dt)) => RawDate::DateTime(*dt),
                    Some(Data::Float(f)) => RawDate::Serial(*f),
                    Some(Data::Int(i)) => RawDate::Serial(*i as f64),
                    Some(Data::String(s)) | Some(Data::DateTimeIso(s)) => RawDate::Text(s),
                    Some(other) => {
                        return Err(LoaderError::InvalidDate {
                            column: DATE_COLUMNS[col].to_string(),
                            row,
                            value: other.to_string(),
                        })
                    }
                };
                dates[col].push(parse_date(raw, DATE_COLUMNS[col], row)?);
            }
        }

        Self::build_frame(countries, dates)
    }

    /// Read a CSV export of the same sheet. Every column is read as text and
    /// dates are parsed with the same rules as workbook cells.
    fn read_csv(file_path: &Path) -> Result<DataFrame, LoaderError> {
        let raw = LazyCsvReader::new(file_path)
            .with_infer_schema_length(Some(0))
            .finish()?
            .collect()?;

        let names: Vec<String> = raw
            .get_column_names()
            .iter()
            .map(|s| s.trim().to_string())
            .collect();
        let columns = raw.get_columns();

        let countries: Vec<Option<String>> = columns[Self::column_index(&names, COUNTRY_COL)?]
            .str()?
            .into_iter()
            .map(|v| v.map(|s| s.trim().to_string()))
            .collect();

        let mut dates: Vec<Vec<Option<i32>>> = Vec::with_capacity(DATE_COLUMNS.len());
        for name in DATE_COLUMNS {
            let values = columns[Self::column_index(&names, name)?]
                .str()?
                .into_iter()
                .enumerate()
                .map(|(i, v)| {
                    let raw = v.map(RawDate::Text).unwrap_or(RawDate::Empty);
                    // +2: 1-based rows plus the header line
                    parse_date(raw, name, i + 2)
                })
                .collect::<Result<Vec<_>, _>>()?;
            dates.push(values);
        }

        Self::build_frame(countries, dates)
    }

    fn column_index(header: &[String], name: &str) -> Result<usize, LoaderError> {
        header
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| LoaderError::MissingColumn(name.to_string()))
    }

    /// Assemble the normalized table: country as text, dates as `Date`.
    fn build_frame(
        countries: Vec<Option<String>>,
        dates: Vec<Vec<Option<i32>>>,
    ) -> Result<DataFrame, LoaderError> {
        let mut columns = vec![Column::new(COUNTRY_COL.into(), countries)];
        for (name, days) in DATE_COLUMNS.iter().zip(dates) {
            columns.push(Column::new((*name).into(), days).cast(&DataType::Date)?);
        }
        Ok(DataFrame::new(columns)?)
    }

    /// Extract typed reactor records from the loaded table.
    pub fn records(&self) -> Result<Vec<ReactorRecord>, LoaderError> {
        let df = self.df.as_ref().ok_or(LoaderError::NoData)?;
        let records = ReactorRecord::from_frame(df)?;

        let skipped = df.height() - records.len();
        if skipped > 0 {
            tracing::warn!(skipped, "skipped rows without a country");
        }
        Ok(records)
    }

    /// Get the number of rows in the DataFrame.
    pub fn get_row_count(&self) -> usize {
        self.df.as_ref().map(|df| df.height()).unwrap_or(0)
    }
}

/// Serial of 9999-12-31, the last date a workbook can hold.
const MAX_SERIAL: f64 = 2_958_465.0;

fn serial_in_range(serial: f64) -> bool {
    (0.0..=MAX_SERIAL).contains(&serial)
}

/// Spreadsheet serial dates count days from 1899-12-30.
fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial_in_range(serial) {
        return None;
    }
    NaiveDate::from_ymd_opt(1899, 12, 30)?.checked_add_signed(TimeDelta::try_days(serial.floor() as i64)?)
}

/// Date cells from a workbook, honoring the 1904 date system.
fn cell_to_date(cell: &ExcelDateTime) -> Option<NaiveDate> {
    if !serial_in_range(cell.as_f64()) {
        return None;
    }
    cell.as_datetime().map(|dt| dt.date())
}

/// Parse free-text dates: ISO with or without time, German `DD.MM.YYYY`, or a
/// bare year meaning January 1st.
fn parse_date_text(text: &str) -> Option<NaiveDate> {
    const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d.%m.%Y", "%Y/%m/%d"];
    const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"];

    if let Some(date) = DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
    {
        return Some(date);
    }
    if let Some(dt) = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
    {
        return Some(dt.date());
    }
    if text.len() == 4 {
        return text
            .parse::<i32>()
            .ok()
            .and_then(|y| NaiveDate::from_ymd_opt(y, 1, 1));
    }
    None
}

fn parse_date(raw: RawDate<'_>, column: &str, row: usize) -> Result<Option<i32>, LoaderError> {
    let invalid = |value: String| LoaderError::InvalidDate {
        column: column.to_string(),
        row,
        value,
    };

    let date = match raw {
        RawDate::Empty => return Ok(None),
        RawDate::Serial(serial) => serial_to_date(serial).ok_or_else(|| invalid(serial.to_string()))?,
        RawDate::DateTime(cell) => cell_to_date(&cell).ok_or_else(|| invalid(cell.as_f64().to_string()))?,
        RawDate::Text(text) => {
            let text = text.trim();
            if text.is_empty() {
                return Ok(None);
            }
            parse_date_text(text).ok_or_else(|| invalid(text.to_string()))?
        }
    };
    Ok(Some(date_to_days(date)))
}
