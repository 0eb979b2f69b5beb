//! End-to-end runs over spreadsheet fixtures.

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use reactor_timeline::charts::ChartError;
use reactor_timeline::timeline::YearRange;
use reactor_timeline::{Pipeline, PipelineError, Settings};
use rust_xlsxwriter::{Format, Workbook};
use std::fs;
use std::path::{Path, PathBuf};

const HEADER: [&str; 6] = [
    "Land",
    "Baubeginn",
    "erste Netzsynchronisation",
    "Kommerzieller Betrieb",
    "Abschaltung",
    "Bau/Projekt eingestellt",
];

enum Cell {
    Blank,
    Date(i32, u32, u32),
    Text(&'static str),
}

fn serial(y: i32, m: u32, d: u32) -> f64 {
    let date = NaiveDate::from_ymd_opt(y, m, d).unwrap();
    let base = NaiveDate::from_ymd_opt(1899, 12, 30).unwrap();
    (date - base).num_days() as f64
}

fn write_workbook(path: &Path, rows: &[(&str, [Cell; 5])]) {
    let mut workbook = Workbook::new();
    let date_format = Format::new().set_num_format("yyyy-mm-dd");
    let sheet = workbook.add_worksheet();

    for (col, name) in HEADER.iter().enumerate() {
        sheet.write_string(0, col as u16, *name).unwrap();
    }
    for (i, (country, dates)) in rows.iter().enumerate() {
        let row = i as u32 + 1;
        if !country.is_empty() {
            sheet.write_string(row, 0, *country).unwrap();
        }
        for (j, cell) in dates.iter().enumerate() {
            let col = j as u16 + 1;
            match cell {
                Cell::Blank => {}
                Cell::Date(y, m, d) => {
                    sheet
                        .write_number_with_format(row, col, serial(*y, *m, *d), &date_format)
                        .unwrap();
                }
                Cell::Text(text) => {
                    sheet.write_string(row, col, *text).unwrap();
                }
            }
        }
    }
    workbook.save(path).unwrap();
}

fn fixture_rows() -> Vec<(&'static str, [Cell; 5])> {
    use Cell::*;
    vec![
        ("France", [Date(1960, 1, 1), Blank, Blank, Blank, Blank]),
        ("France", [Date(1960, 1, 1), Blank, Date(1970, 6, 1), Blank, Blank]),
        ("Austria", [Text("1960-01-01"), Blank, Blank, Blank, Text("1965-01-01")]),
        ("Germany", [Date(1980, 1, 1), Blank, Blank, Date(1990, 1, 1), Blank]),
        ("", [Date(1975, 1, 1), Blank, Blank, Blank, Blank]),
    ]
}

fn settings_in(dir: &Path, input: PathBuf) -> Settings {
    Settings {
        input,
        output: dir.join("index.html"),
        summary_csv: Some(dir.join("summary.csv")),
        open_viewer: false,
        ..Settings::default()
    }
}

#[test]
fn workbook_to_html_and_summary() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("nuclear_power_plants.xlsx");
    write_workbook(&input, &fixture_rows());

    let report = Pipeline::new(settings_in(dir.path(), input))
        .unwrap()
        .run()
        .unwrap();

    assert_eq!(report.records, 4);
    assert_eq!(report.countries, 2);
    assert_eq!(report.peak, Some((1960, 3)));

    let timeline = &report.timeline;
    let france: Vec<u32> = timeline.series("France", false);
    assert_eq!(france[(1969 - 1955) as usize], 2);
    assert_eq!(france[(1970 - 1955) as usize], 1);
    assert_eq!(france[(2023 - 1955) as usize], 1);
    assert_eq!(timeline.snapshot(1964).unwrap().count("Austria", true), 1);
    assert_eq!(timeline.snapshot(1965).unwrap().count("Austria", true), 0);
    assert!(timeline.snapshots().iter().all(|s| s.count("Germany", false) == 0));

    let html = fs::read_to_string(&report.html).unwrap();
    assert!(html.contains("<svg"));
    assert!(html.contains("<th>Austria</th><th>France</th>"));

    let summary = fs::read_to_string(dir.path().join("summary.csv")).unwrap();
    let mut lines = summary.lines();
    assert_eq!(lines.next(), Some("year,country,abandoned,reactors"));
    assert_eq!(lines.next(), Some("1960,Austria,true,1"));
    assert_eq!(lines.next(), Some("1960,France,false,2"));
}

#[test]
fn csv_export_of_same_sheet_gives_same_timeline() {
    let dir = tempfile::tempdir().unwrap();
    let xlsx = dir.path().join("plants.xlsx");
    write_workbook(&xlsx, &fixture_rows());
    let csv = dir.path().join("plants.csv");
    fs::write(
        &csv,
        format!(
            "{}\n\
             France,1960-01-01,,,,\n\
             France,1960-01-01,,1970-06-01,,\n\
             Austria,1960-01-01,,,,1965-01-01\n\
             Germany,1980-01-01,,,1990-01-01,\n\
             ,1975-01-01,,,,\n",
            HEADER.join(",")
        ),
    )
    .unwrap();

    let from_xlsx = Pipeline::new(settings_in(dir.path(), xlsx)).unwrap().run().unwrap();
    let from_csv = Pipeline::new(settings_in(dir.path(), csv)).unwrap().run().unwrap();
    assert_eq!(from_xlsx.timeline, from_csv.timeline);
}

#[test]
fn uncolored_country_stops_before_writing() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("plants.xlsx");
    write_workbook(
        &input,
        &[("Portugal", [Cell::Date(1975, 1, 1), Cell::Blank, Cell::Blank, Cell::Blank, Cell::Blank])],
    );
    let settings = settings_in(dir.path(), input);
    let output = settings.output.clone();

    let err = Pipeline::new(settings).unwrap().run().unwrap_err();
    assert!(
        matches!(err, PipelineError::Chart(ChartError::UnknownCountry(ref c)) if c == "Portugal"),
        "{err}"
    );
    assert!(!output.exists());
}

#[test]
fn palette_override_admits_new_country_and_year_range_applies() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("plants.xlsx");
    write_workbook(
        &input,
        &[("Portugal", [Cell::Date(1975, 1, 1), Cell::Blank, Cell::Blank, Cell::Blank, Cell::Blank])],
    );
    let mut settings = settings_in(dir.path(), input);
    settings.palette.insert("Portugal".to_string(), "#006600".to_string());
    settings.years = YearRange::new(1970, 1980).unwrap();

    let report = Pipeline::new(settings).unwrap().run().unwrap();
    assert_eq!(report.timeline.years(), (1970..=1980).collect::<Vec<_>>());
    assert_eq!(report.peak, Some((1975, 1)));
}

#[test]
fn missing_input_is_a_load_error() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings_in(dir.path(), dir.path().join("absent.xlsx"));
    let err = Pipeline::new(settings).unwrap().run().unwrap_err();
    assert!(matches!(err, PipelineError::Load(_)), "{err}");
}
