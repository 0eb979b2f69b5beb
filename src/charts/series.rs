//! Stacked Bar Series Module
//! Turns a timeline into colored per-(country, abandoned) series and the
//! stacked segments drawn for each year.

use crate::charts::{contrast_color, ChartError, Palette};
use crate::timeline::Timeline;
use plotters::style::RGBColor;

/// One stacked layer: a country's active or abandoned counts over the years.
#[derive(Debug, Clone, PartialEq)]
pub struct BarSeries {
    pub country: String,
    pub abandoned: bool,
    pub color: RGBColor,
    /// One entry per year; zero counts are gaps.
    pub values: Vec<Option<u32>>,
}

/// A drawable block of one bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarSegment {
    pub year: i32,
    pub bottom: u32,
    pub top: u32,
    pub color: RGBColor,
    /// Stroke color of the cross-hatch, set for abandoned segments.
    pub hatch: Option<RGBColor>,
}

/// Everything the renderer needs, independent of the drawing backend.
#[derive(Debug, Clone)]
pub struct StackedBarData {
    pub years: Vec<i32>,
    /// Countries sorted, active before abandoned for each country.
    pub series: Vec<BarSeries>,
}

impl StackedBarData {
    /// Build the series for every country in the timeline. Fails before any
    /// series is built if a country has no color.
    pub fn from_timeline(timeline: &Timeline, palette: &Palette) -> Result<Self, ChartError> {
        let countries = timeline.countries();
        palette.ensure_covers(countries.iter().map(String::as_str))?;

        let mut series = Vec::with_capacity(countries.len() * 2);
        for country in &countries {
            let color = palette.color(country)?;
            for abandoned in [false, true] {
                let values = timeline
                    .series(country, abandoned)
                    .into_iter()
                    .map(|v| (v != 0).then_some(v))
                    .collect();
                series.push(BarSeries {
                    country: country.clone(),
                    abandoned,
                    color,
                    values,
                });
            }
        }

        Ok(Self {
            years: timeline.years(),
            series,
        })
    }

    /// Segments bottom-up per year, in series order.
    pub fn segments(&self) -> Vec<BarSegment> {
        let mut segments = Vec::new();
        for (i, &year) in self.years.iter().enumerate() {
            let mut bottom = 0;
            for s in &self.series {
                let Some(count) = s.values.get(i).copied().flatten() else {
                    continue;
                };
                segments.push(BarSegment {
                    year,
                    bottom,
                    top: bottom + count,
                    color: s.color,
                    hatch: s.abandoned.then(|| contrast_color(s.color)),
                });
                bottom += count;
            }
        }
        segments
    }

    /// Height of the tallest bar.
    pub fn max_stack(&self) -> u32 {
        (0..self.years.len())
            .map(|i| {
                self.series
                    .iter()
                    .filter_map(|s| s.values.get(i).copied().flatten())
                    .sum::<u32>()
            })
            .max()
            .unwrap_or(0)
    }

    /// Legend entries: one per country.
    pub fn legend(&self) -> impl Iterator<Item = (&str, RGBColor)> {
        self.series
            .iter()
            .filter(|s| !s.abandoned)
            .map(|s| (s.country.as_str(), s.color))
    }

    /// Count of a group in a given year, zero for gaps.
    pub fn value(&self, year: i32, country: &str, abandoned: bool) -> u32 {
        let Some(i) = self.years.iter().position(|&y| y == year) else {
            return 0;
        };
        self.series
            .iter()
            .find(|s| s.country == country && s.abandoned == abandoned)
            .and_then(|s| s.values.get(i).copied().flatten())
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ReactorRecord;
    use crate::timeline::YearRange;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn timeline() -> Timeline {
        let records = vec![
            ReactorRecord::new("Sweden").with_construction_start(date(1970, 1, 1)),
            ReactorRecord::new("Austria")
                .with_construction_start(date(1972, 4, 1))
                .with_abandonment(date(1978, 11, 5)),
            ReactorRecord::new("Austria").with_construction_start(date(1971, 1, 1)),
        ];
        Timeline::aggregate(&records, YearRange::new(1970, 1973).unwrap())
    }

    #[test]
    fn series_order_and_gaps() {
        let data = StackedBarData::from_timeline(&timeline(), &Palette::default()).unwrap();
        let keys: Vec<(&str, bool)> = data
            .series
            .iter()
            .map(|s| (s.country.as_str(), s.abandoned))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("Austria", false),
                ("Austria", true),
                ("Sweden", false),
                ("Sweden", true)
            ]
        );
        assert_eq!(data.series[0].values, vec![None, Some(1), Some(1), Some(1)]);
        assert_eq!(data.series[1].values, vec![None, None, Some(1), Some(1)]);
        assert_eq!(data.series[3].values, vec![None; 4]);
        assert_eq!(data.value(1972, "Austria", true), 1);
        assert_eq!(data.value(1950, "Austria", true), 0);
    }

    #[test]
    fn segments_stack_in_series_order() {
        let data = StackedBarData::from_timeline(&timeline(), &Palette::default()).unwrap();
        let in_1972: Vec<(u32, u32, bool)> = data
            .segments()
            .iter()
            .filter(|s| s.year == 1972)
            .map(|s| (s.bottom, s.top, s.hatch.is_some()))
            .collect();
        assert_eq!(in_1972, vec![(0, 1, false), (1, 2, true), (2, 3, false)]);
        assert_eq!(data.max_stack(), 3);
        assert_eq!(
            data.legend().map(|(c, _)| c).collect::<Vec<_>>(),
            vec!["Austria", "Sweden"]
        );
    }

    #[test]
    fn uncolored_country_fails() {
        let records = vec![ReactorRecord::new("Iceland").with_construction_start(date(1970, 1, 1))];
        let timeline = Timeline::aggregate(&records, YearRange::new(1970, 1971).unwrap());
        let err = StackedBarData::from_timeline(&timeline, &Palette::default()).unwrap_err();
        assert!(matches!(err, ChartError::UnknownCountry(ref c) if c == "Iceland"));
    }
}
