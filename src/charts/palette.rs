//! Country color table.

use crate::charts::ChartError;
use plotters::style::RGBColor;
use std::collections::BTreeMap;

/// Colors of the European reactor dataset, one per country.
pub const COUNTRY_COLORS: [(&str, &str); 22] = [
    ("Austria", "#FF00FF"),
    ("Belarus", "#0072b1"),
    ("Belgium", "#e6a000"),
    ("Bulgaria", "#bfef45"),
    ("Czech Republic", "#c4022b"),
    ("Finland", "#9300d3"),
    ("France", "#000000"),
    ("Germany", "#d45e00"),
    ("Hungary", "#FFD700"),
    ("Italy", "#5d5a5a"),
    ("Lithuania", "#FA8072"),
    ("Netherlands", "#9e9e00"),
    ("Poland", "#CCCCFF"),
    ("Romania", "#a65959"),
    ("Slovakia", "#36648B"),
    ("Slovenia", "#7DF9FF"),
    ("Spain", "#c0c0c0"),
    ("Sweden", "#2ca02c"),
    ("Switzerland", "#c400a4"),
    ("Turkey", "#9FE2BF"),
    ("Ukraine", "#48066f"),
    ("United Kingdom", "#ff0000"),
];

/// Parse `#RRGGBB` (the `#` is optional).
pub fn parse_hex(value: &str) -> Option<RGBColor> {
    let hex = value.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some(RGBColor(channel(0)?, channel(2)?, channel(4)?))
}

/// Black on light colors, white on dark ones. Used for hatch strokes.
pub fn contrast_color(color: RGBColor) -> RGBColor {
    let RGBColor(r, g, b) = color;
    let luma = 0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64;
    if luma > 140.0 {
        RGBColor(0, 0, 0)
    } else {
        RGBColor(255, 255, 255)
    }
}

/// Fixed country-to-color lookup. Every country in the data must have an
/// entry; there is no fallback color.
#[derive(Debug, Clone)]
pub struct Palette {
    colors: BTreeMap<String, RGBColor>,
}

impl Default for Palette {
    fn default() -> Self {
        let colors = COUNTRY_COLORS
            .iter()
            .filter_map(|(country, hex)| Some((country.to_string(), parse_hex(hex)?)))
            .collect();
        Self { colors }
    }
}

impl Palette {
    /// Add or replace entries from `country -> #RRGGBB` pairs.
    pub fn with_overrides(mut self, overrides: &BTreeMap<String, String>) -> Result<Self, ChartError> {
        for (country, hex) in overrides {
            let color = parse_hex(hex).ok_or_else(|| ChartError::InvalidColor {
                country: country.clone(),
                value: hex.clone(),
            })?;
            self.colors.insert(country.clone(), color);
        }
        Ok(self)
    }

    pub fn color(&self, country: &str) -> Result<RGBColor, ChartError> {
        self.colors
            .get(country)
            .copied()
            .ok_or_else(|| ChartError::UnknownCountry(country.to_string()))
    }

    /// Fail on the first country without a color.
    pub fn ensure_covers<'a>(&self, countries: impl IntoIterator<Item = &'a str>) -> Result<(), ChartError> {
        for country in countries {
            self.color(country)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_is_complete() {
        let palette = Palette::default();
        assert!(COUNTRY_COLORS.iter().all(|(country, _)| palette.color(country).is_ok()));
        assert_eq!(palette.color("France").unwrap(), RGBColor(0, 0, 0));
        assert_eq!(palette.color("United Kingdom").unwrap(), RGBColor(255, 0, 0));
    }

    #[test]
    fn unknown_country_is_a_configuration_error() {
        let err = Palette::default().color("Atlantis").unwrap_err();
        assert!(matches!(err, ChartError::UnknownCountry(ref c) if c == "Atlantis"));

        let err = Palette::default()
            .ensure_covers(["France", "Portugal", "Spain"])
            .unwrap_err();
        assert!(matches!(err, ChartError::UnknownCountry(ref c) if c == "Portugal"));
    }

    #[test]
    fn overrides_add_and_replace() {
        let overrides = BTreeMap::from([
            ("Portugal".to_string(), "#006600".to_string()),
            ("France".to_string(), "0055A4".to_string()),
        ]);
        let palette = Palette::default().with_overrides(&overrides).unwrap();
        assert_eq!(palette.color("Portugal").unwrap(), RGBColor(0, 102, 0));
        assert_eq!(palette.color("France").unwrap(), RGBColor(0, 85, 164));
    }

    #[test]
    fn bad_override_is_rejected() {
        let overrides = BTreeMap::from([("Portugal".to_string(), "green".to_string())]);
        assert!(matches!(
            Palette::default().with_overrides(&overrides),
            Err(ChartError::InvalidColor { .. })
        ));
    }

    #[test]
    fn parses_hex_and_picks_contrast() {
        assert_eq!(parse_hex("#FFD700"), Some(RGBColor(255, 215, 0)));
        assert_eq!(parse_hex("#FFF"), None);
        assert_eq!(contrast_color(RGBColor(255, 215, 0)), RGBColor(0, 0, 0));
        assert_eq!(contrast_color(RGBColor(0, 0, 0)), RGBColor(255, 255, 255));
    }
}
