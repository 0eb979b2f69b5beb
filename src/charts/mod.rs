//! Charts module - stacked bar rendering and HTML export

mod html;
mod palette;
mod renderer;
mod series;

pub use html::{ChartPage, HtmlExporter, YearRow};
pub use palette::{contrast_color, parse_hex, Palette, COUNTRY_COLORS};
pub use renderer::{ChartError, StaticChartRenderer};
pub use series::{BarSegment, BarSeries, StackedBarData};
