//! # Chart Rendering
//!
//! Renderers turn an [`AlignedTable`] plus a [`PlotConfig`] into a standalone
//! SVG document.
//!
//! | Renderer | Chart |
//! |----------|-------|
//! | [`LineRenderer`] | One line per column over time; missing cells break the line |
//! | [`ScatterCohortRenderer`] | Column 0 against column 1, coloured by calendar-year cohort |
//! | [`VerticalDropRenderer`] | A vertical bar from zero to every value |

mod drop;
mod line;
mod scatter;
mod svg;

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{AlignedTable, SourceKind, ValidationError};

pub use drop::VerticalDropRenderer;
pub use line::LineRenderer;
pub use scatter::{cohorts, Cohort, ScatterCohortRenderer};

/// Series colours, assigned by column index.
pub const PALETTE: [&str; 10] = [
    "#001c7f", "#b1400d", "#12711c", "#8c0800", "#591e71", "#592f0d", "#a23582", "#3c3c3c",
    "#b8850a", "#006374",
];

/// Colour of the scatter cohort before the cutoff year.
pub const MUTED_COLOR: &str = "#808080";

pub(crate) fn palette_color(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}

/// Corner the legend box is anchored to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LegendPosition {
    #[default]
    UpperRight,
    UpperLeft,
    LowerRight,
    LowerLeft,
}

impl LegendPosition {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UpperRight => "upper-right",
            Self::UpperLeft => "upper-left",
            Self::LowerRight => "lower-right",
            Self::LowerLeft => "lower-left",
        }
    }

    pub(crate) const fn is_right(self) -> bool {
        matches!(self, Self::UpperRight | Self::LowerRight)
    }

    pub(crate) const fn is_upper(self) -> bool {
        matches!(self, Self::UpperRight | Self::UpperLeft)
    }
}

impl Display for LegendPosition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LegendPosition {
    type Err = ValidationError;

    /// Accepts `upper-right`, `upper right` and `upper_right` spellings.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value
            .trim()
            .to_ascii_lowercase()
            .replace(|ch: char| ch == ' ' || ch == '_', "-");
        match normalized.as_str() {
            "upper-right" => Ok(Self::UpperRight),
            "upper-left" => Ok(Self::UpperLeft),
            "lower-right" => Ok(Self::LowerRight),
            "lower-left" => Ok(Self::LowerLeft),
            _ => Err(ValidationError::InvalidLegendPosition {
                value: value.to_owned(),
            }),
        }
    }
}

/// Labels and cosmetics for one chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotConfig {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub legend: LegendPosition,
    /// Footer text. `None` derives it from the sources; an empty string
    /// suppresses the footer.
    pub attribution: Option<String>,
    /// Legend labels by column index; missing entries fall back to the
    /// series identifier.
    pub series_labels: Vec<String>,
    pub width: u32,
    pub height: u32,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            title: String::from("Economic Data Plot"),
            x_label: String::from("Date"),
            y_label: String::from("Series Value"),
            legend: LegendPosition::default(),
            attribution: None,
            series_labels: Vec::new(),
            width: 1200,
            height: 800,
        }
    }
}

impl PlotConfig {
    pub fn label_for(&self, table: &AlignedTable, index: usize) -> String {
        self.series_labels
            .get(index)
            .filter(|label| !label.trim().is_empty())
            .cloned()
            .or_else(|| table.column(index).map(|column| column.identifier.clone()))
            .unwrap_or_else(|| format!("Series {}", index + 1))
    }

    pub fn footer_text(&self, sources: &[SourceKind]) -> Option<String> {
        match &self.attribution {
            Some(text) if text.trim().is_empty() => None,
            Some(text) => Some(text.clone()),
            None => default_attribution(sources),
        }
    }
}

/// `"Source: <publishers>"` for the remote sources involved, joined with
/// "and"; `None` when only local files were used.
pub fn default_attribution(sources: &[SourceKind]) -> Option<String> {
    let mut publishers: Vec<&str> = Vec::new();
    for source in sources.iter().filter(|source| source.is_remote()) {
        let publisher = source.publisher();
        if !publishers.contains(&publisher) {
            publishers.push(publisher);
        }
    }

    if publishers.is_empty() {
        None
    } else {
        Some(format!("Source: {}", publishers.join(" and ")))
    }
}

/// Failure to draw a table.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("{chart} chart needs exactly {expected} series, got {found}")]
    ColumnCount {
        chart: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("table has no values to plot")]
    NoValues,
}

impl RenderError {
    pub const fn code(&self) -> &'static str {
        match self {
            Self::ColumnCount { .. } => "render.column_count",
            Self::NoValues => "render.no_values",
        }
    }
}

/// Chart backend contract.
pub trait Renderer {
    /// Short chart name used in logs and output metadata.
    fn name(&self) -> &'static str;

    /// Draws `table` and returns the SVG document.
    fn render(&self, table: &AlignedTable, config: &PlotConfig) -> Result<String, RenderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribution_names_remote_publishers() {
        assert_eq!(
            default_attribution(&[SourceKind::Fred]).as_deref(),
            Some("Source: Federal Reserve Economic Data")
        );
        assert_eq!(
            default_attribution(&[SourceKind::Fred, SourceKind::File, SourceKind::Bls]).as_deref(),
            Some("Source: Federal Reserve Economic Data and U.S. Bureau of Labor Statistics")
        );
        assert_eq!(default_attribution(&[SourceKind::File]), None);
    }

    #[test]
    fn explicit_attribution_wins_and_blank_suppresses() {
        let mut config = PlotConfig {
            attribution: Some(String::from("Source: my desk")),
            ..PlotConfig::default()
        };
        assert_eq!(
            config.footer_text(&[SourceKind::Fred]).as_deref(),
            Some("Source: my desk")
        );

        config.attribution = Some(String::new());
        assert_eq!(config.footer_text(&[SourceKind::Fred]), None);
    }

    #[test]
    fn legend_position_parses_loose_spellings() {
        assert_eq!("upper right".parse::<LegendPosition>(), Ok(LegendPosition::UpperRight));
        assert_eq!("LOWER_LEFT".parse::<LegendPosition>(), Ok(LegendPosition::LowerLeft));
        assert!("center".parse::<LegendPosition>().is_err());
    }
}
