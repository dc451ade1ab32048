use std::collections::BTreeSet;

use serde::Serialize;

use crate::AlignedTable;

use super::svg::{numeric_ticks, padded_domain, Canvas, LegendEntry, LegendMarker};
use super::{palette_color, PlotConfig, RenderError, Renderer, MUTED_COLOR};

/// A colour group of calendar years.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cohort {
    pub label: String,
    pub years: Vec<i32>,
    /// The grey group of years before the cutoff.
    pub muted: bool,
}

/// Groups `years` for colouring.
///
/// Years before `cutoff` form one muted "Before {cutoff}" cohort. The
/// remaining distinct years are paired in ascending order ("2020 - 2021",
/// "2022 - 2023"); a trailing unpaired year is labelled "{year} - Present".
pub fn cohorts(years: impl IntoIterator<Item = i32>, cutoff: i32) -> Vec<Cohort> {
    let years: BTreeSet<i32> = years.into_iter().collect();
    let (before, after): (Vec<i32>, Vec<i32>) =
        years.into_iter().partition(|year| *year < cutoff);

    let mut groups = Vec::new();
    if !before.is_empty() {
        groups.push(Cohort {
            label: format!("Before {cutoff}"),
            years: before,
            muted: true,
        });
    }

    for pair in after.chunks(2) {
        let label = match pair {
            [first, second] => format!("{first} - {second}"),
            [only] => format!("{only} - Present"),
            _ => continue,
        };
        groups.push(Cohort {
            label,
            years: pair.to_vec(),
            muted: false,
        });
    }
    groups
}

/// Column 0 on x against column 1 on y, coloured by [`cohorts`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScatterCohortRenderer {
    pub cohort_cutoff: i32,
    pub marker_radius: f64,
}

impl Default for ScatterCohortRenderer {
    fn default() -> Self {
        Self {
            cohort_cutoff: 2020,
            marker_radius: 5.0,
        }
    }
}

impl ScatterCohortRenderer {
    pub fn with_cutoff(cohort_cutoff: i32) -> Self {
        Self {
            cohort_cutoff,
            ..Self::default()
        }
    }
}

impl Renderer for ScatterCohortRenderer {
    fn name(&self) -> &'static str {
        "scatter"
    }

    fn render(&self, table: &AlignedTable, config: &PlotConfig) -> Result<String, RenderError> {
        let (Some(xs), Some(ys), 2) = (table.column(0), table.column(1), table.column_count())
        else {
            return Err(RenderError::ColumnCount {
                chart: "scatter",
                expected: 2,
                found: table.column_count(),
            });
        };

        let points: Vec<(i32, f64, f64)> = table
            .dates()
            .iter()
            .zip(xs.values.iter().zip(&ys.values))
            .filter_map(|(date, pair)| match pair {
                (Some(x), Some(y)) => Some((date.year(), *x, *y)),
                _ => None,
            })
            .collect();
        if points.is_empty() {
            return Err(RenderError::NoValues);
        }

        let (x_low, x_high) = bounds(points.iter().map(|(_, x, _)| *x));
        let (y_low, y_high) = bounds(points.iter().map(|(_, _, y)| *y));
        let x_domain = padded_domain(x_low, x_high, false);
        let y_domain = padded_domain(y_low, y_high, false);

        let mut canvas = Canvas::new(
            config,
            x_domain,
            y_domain,
            &numeric_ticks(x_domain.0, x_domain.1),
            &numeric_ticks(y_domain.0, y_domain.1),
        );

        let groups = cohorts(points.iter().map(|(year, _, _)| *year), self.cohort_cutoff);
        let mut legend = Vec::with_capacity(groups.len());
        let mut bucket = 0;
        for group in &groups {
            let (color, opacity) = if group.muted {
                (MUTED_COLOR, 0.6)
            } else {
                bucket += 1;
                (palette_color(bucket - 1), 1.0)
            };

            for (_, x, y) in points.iter().filter(|(year, _, _)| group.years.contains(year)) {
                let (cx, cy) = (canvas.x(*x), canvas.y(*y));
                canvas.circle(cx, cy, self.marker_radius, color, opacity);
            }
            legend.push(LegendEntry::new(group.label.clone(), color, LegendMarker::Dot));
        }

        tracing::debug!(points = points.len(), cohorts = groups.len(), "scatter cohorts drawn");
        let footer = config.footer_text(&table.sources());
        Ok(canvas.finish(&legend, footer.as_deref()))
    }
}

fn bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(low, high), value| {
        (low.min(value), high.max(value))
    })
}
