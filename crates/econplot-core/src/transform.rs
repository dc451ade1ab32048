//! Value transforms applied to every column of an aligned table.
//!
//! | Flags | Result per cell |
//! |-------|-----------------|
//! | `apply_change` | `x[i] - x[i-1]` |
//! | `apply_change` + `as_percent` | `(x[i] / x[i-1] - 1) * 100` |
//! | `as_year_over_year` | `(x[i] / x[i-L] - 1) * 100`, `L` = periods per year |
//!
//! Difference and year-over-year may be chained; percent change and
//! year-over-year may not ([`ConflictError`]). A cell whose inputs are missing,
//! whose denominator is zero, or whose result is not finite becomes missing.

use serde::{Deserialize, Serialize};

use crate::{AlignedTable, ConflictError};

/// Which transforms to run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformConfig {
    pub apply_change: bool,
    pub as_percent: bool,
    pub as_year_over_year: bool,
    /// Lag for year-over-year. `None` and `Some(0)` both mean "infer".
    pub periods_per_year: Option<u32>,
}

impl TransformConfig {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn difference() -> Self {
        Self {
            apply_change: true,
            ..Self::default()
        }
    }

    pub fn percent_change() -> Self {
        Self {
            apply_change: true,
            as_percent: true,
            ..Self::default()
        }
    }

    pub fn year_over_year() -> Self {
        Self {
            as_year_over_year: true,
            ..Self::default()
        }
    }

    pub fn with_periods_per_year(mut self, periods: u32) -> Self {
        self.periods_per_year = Some(periods);
        self
    }

    /// Rejects percent change combined with year-over-year.
    pub fn validate(&self) -> Result<(), ConflictError> {
        if self.as_percent && self.as_year_over_year {
            return Err(ConflictError);
        }
        Ok(())
    }

    /// Explicit periods per year, with 0 treated as not supplied.
    pub fn explicit_periods(&self) -> Option<u32> {
        self.periods_per_year.filter(|periods| *periods > 0)
    }

    /// True when `as_percent` is set but has nothing to modify.
    pub fn percent_without_change(&self) -> bool {
        self.as_percent && !self.apply_change
    }

    pub fn is_identity(&self) -> bool {
        !self.apply_change && !self.as_year_over_year
    }

    /// Ordered steps for the given year-over-year lag.
    ///
    /// `year_lag` is only consulted when year-over-year is requested.
    pub fn plan(&self, year_lag: Option<u32>) -> TransformPlan {
        let mut steps = Vec::new();
        if self.apply_change {
            steps.push(if self.as_percent {
                TransformStep::PercentChange { lag: 1 }
            } else {
                TransformStep::Difference
            });
        }
        if self.as_year_over_year {
            if let Some(lag) = year_lag.filter(|lag| *lag > 0) {
                steps.push(TransformStep::PercentChange { lag: lag as usize });
            }
        }
        TransformPlan { steps }
    }
}

/// One column-wise operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum TransformStep {
    /// `x[i] - x[i-1]`.
    Difference,
    /// `(x[i] / x[i-lag] - 1) * 100`.
    PercentChange { lag: usize },
}

impl TransformStep {
    fn apply(self, values: &[Option<f64>]) -> Vec<Option<f64>> {
        match self {
            Self::Difference => lagged(values, 1, |current, previous| Some(current - previous)),
            Self::PercentChange { lag } => lagged(values, lag, |current, previous| {
                if previous == 0.0 {
                    None
                } else {
                    Some((current / previous - 1.0) * 100.0)
                }
            }),
        }
    }
}

/// Steps in execution order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformPlan {
    pub steps: Vec<TransformStep>,
}

impl TransformPlan {
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Runs `plan` over every column. Dates and row order are untouched.
pub fn apply(table: &AlignedTable, plan: &TransformPlan) -> AlignedTable {
    plan.steps.iter().fold(table.clone(), |table, step| {
        tracing::trace!(?step, "applying transform step");
        table.map_columns(|values| step.apply(values))
    })
}

fn lagged<F>(values: &[Option<f64>], lag: usize, combine: F) -> Vec<Option<f64>>
where
    F: Fn(f64, f64) -> Option<f64>,
{
    values
        .iter()
        .enumerate()
        .map(|(index, current)| {
            let previous = index.checked_sub(lag).and_then(|earlier| values[earlier]);
            match (current, previous) {
                (Some(current), Some(previous)) => {
                    combine(*current, previous).filter(|value| value.is_finite())
                }
                _ => None,
            }
        })
        .collect()
}
