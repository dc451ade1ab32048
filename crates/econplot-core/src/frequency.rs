//! Observation frequency inference.

use crate::ObservationDate;

const DAYS_PER_YEAR: f64 = 365.0;

/// Median gap between consecutive dates, in days.
///
/// With an even number of gaps the two middle values are averaged. Returns
/// `None` for fewer than two dates.
pub fn median_spacing_days(dates: &[ObservationDate]) -> Option<f64> {
    let mut gaps: Vec<i64> = dates
        .windows(2)
        .map(|pair| pair[1].days_since(pair[0]))
        .collect();
    if gaps.is_empty() {
        return None;
    }

    gaps.sort_unstable();
    let middle = gaps.len() / 2;
    let median = if gaps.len() % 2 == 0 {
        (gaps[middle - 1] + gaps[middle]) as f64 / 2.0
    } else {
        gaps[middle] as f64
    };
    Some(median)
}

/// Estimated observations per year: `round(365 / median spacing)`, at least 1.
///
/// Returns `None` when there are fewer than two dates.
pub fn infer_periods_per_year(dates: &[ObservationDate]) -> Option<u32> {
    let median = median_spacing_days(dates)?;
    if median <= 0.0 {
        return None;
    }

    let periods = (DAYS_PER_YEAR / median).round().max(1.0) as u32;
    tracing::debug!(median_days = median, periods, "inferred periods per year");
    Some(periods)
}
