//! Inner join of independently fetched series on their dates.

use std::collections::BTreeMap;

use crate::{AlignedTable, ObservationDate, RawSeries, ValueColumn};

/// Joins `series` into one table, keeping only dates on or after `start`
/// that every series has a value for.
///
/// Column order follows the input order. The first series seeds the date set
/// and each following series can only shrink it, so sparse or misaligned
/// inputs narrow the window instead of producing gaps. An empty input or an
/// empty intersection yields an empty table.
pub fn inner_join(series: &[RawSeries], start: ObservationDate) -> AlignedTable {
    let lookups: Vec<BTreeMap<ObservationDate, f64>> = series
        .iter()
        .map(|series| {
            series
                .observations()
                .iter()
                .filter(|observation| observation.date >= start)
                .map(|observation| (observation.date, observation.value))
                .collect()
        })
        .collect();

    let Some((seed, rest)) = lookups.split_first() else {
        return AlignedTable::empty();
    };

    let dates: Vec<ObservationDate> = seed
        .keys()
        .copied()
        .filter(|date| rest.iter().all(|lookup| lookup.contains_key(date)))
        .collect();

    let columns = series
        .iter()
        .zip(&lookups)
        .map(|(series, lookup)| {
            let values = dates.iter().map(|date| lookup.get(date).copied()).collect();
            ValueColumn::new(series.identifier.clone(), series.source, values)
        })
        .collect();

    tracing::debug!(
        series = series.len(),
        rows = dates.len(),
        "aligned series on common dates"
    );

    // BTreeMap keys are ascending and unique, and every column has one value
    // per retained date.
    AlignedTable::new(dates, columns).unwrap_or_else(AlignedTable::empty)
}
