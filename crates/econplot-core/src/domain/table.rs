use serde::{Deserialize, Serialize};

use crate::{ObservationDate, SourceKind};

/// Values of one requested series, positionally aligned with the table dates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueColumn {
    pub identifier: String,
    pub source: SourceKind,
    pub values: Vec<Option<f64>>,
}

impl ValueColumn {
    pub fn new(identifier: impl Into<String>, source: SourceKind, values: Vec<Option<f64>>) -> Self {
        Self {
            identifier: identifier.into(),
            source,
            values,
        }
    }

    pub fn present(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().filter_map(|value| *value)
    }

    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|value| value.is_none()).count()
    }
}

/// Date-keyed table of one or more series.
///
/// Dates are ascending and unique, every column has exactly one cell per
/// date, and columns keep request order. A freshly aligned table has no
/// missing cells; transforms may introduce them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedTable {
    dates: Vec<ObservationDate>,
    columns: Vec<ValueColumn>,
}

impl AlignedTable {
    /// Returns `None` when a column length disagrees with the date count or
    /// the dates are not strictly ascending.
    pub fn new(dates: Vec<ObservationDate>, columns: Vec<ValueColumn>) -> Option<Self> {
        if columns.iter().any(|column| column.values.len() != dates.len()) {
            return None;
        }
        if dates.windows(2).any(|pair| pair[0] >= pair[1]) {
            return None;
        }
        Some(Self { dates, columns })
    }

    pub fn empty() -> Self {
        Self {
            dates: Vec::new(),
            columns: Vec::new(),
        }
    }

    pub fn dates(&self) -> &[ObservationDate] {
        &self.dates
    }

    pub fn columns(&self) -> &[ValueColumn] {
        &self.columns
    }

    pub fn column(&self, index: usize) -> Option<&ValueColumn> {
        self.columns.get(index)
    }

    pub fn row_count(&self) -> usize {
        self.dates.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn first_date(&self) -> Option<ObservationDate> {
        self.dates.first().copied()
    }

    pub fn last_date(&self) -> Option<ObservationDate> {
        self.dates.last().copied()
    }

    /// Sources involved, in first-seen order.
    pub fn sources(&self) -> Vec<SourceKind> {
        let mut sources = Vec::new();
        for column in &self.columns {
            if !sources.contains(&column.source) {
                sources.push(column.source);
            }
        }
        sources
    }

    /// Replaces every column's values with `transform(values)`, keeping dates
    /// and row order. The closure must return one cell per row.
    pub fn map_columns<F>(&self, mut transform: F) -> Self
    where
        F: FnMut(&[Option<f64>]) -> Vec<Option<f64>>,
    {
        let columns = self
            .columns
            .iter()
            .map(|column| {
                let values = transform(&column.values);
                debug_assert_eq!(values.len(), self.dates.len());
                ValueColumn::new(column.identifier.clone(), column.source, values)
            })
            .collect();

        Self {
            dates: self.dates.clone(),
            columns,
        }
    }

    /// Smallest and largest present value across all columns.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.columns
            .iter()
            .flat_map(ValueColumn::present)
            .fold(None, |range, value| match range {
                None => Some((value, value)),
                Some((low, high)) => Some((low.min(value), high.max(value))),
            })
    }
}
