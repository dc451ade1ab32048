//! # Domain Models
//!
//! Canonical types shared by the fetchers, the aligner, the transforms and
//! the renderers.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`SeriesRequest`] | Identifier plus source of one series |
//! | [`Observation`] | One dated value |
//! | [`RawSeries`] | Ascending, de-duplicated observations of one series |
//! | [`AlignedTable`] | Inner-joined table, one [`ValueColumn`] per request |
//! | [`ObservationDate`] | Calendar date used as the join key |
//!
//! Constructors validate their invariants; an [`AlignedTable`] can only be
//! built with ascending unique dates and equal-length columns.

mod date;
mod series;
mod table;

pub use date::ObservationDate;
pub use series::{Observation, RawSeries, SeriesRequest};
pub use table::{AlignedTable, ValueColumn};
