use serde::{Deserialize, Serialize};

use crate::{ObservationDate, SourceKind, ValidationError};

/// What to fetch and from where.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeriesRequest {
    identifier: String,
    source: SourceKind,
}

impl SeriesRequest {
    pub fn new(identifier: impl Into<String>, source: SourceKind) -> Result<Self, ValidationError> {
        let identifier = identifier.into().trim().to_owned();
        if identifier.is_empty() {
            return Err(ValidationError::EmptyIdentifier);
        }
        Ok(Self { identifier, source })
    }

    pub fn fred(identifier: impl Into<String>) -> Result<Self, ValidationError> {
        Self::new(identifier, SourceKind::Fred)
    }

    pub fn bls(identifier: impl Into<String>) -> Result<Self, ValidationError> {
        Self::new(identifier, SourceKind::Bls)
    }

    pub fn file(path: impl Into<String>) -> Result<Self, ValidationError> {
        Self::new(path, SourceKind::File)
    }

    /// Builds a request from a free-form source tag (`fred`, `bls`, `file`).
    pub fn parse(identifier: &str, source_tag: &str) -> Result<Self, ValidationError> {
        let source = source_tag
            .parse::<SourceKind>()
            .map_err(|_| ValidationError::InvalidSource {
                identifier: identifier.trim().to_owned(),
                value: source_tag.trim().to_owned(),
            })?;
        Self::new(identifier, source)
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub const fn source(&self) -> SourceKind {
        self.source
    }
}

/// One dated numeric observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: ObservationDate,
    pub value: f64,
}

impl Observation {
    pub const fn new(date: ObservationDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// Fetched series: ascending, one finite value per distinct date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSeries {
    pub identifier: String,
    pub source: SourceKind,
    observations: Vec<Observation>,
}

impl RawSeries {
    /// Sorts by date, drops non-finite values and keeps the last value seen
    /// for a repeated date.
    pub fn new(
        identifier: impl Into<String>,
        source: SourceKind,
        mut observations: Vec<Observation>,
    ) -> Self {
        let identifier = identifier.into();
        let before = observations.len();
        observations.retain(|observation| observation.value.is_finite());
        observations.sort_by_key(|observation| observation.date);

        let mut deduped: Vec<Observation> = Vec::with_capacity(observations.len());
        for observation in observations {
            match deduped.last_mut() {
                Some(last) if last.date == observation.date => *last = observation,
                _ => deduped.push(observation),
            }
        }

        if deduped.len() != before {
            tracing::debug!(
                series = %identifier,
                dropped = before - deduped.len(),
                "dropped non-finite or duplicate observations"
            );
        }

        Self {
            identifier,
            source,
            observations: deduped,
        }
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn first_date(&self) -> Option<ObservationDate> {
        self.observations.first().map(|observation| observation.date)
    }

    pub fn last_date(&self) -> Option<ObservationDate> {
        self.observations.last().map(|observation| observation.date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(value: &str) -> ObservationDate {
        ObservationDate::parse(value).expect("valid date")
    }

    #[test]
    fn request_trims_and_rejects_empty_identifier() {
        let request = SeriesRequest::fred("  UNRATE ").expect("valid");
        assert_eq!(request.identifier(), "UNRATE");

        let err = SeriesRequest::bls("   ").expect_err("must fail");
        assert_eq!(err, ValidationError::EmptyIdentifier);
    }

    #[test]
    fn request_parse_names_identifier_on_bad_tag() {
        let err = SeriesRequest::parse("CPIAUCSL", "quandl").expect_err("must fail");
        assert_eq!(
            err,
            ValidationError::InvalidSource {
                identifier: String::from("CPIAUCSL"),
                value: String::from("quandl"),
            }
        );
    }

    #[test]
    fn raw_series_sorts_and_dedupes() {
        let series = RawSeries::new(
            "X",
            SourceKind::File,
            vec![
                Observation::new(date("2024-03-01"), 3.0),
                Observation::new(date("2024-01-01"), 1.0),
                Observation::new(date("2024-02-01"), f64::NAN),
                Observation::new(date("2024-03-01"), 4.0),
            ],
        );

        let dates: Vec<String> = series
            .observations()
            .iter()
            .map(|observation| observation.date.to_string())
            .collect();
        assert_eq!(dates, vec!["2024-01-01", "2024-03-01"]);
        assert_eq!(series.observations()[1].value, 4.0);
    }
}
