//! Fetch → align → infer → transform, for one chart invocation.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;

use crate::align::inner_join;
use crate::data_source::FetchRequest;
use crate::frequency::infer_periods_per_year;
use crate::transform::{self, TransformConfig, TransformPlan};
use crate::{
    AlignedTable, ObservationDate, PipelineError, RawSeries, SeriesRequest, SeriesRouter,
    SourceKind, ValidationError,
};

/// Everything one pipeline run needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineRequest {
    pub series: Vec<SeriesRequest>,
    pub start: ObservationDate,
    pub transform: TransformConfig,
}

impl PipelineRequest {
    pub fn new(series: Vec<SeriesRequest>, start: ObservationDate) -> Self {
        Self {
            series,
            start,
            transform: TransformConfig::default(),
        }
    }

    pub fn with_transform(mut self, transform: TransformConfig) -> Self {
        self.transform = transform;
        self
    }

    /// Builds the request list from raw `(identifier, source tag)` pairs.
    ///
    /// The first unknown tag fails with [`PipelineError::InvalidSource`]
    /// naming its identifier.
    pub fn from_specs<'a, I>(specs: I, start: ObservationDate) -> Result<Self, PipelineError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let series = specs
            .into_iter()
            .map(|(identifier, tag)| {
                SeriesRequest::parse(identifier, tag).map_err(|err| match err {
                    ValidationError::InvalidSource { identifier, value } => {
                        PipelineError::InvalidSource {
                            identifier,
                            source_tag: value,
                        }
                    }
                    other => PipelineError::Validation(other),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(series, start))
    }
}

/// Result of a successful run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineOutput {
    pub table: AlignedTable,
    /// Lag used (or that would be used) for year-over-year.
    pub periods_per_year: Option<u32>,
    pub periods_inferred: bool,
    pub plan: TransformPlan,
    pub warnings: Vec<String>,
    pub source_chain: Vec<SourceKind>,
    pub latency_ms: u64,
}

/// Sequential pipeline over a shared router.
#[derive(Debug, Clone)]
pub struct SeriesPipeline {
    router: Arc<SeriesRouter>,
}

impl SeriesPipeline {
    pub fn new(router: Arc<SeriesRouter>) -> Self {
        Self { router }
    }

    pub fn router(&self) -> &SeriesRouter {
        &self.router
    }

    /// Runs one invocation.
    ///
    /// Request problems (conflicting transforms, empty or unroutable series
    /// lists) are reported before anything is fetched. Series are fetched one
    /// after another in request order and the first failure aborts the run.
    ///
    /// # Errors
    ///
    /// See [`PipelineError`] for the taxonomy.
    #[tracing::instrument(name = "pipeline.run", skip_all, fields(series = request.series.len(), start = %request.start))]
    pub async fn run(&self, request: &PipelineRequest) -> Result<PipelineOutput, PipelineError> {
        let started = Instant::now();
        request.transform.validate()?;
        if request.series.is_empty() {
            return Err(PipelineError::EmptyRequest);
        }
        self.router.ensure_registered(&request.series)?;

        let mut warnings = Vec::new();
        if request.transform.percent_without_change() {
            tracing::warn!("percent flag has no effect without the change flag");
            warnings.push(String::from(
                "percent change requested without change; values left as levels",
            ));
        }

        let fetched = self.fetch_all(request).await?;

        let table = inner_join(&fetched, request.start);
        if table.is_empty() {
            return Err(PipelineError::NoOverlappingData {
                start: request.start,
            });
        }
        let dropped = fetched
            .iter()
            .filter(|series| series.len() > table.row_count())
            .count();
        if dropped > 0 {
            tracing::debug!(rows = table.row_count(), "inner join narrowed the window");
        }

        let (periods_per_year, periods_inferred) = match request.transform.explicit_periods() {
            Some(periods) => (Some(periods), false),
            None => (infer_periods_per_year(table.dates()), true),
        };

        if request.transform.as_year_over_year {
            let Some(lag) = periods_per_year else {
                return Err(PipelineError::InsufficientData {
                    rows: table.row_count(),
                });
            };
            if lag as usize >= table.row_count() {
                let warning = format!(
                    "year-over-year lag of {lag} periods covers all {} rows; every value is missing",
                    table.row_count()
                );
                tracing::warn!(lag, rows = table.row_count(), "year-over-year lag exceeds data");
                warnings.push(warning);
            }
        }

        let plan = request.transform.plan(periods_per_year);
        let table = transform::apply(&table, &plan);
        let source_chain = table.sources();

        tracing::info!(
            rows = table.row_count(),
            columns = table.column_count(),
            periods_per_year,
            "pipeline completed"
        );

        Ok(PipelineOutput {
            table,
            periods_per_year,
            periods_inferred,
            plan,
            warnings,
            source_chain,
            latency_ms: started.elapsed().as_millis() as u64,
        })
    }

    async fn fetch_all(&self, request: &PipelineRequest) -> Result<Vec<RawSeries>, PipelineError> {
        let mut fetched = Vec::with_capacity(request.series.len());
        for series in &request.series {
            let source = self.router.source(series.source()).ok_or_else(|| {
                PipelineError::InvalidSource {
                    identifier: series.identifier().to_owned(),
                    source_tag: series.source().to_string(),
                }
            })?;

            let fetch = FetchRequest::new(series.identifier()).with_start(request.start);
            let raw = source.fetch(fetch).await.map_err(|cause| {
                tracing::warn!(
                    series = %series.identifier(),
                    source = %series.source(),
                    error = %cause,
                    "series fetch failed"
                );
                PipelineError::Fetch {
                    identifier: series.identifier().to_owned(),
                    source_kind: series.source(),
                    cause,
                }
            })?;
            fetched.push(raw);
        }
        Ok(fetched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start() -> ObservationDate {
        ObservationDate::from_ymd(2000, 1, 1).expect("valid")
    }

    #[test]
    fn from_specs_reports_offending_identifier() {
        let err = PipelineRequest::from_specs([("UNRATE", "fred"), ("CPI", "quandl")], start())
            .expect_err("must fail");

        assert!(matches!(
            err,
            PipelineError::InvalidSource { ref identifier, ref source_tag }
                if identifier == "CPI" && source_tag == "quandl"
        ));
    }

    #[test]
    fn from_specs_keeps_order() {
        let request = PipelineRequest::from_specs([("B", "BLS"), ("A", "fred")], start())
            .expect("valid");
        assert_eq!(request.series[0].source(), SourceKind::Bls);
        assert_eq!(request.series[1].identifier(), "A");
    }
}
