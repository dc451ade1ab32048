//! Behaviour tests for request rejection and failure reporting.
//!
//! Every rejection that can be decided from the request alone must happen
//! before any source is asked for data.

#[path = "support/mod.rs"]
mod support;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use econplot_core::{
    EnvelopeError, PipelineError, PipelineRequest, SeriesPipeline, SeriesRequest, SeriesRouter,
    SeriesSource, SourceErrorKind, SourceKind, TransformConfig,
};
use support::{date, monthly, points, RecordingSource};

fn router_of(sources: Vec<RecordingSource>) -> SeriesPipeline {
    let sources: Vec<Arc<dyn SeriesSource>> = sources
        .into_iter()
        .map(|source| Arc::new(source) as Arc<dyn SeriesSource>)
        .collect();
    SeriesPipeline::new(Arc::new(SeriesRouter::new(sources)))
}

// =============================================================================
// Conflicting transforms
// =============================================================================

#[tokio::test]
async fn when_percent_and_year_over_year_are_combined_nothing_is_fetched() {
    // Given: a healthy source
    let source = RecordingSource::new(SourceKind::Fred)
        .with_series("CPIAUCSL", points(&monthly(2020, 24), &[1.0; 24]));
    let calls = source.calls();
    let pipeline = router_of(vec![source]);

    // When: percent change and year-over-year are both requested
    let transform = TransformConfig {
        apply_change: true,
        as_percent: true,
        as_year_over_year: true,
        periods_per_year: Some(12),
    };
    let request = PipelineRequest::new(
        vec![SeriesRequest::fred("CPIAUCSL").expect("valid")],
        date("2000-01-01"),
    )
    .with_transform(transform);
    let error = pipeline.run(&request).await.expect_err("conflict must fail");

    // Then: the run stops with a conflict and the source was never called
    assert!(matches!(error, PipelineError::Conflict(_)));
    assert_eq!(error.code(), "pipeline.conflict");
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn percent_with_year_over_year_conflicts_even_without_change() {
    let transform = TransformConfig {
        as_percent: true,
        as_year_over_year: true,
        ..TransformConfig::none()
    };

    assert!(transform.validate().is_err());
}

// =============================================================================
// Invalid sources
// =============================================================================

#[test]
fn unknown_source_tag_names_the_offending_series() {
    // When: the second of three series carries an unknown tag
    let result = PipelineRequest::from_specs(
        [("UNRATE", "fred"), ("GDP", "worldbank"), ("x.csv", "file")],
        date("2000-01-01"),
    );

    // Then: the error names that series and its tag
    let error = result.expect_err("unknown tag must fail");
    assert!(matches!(
        error,
        PipelineError::InvalidSource { ref identifier, ref source_tag }
            if identifier == "GDP" && source_tag == "worldbank"
    ));
    assert_eq!(error.identifier(), Some("GDP"));
}

#[tokio::test]
async fn when_a_later_series_has_no_adapter_earlier_series_are_not_fetched() {
    // Given: only FRED is registered
    let source = RecordingSource::new(SourceKind::Fred)
        .with_series("UNRATE", points(&monthly(2020, 3), &[1.0; 3]));
    let calls = source.calls();
    let pipeline = router_of(vec![source]);

    // When: a BLS series follows a FRED one
    let request = PipelineRequest::new(
        vec![
            SeriesRequest::fred("UNRATE").expect("valid"),
            SeriesRequest::bls("LNS14000000").expect("valid"),
        ],
        date("2000-01-01"),
    );
    let error = pipeline.run(&request).await.expect_err("unregistered source must fail");

    // Then: the BLS series is reported and FRED was never called
    assert_eq!(error.code(), "pipeline.invalid_source");
    assert_eq!(error.identifier(), Some("LNS14000000"));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn empty_request_is_rejected() {
    let pipeline = router_of(vec![RecordingSource::new(SourceKind::Fred)]);

    let request = PipelineRequest::new(Vec::new(), date("2000-01-01"));
    let error = pipeline.run(&request).await.expect_err("empty request must fail");

    assert!(matches!(error, PipelineError::EmptyRequest));
}

#[test]
fn blank_identifier_is_a_validation_error() {
    let error = PipelineRequest::from_specs([("  ", "fred")], date("2000-01-01"))
        .expect_err("blank identifier must fail");

    assert_eq!(error.code(), "pipeline.validation");
}

// =============================================================================
// Fetch failures
// =============================================================================

#[tokio::test]
async fn when_a_fetch_fails_the_run_stops_and_names_series_and_source() {
    // Given: FRED knows A but not B, BLS knows C
    let fred = RecordingSource::new(SourceKind::Fred)
        .with_series("A", points(&monthly(2020, 3), &[1.0; 3]));
    let bls = RecordingSource::new(SourceKind::Bls)
        .with_series("C", points(&monthly(2020, 3), &[1.0; 3]));
    let fred_calls = fred.calls();
    let bls_calls = bls.calls();
    let pipeline = router_of(vec![fred, bls]);

    // When: A, B, C are requested in that order
    let request = PipelineRequest::from_specs(
        [("A", "fred"), ("B", "fred"), ("C", "bls")],
        date("2000-01-01"),
    )
    .expect("known tags");
    let error = pipeline.run(&request).await.expect_err("B must fail");

    // Then: B is reported and C was never requested
    let PipelineError::Fetch {
        ref identifier,
        source_kind,
        ref cause,
    } = error
    else {
        panic!("expected fetch error, got {error:?}");
    };
    assert_eq!(identifier, "B");
    assert_eq!(source_kind, SourceKind::Fred);
    assert_eq!(cause.kind(), SourceErrorKind::NotFound);
    assert_eq!(fred_calls.load(Ordering::SeqCst), 2);
    assert_eq!(bls_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn fetch_failure_becomes_structured_envelope_error() {
    let pipeline = router_of(vec![RecordingSource::new(SourceKind::Bls)]);
    let request = PipelineRequest::new(
        vec![SeriesRequest::bls("MISSING").expect("valid")],
        date("2000-01-01"),
    );

    let error = pipeline.run(&request).await.expect_err("unknown series must fail");
    let envelope_error = EnvelopeError::from(&error);

    assert_eq!(envelope_error.code, "pipeline.fetch");
    assert_eq!(envelope_error.identifier.as_deref(), Some("MISSING"));
    assert_eq!(envelope_error.source, Some(SourceKind::Bls));
    assert!(envelope_error.message.contains("MISSING"));
    assert!(envelope_error.validate().is_ok());
}
