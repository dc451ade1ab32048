//! Contract tests for the FRED, BLS and file sources.
//!
//! Remote adapters run against canned payloads through a fake transport.

#[path = "../support/mod.rs"]
mod support;

use std::sync::Arc;

use econplot_core::{
    period_start, BlsAdapter, FetchRequest, FileSource, FredAdapter, HttpMethod, HttpResponse,
    SeriesSource, SourceErrorKind, SourceKind,
};
use support::{bls_body, date, fred_body, FakeHttpClient};

fn fred_with(http: &Arc<FakeHttpClient>) -> FredAdapter {
    FredAdapter::new(http.clone(), Some(String::from("secret-key")))
}

// =============================================================================
// Every source
// =============================================================================

#[tokio::test]
async fn every_source_reports_its_own_kind_and_returns_ascending_series() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("series.csv");
    std::fs::write(&path, "date,value\n2024-02-01,2\n2024-01-01,1\n").expect("write file");

    let http = Arc::new(
        FakeHttpClient::new()
            .with_route(
                "series_id=X",
                HttpResponse::ok_json(fred_body(&[("2024-02-01", "2"), ("2024-01-01", "1")])),
            )
            .with_route(
                "\"X\"",
                HttpResponse::ok_json(bls_body("X", &[("2024", "M02", "2"), ("2024", "M01", "1")])),
            ),
    );
    let cases: Vec<(Arc<dyn SeriesSource>, String)> = vec![
        (Arc::new(fred_with(&http)), String::from("X")),
        (
            Arc::new(BlsAdapter::new(http.clone(), None).with_end_year(2024)),
            String::from("X"),
        ),
        (Arc::new(FileSource::new()), path.display().to_string()),
    ];

    for (source, identifier) in cases {
        let request = FetchRequest::new(identifier.clone()).with_start(date("2024-01-01"));
        let series = source
            .fetch(request)
            .await
            .unwrap_or_else(|error| panic!("{} fetch failed: {error}", source.kind()));

        assert_eq!(series.source, source.kind());
        assert_eq!(series.identifier, identifier);
        assert_eq!(series.first_date(), Some(date("2024-01-01")), "{}", source.kind());
        assert_eq!(series.last_date(), Some(date("2024-02-01")), "{}", source.kind());
    }
}

// =============================================================================
// FRED
// =============================================================================

#[tokio::test]
async fn fred_drops_missing_marker_observations() {
    let http = Arc::new(FakeHttpClient::new().with_route(
        "series_id=GDPC1",
        HttpResponse::ok_json(fred_body(&[
            ("2023-10-01", "22960.6"),
            ("2024-01-01", "."),
            ("2024-04-01", "23223.9"),
        ])),
    ));

    let series = fred_with(&http)
        .fetch(FetchRequest::new("GDPC1"))
        .await
        .expect("fetch succeeds");

    assert_eq!(series.len(), 2);
    assert_eq!(series.observations()[1].date, date("2024-04-01"));
}

#[tokio::test]
async fn fred_request_carries_key_series_and_start() {
    let http = Arc::new(FakeHttpClient::new().with_route(
        "series_id=UNRATE",
        HttpResponse::ok_json(fred_body(&[("2024-01-01", "3.7")])),
    ));

    fred_with(&http)
        .fetch(FetchRequest::new("UNRATE").with_start(date("2015-01-01")))
        .await
        .expect("fetch succeeds");

    let requests = http.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, HttpMethod::Get);
    assert!(requests[0].url.contains("api_key=secret-key"));
    assert!(requests[0].url.contains("file_type=json"));
    assert!(requests[0].url.contains("observation_start=2015-01-01"));
}

#[tokio::test]
async fn fred_error_message_payload_is_a_fetch_failure() {
    let http = Arc::new(FakeHttpClient::new().with_route(
        "series_id=UNRATE",
        HttpResponse::ok_json(r#"{"error_code": 400, "error_message": "Bad Request.  The value for variable api_key is not registered."}"#),
    ));

    let error = fred_with(&http)
        .fetch(FetchRequest::new("UNRATE"))
        .await
        .expect_err("error payload must fail");

    assert_eq!(error.kind(), SourceErrorKind::Upstream);
    assert!(error.message().contains("not registered"));
}

#[tokio::test]
async fn fred_unknown_series_is_not_found() {
    let http = Arc::new(FakeHttpClient::new().with_route(
        "series_id=NOPE",
        HttpResponse::new(
            400,
            r#"{"error_code": 400, "error_message": "Bad Request.  The series does not exist."}"#,
        ),
    ));

    let error = fred_with(&http)
        .fetch(FetchRequest::new("NOPE"))
        .await
        .expect_err("unknown series must fail");

    assert_eq!(error.kind(), SourceErrorKind::NotFound);
    assert_eq!(error.code(), "source.not_found");
}

#[tokio::test]
async fn fred_without_key_fails_before_any_request() {
    let http = Arc::new(FakeHttpClient::new());
    let adapter = FredAdapter::new(http.clone(), None);

    let error = adapter
        .fetch(FetchRequest::new("UNRATE"))
        .await
        .expect_err("missing key must fail");

    assert_eq!(error.kind(), SourceErrorKind::MissingCredentials);
    assert_eq!(http.call_count(), 0);
    assert!(!adapter.status().credentials_configured);
}

#[tokio::test]
async fn fred_transport_failure_is_unavailable() {
    let http = Arc::new(FakeHttpClient::new());

    let error = fred_with(&http)
        .fetch(FetchRequest::new("UNRATE"))
        .await
        .expect_err("no route must fail");

    assert_eq!(error.kind(), SourceErrorKind::Unavailable);
    assert!(error.message().starts_with("fred transport error"));
}

// =============================================================================
// BLS
// =============================================================================

#[test]
fn bls_periods_map_to_first_day_of_period() {
    let start = |period| period_start(2022, period).expect("valid period");

    assert_eq!(start("M07"), Some(date("2022-07-01")));
    assert_eq!(start("Q03"), Some(date("2022-07-01")));
    assert_eq!(start("S01"), Some(date("2022-01-01")));
    assert_eq!(start("A01"), Some(date("2022-01-01")));
    assert_eq!(start("M13"), None);
}

#[tokio::test]
async fn bls_drops_annual_average_rows() {
    let http = Arc::new(FakeHttpClient::new().with_route(
        "CES0000000001",
        HttpResponse::ok_json(bls_body(
            "CES0000000001",
            &[
                ("2023", "M13", "156050"),
                ("2023", "M12", "157304"),
                ("2023", "M11", "157014"),
            ],
        )),
    ));
    let adapter = BlsAdapter::new(http.clone(), None).with_end_year(2023);

    let series = adapter
        .fetch(FetchRequest::new("CES0000000001").with_start(date("2023-01-01")))
        .await
        .expect("fetch succeeds");

    assert_eq!(series.len(), 2);
    assert_eq!(series.first_date(), Some(date("2023-11-01")));
    assert_eq!(series.source, SourceKind::Bls);
}

#[tokio::test]
async fn bls_splits_long_ranges_into_anonymous_windows() {
    let http = Arc::new(FakeHttpClient::new().with_route(
        "LNS14000000",
        HttpResponse::ok_json(bls_body("LNS14000000", &[("2020", "M01", "3.5")])),
    ));
    let adapter = BlsAdapter::new(http.clone(), None).with_end_year(2024);

    adapter
        .fetch(FetchRequest::new("LNS14000000").with_start(date("2000-01-01")))
        .await
        .expect("fetch succeeds");

    let bodies: Vec<String> = http
        .requests()
        .into_iter()
        .map(|request| {
            assert_eq!(request.method, HttpMethod::Post);
            request.body.unwrap_or_default()
        })
        .collect();
    assert_eq!(bodies.len(), 3);
    assert!(bodies[0].contains("\"startyear\":\"2000\"") && bodies[0].contains("\"endyear\":\"2009\""));
    assert!(bodies[2].contains("\"startyear\":\"2020\"") && bodies[2].contains("\"endyear\":\"2024\""));
    assert!(bodies.iter().all(|body| !body.contains("registrationkey")));
}

#[tokio::test]
async fn bls_registration_key_widens_windows() {
    let http = Arc::new(FakeHttpClient::new().with_route(
        "LNS14000000",
        HttpResponse::ok_json(bls_body("LNS14000000", &[("2020", "M01", "3.5")])),
    ));
    let adapter = BlsAdapter::new(http.clone(), Some(String::from("reg-key"))).with_end_year(2024);

    adapter
        .fetch(FetchRequest::new("LNS14000000").with_start(date("2000-01-01")))
        .await
        .expect("fetch succeeds");

    let requests = http.requests();
    assert_eq!(requests.len(), 2);
    assert!(requests[0]
        .body
        .as_deref()
        .is_some_and(|body| body.contains("\"registrationkey\":\"reg-key\"")));
}

#[tokio::test]
async fn bls_failed_status_is_upstream_error() {
    let http = Arc::new(FakeHttpClient::new().with_route(
        "LNS14000000",
        HttpResponse::ok_json(
            r#"{"status": "REQUEST_NOT_PROCESSED", "message": ["daily threshold reached"], "Results": {}}"#,
        ),
    ));
    let adapter = BlsAdapter::new(http.clone(), None).with_end_year(2024);

    let error = adapter
        .fetch(FetchRequest::new("LNS14000000").with_start(date("2024-01-01")))
        .await
        .expect_err("unprocessed request must fail");

    assert_eq!(error.kind(), SourceErrorKind::Upstream);
    assert!(error.message().contains("daily threshold"));
}

#[tokio::test]
async fn bls_empty_series_is_not_found() {
    let http = Arc::new(FakeHttpClient::new().with_route(
        "BOGUS",
        HttpResponse::ok_json(
            r#"{"status": "REQUEST_SUCCEEDED", "message": ["Series does not exist for Series BOGUS"], "Results": {"series": [{"seriesID": "BOGUS", "data": []}]}}"#,
        ),
    ));
    let adapter = BlsAdapter::new(http.clone(), None).with_end_year(2024);

    let error = adapter
        .fetch(FetchRequest::new("BOGUS").with_start(date("2024-01-01")))
        .await
        .expect_err("empty series must fail");

    assert_eq!(error.kind(), SourceErrorKind::NotFound);
    assert!(error.message().contains("does not exist"));
}

// =============================================================================
// Local files
// =============================================================================

#[tokio::test]
async fn file_source_reads_tsv_and_skips_missing_values() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("claims.tsv");
    std::fs::write(
        &path,
        "observation_date\tICSA\n2024-01-06\t202000\n2024-01-13\t.\n2024-01-20\t214000\n",
    )
    .expect("write file");

    let series = FileSource::new()
        .fetch(FetchRequest::new(path.display().to_string()))
        .await
        .expect("fetch succeeds");

    assert_eq!(series.len(), 2);
    assert_eq!(series.observations()[1].value, 214000.0);
}

#[tokio::test]
async fn file_source_missing_file_is_io_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("absent.csv");

    let error = FileSource::new()
        .fetch(FetchRequest::new(path.display().to_string()))
        .await
        .expect_err("missing file must fail");

    assert_eq!(error.kind(), SourceErrorKind::Io);
    assert!(error.message().contains("absent.csv"));
}

#[tokio::test]
async fn file_source_reports_line_of_bad_date() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("bad.csv");
    std::fs::write(&path, "date,value\n2024-01-01,1\nyesterday,2\n").expect("write file");

    let error = FileSource::new()
        .fetch(FetchRequest::new(path.display().to_string()))
        .await
        .expect_err("bad date must fail");

    assert_eq!(error.kind(), SourceErrorKind::Parse);
    assert!(error.message().starts_with("line 3:"), "{}", error.message());
}
