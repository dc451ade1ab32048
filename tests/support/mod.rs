//! In-memory fakes shared by the behaviour tests. Nothing here touches the
//! network or the real filesystem.

#![allow(dead_code)]

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use econplot_core::{
    FetchFuture, FetchRequest, HttpClient, HttpError, HttpRequest, HttpResponse, Observation,
    ObservationDate, RawSeries, SeriesSource, SourceError, SourceKind,
};
use serde_json::json;

/// Canned-response transport. A request is answered by the first route whose
/// fragment appears in its URL or body; every request is recorded.
#[derive(Default)]
pub struct FakeHttpClient {
    routes: Vec<(String, HttpResponse)>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl FakeHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_route(mut self, fragment: impl Into<String>, response: HttpResponse) -> Self {
        self.routes.push((fragment.into(), response));
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().map(|log| log.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.requests().len()
    }
}

impl HttpClient for FakeHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        let body = request.body.clone().unwrap_or_default();
        let answer = self
            .routes
            .iter()
            .find(|(fragment, _)| request.url.contains(fragment.as_str()) || body.contains(fragment.as_str()))
            .map(|(_, response)| response.clone())
            .ok_or_else(|| HttpError::new(format!("no canned response for {}", request.url)));

        if let Ok(mut log) = self.requests.lock() {
            log.push(request);
        }
        Box::pin(async move { answer })
    }
}

/// Source serving fixed series from memory and counting fetches.
pub struct RecordingSource {
    kind: SourceKind,
    series: HashMap<String, Vec<(ObservationDate, f64)>>,
    calls: Arc<AtomicUsize>,
}

impl RecordingSource {
    pub fn new(kind: SourceKind) -> Self {
        Self {
            kind,
            series: HashMap::new(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_series(mut self, identifier: &str, points: Vec<(ObservationDate, f64)>) -> Self {
        self.series.insert(identifier.to_owned(), points);
        self
    }

    /// Shared handle to the fetch counter, readable after the source moves
    /// into a router.
    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

impl SeriesSource for RecordingSource {
    fn kind(&self) -> SourceKind {
        self.kind
    }

    fn fetch<'a>(&'a self, req: FetchRequest) -> FetchFuture<'a> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let result = match self.series.get(&req.identifier) {
            Some(points) => Ok(RawSeries::new(
                req.identifier.clone(),
                self.kind,
                points
                    .iter()
                    .map(|(date, value)| Observation::new(*date, *value))
                    .collect(),
            )),
            None => Err(SourceError::not_found(format!(
                "series '{}' does not exist",
                req.identifier
            ))),
        };
        Box::pin(async move { result })
    }
}

pub fn date(value: &str) -> ObservationDate {
    ObservationDate::parse(value).expect("valid test date")
}

/// First-of-month dates starting at January of `year`.
pub fn monthly(year: i32, count: usize) -> Vec<ObservationDate> {
    (0..count)
        .map(|offset| {
            let months = offset as i32;
            let month = u8::try_from(months % 12 + 1).expect("month fits");
            ObservationDate::from_ymd(year + months / 12, month, 1).expect("valid date")
        })
        .collect()
}

pub fn points(dates: &[ObservationDate], values: &[f64]) -> Vec<(ObservationDate, f64)> {
    dates.iter().copied().zip(values.iter().copied()).collect()
}

/// FRED `series/observations` payload.
pub fn fred_body(observations: &[(&str, &str)]) -> String {
    let observations: Vec<_> = observations
        .iter()
        .map(|(date, value)| {
            json!({
                "realtime_start": "2024-06-01",
                "realtime_end": "2024-06-01",
                "date": date,
                "value": value,
            })
        })
        .collect();
    json!({ "units": "lin", "observations": observations }).to_string()
}

/// Successful BLS timeseries payload for one series.
pub fn bls_body(series_id: &str, data: &[(&str, &str, &str)]) -> String {
    let data: Vec<_> = data
        .iter()
        .map(|(year, period, value)| {
            json!({ "year": year, "period": period, "periodName": "", "value": value, "footnotes": [{}] })
        })
        .collect();
    json!({
        "status": "REQUEST_SUCCEEDED",
        "responseTime": 120,
        "message": [],
        "Results": { "series": [{ "seriesID": series_id, "data": data }] }
    })
    .to_string()
}

pub fn assert_close(actual: Option<f64>, expected: f64) {
    let actual = actual.expect("value should be present");
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}
