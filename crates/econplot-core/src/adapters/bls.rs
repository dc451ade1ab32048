use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::SourceConfig;
use crate::data_source::{FetchFuture, FetchRequest, SeriesSource, SourceError, SourceStatus};
use crate::http_client::{HttpClient, HttpRequest};
use crate::{Observation, ObservationDate, RawSeries, SourceKind, ValidationError};

const BLS_TIMESERIES_URL: &str = "https://api.bls.gov/publicAPI/v2/timeseries/data/";
const BLS_SUCCESS_STATUS: &str = "REQUEST_SUCCEEDED";

/// Years per request the API accepts with and without a registration key.
const REGISTERED_YEARS_PER_REQUEST: i32 = 20;
const ANONYMOUS_YEARS_PER_REQUEST: i32 = 10;

/// U.S. Bureau of Labor Statistics public data API adapter.
///
/// BLS indexes observations by period codes (`M01`, `Q02`, `A01`, ...);
/// each is converted to the first calendar day of its period.
#[derive(Clone)]
pub struct BlsAdapter {
    http_client: Arc<dyn HttpClient>,
    api_key: Option<String>,
    base_url: String,
    timeout_ms: u64,
    end_year: Option<i32>,
}

impl BlsAdapter {
    pub fn new(http_client: Arc<dyn HttpClient>, api_key: Option<String>) -> Self {
        Self {
            http_client,
            api_key,
            base_url: String::from(BLS_TIMESERIES_URL),
            timeout_ms: SourceConfig::default().timeout_ms,
            end_year: None,
        }
    }

    pub fn from_config(http_client: Arc<dyn HttpClient>, config: &SourceConfig) -> Self {
        Self::new(http_client, config.bls_api_key.clone()).with_timeout_ms(config.timeout_ms)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Pins the last requested year instead of the current calendar year.
    pub fn with_end_year(mut self, end_year: i32) -> Self {
        self.end_year = Some(end_year);
        self
    }

    fn years_per_request(&self) -> i32 {
        if self.api_key.is_some() {
            REGISTERED_YEARS_PER_REQUEST
        } else {
            ANONYMOUS_YEARS_PER_REQUEST
        }
    }

    /// Inclusive `(start_year, end_year)` windows covering the request.
    fn year_windows(&self, req: &FetchRequest) -> Vec<(i32, i32)> {
        let end_year = self
            .end_year
            .unwrap_or_else(|| ObservationDate::today().year());
        let step = self.years_per_request();
        let start_year = req
            .start
            .map(ObservationDate::year)
            .unwrap_or(end_year - REGISTERED_YEARS_PER_REQUEST + 1)
            .min(end_year);

        let mut windows = Vec::new();
        let mut from = start_year;
        while from <= end_year {
            let to = (from + step - 1).min(end_year);
            windows.push((from, to));
            from = to + 1;
        }
        windows
    }

    #[tracing::instrument(name = "bls.fetch", skip_all, fields(series = %req.identifier))]
    async fn fetch_series(&self, req: FetchRequest) -> Result<RawSeries, SourceError> {
        let mut observations = Vec::new();
        let mut messages = Vec::new();

        for (start_year, end_year) in self.year_windows(&req) {
            let body = serde_json::to_string(&BlsRequestBody {
                seriesid: vec![req.identifier.as_str()],
                startyear: start_year.to_string(),
                endyear: end_year.to_string(),
                registrationkey: self.api_key.as_deref(),
            })
            .map_err(|e| SourceError::parse(format!("failed to encode bls request: {e}")))?;

            let request = HttpRequest::post(&self.base_url)
                .with_json_body(body)
                .with_timeout_ms(self.timeout_ms);

            tracing::debug!(start_year, end_year, "requesting bls window");
            let response = self.http_client.execute(request).await.map_err(|e| {
                SourceError::unavailable(format!("bls transport error: {}", e.message()))
            })?;

            if !response.is_success() {
                return Err(SourceError::unavailable(format!(
                    "bls returned status {}",
                    response.status
                )));
            }

            let window = parse_window(&req.identifier, &response.body)?;
            observations.extend(window.observations);
            messages.extend(window.messages);
        }

        if observations.is_empty() {
            let detail = if messages.is_empty() {
                String::from("no observations returned")
            } else {
                messages.join("; ")
            };
            return Err(SourceError::not_found(format!(
                "bls series '{}': {detail}",
                req.identifier
            )));
        }

        if !messages.is_empty() {
            tracing::debug!(messages = %messages.join("; "), "bls returned advisory messages");
        }

        let series = RawSeries::new(req.identifier, SourceKind::Bls, observations);
        tracing::debug!(observations = series.len(), "bls series fetched");
        Ok(series)
    }
}

impl SeriesSource for BlsAdapter {
    fn kind(&self) -> SourceKind {
        SourceKind::Bls
    }

    fn fetch<'a>(&'a self, req: FetchRequest) -> FetchFuture<'a> {
        Box::pin(self.fetch_series(req))
    }

    fn status(&self) -> SourceStatus {
        let status = SourceStatus::ready(SourceKind::Bls);
        if self.api_key.is_some() {
            status
        } else {
            status.with_note("no registration key; requests are limited to 10 years each")
        }
    }
}

#[derive(Debug, Serialize)]
struct BlsRequestBody<'a> {
    seriesid: Vec<&'a str>,
    startyear: String,
    endyear: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    registrationkey: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct BlsResponse {
    status: String,
    #[serde(default)]
    message: Vec<String>,
    #[serde(rename = "Results", default)]
    results: Option<BlsResults>,
}

#[derive(Debug, Deserialize)]
struct BlsResults {
    #[serde(default)]
    series: Vec<BlsSeries>,
}

#[derive(Debug, Deserialize)]
struct BlsSeries {
    #[serde(rename = "seriesID", default)]
    series_id: String,
    #[serde(default)]
    data: Vec<BlsDataPoint>,
}

#[derive(Debug, Deserialize)]
struct BlsDataPoint {
    year: String,
    period: String,
    value: String,
}

#[derive(Debug)]
struct ParsedWindow {
    observations: Vec<Observation>,
    messages: Vec<String>,
}

fn parse_window(identifier: &str, body: &str) -> Result<ParsedWindow, SourceError> {
    let payload: BlsResponse = serde_json::from_str(body)
        .map_err(|e| SourceError::parse(format!("failed to parse bls response: {e}")))?;

    if payload.status != BLS_SUCCESS_STATUS {
        let detail = if payload.message.is_empty() {
            payload.status.clone()
        } else {
            payload.message.join("; ")
        };
        return Err(SourceError::upstream(format!("bls request failed: {detail}")));
    }

    let mut observations = Vec::new();
    let series = payload
        .results
        .map(|results| results.series)
        .unwrap_or_default();

    for entry in series {
        if !entry.series_id.is_empty() && !entry.series_id.eq_ignore_ascii_case(identifier) {
            continue;
        }

        for point in entry.data {
            let year = point.year.trim().parse::<i32>().map_err(|_| {
                SourceError::parse(format!("bls year '{}' is not numeric", point.year))
            })?;
            let Some(date) = period_start(year, &point.period)
                .map_err(|e| SourceError::parse(e.to_string()))?
            else {
                continue;
            };

            let value = point.value.trim();
            match value.parse::<f64>() {
                Ok(value) => observations.push(Observation::new(date, value)),
                Err(_) => {
                    tracing::debug!(%date, value, "skipping unavailable bls value");
                }
            }
        }
    }

    Ok(ParsedWindow {
        observations,
        messages: payload.message,
    })
}

/// First calendar day of a BLS period, or `None` for aggregate periods
/// (`M13` annual average, `S03` semiannual average) that are not part of the
/// regular series.
pub fn period_start(year: i32, period: &str) -> Result<Option<ObservationDate>, ValidationError> {
    let invalid = || ValidationError::InvalidPeriod {
        value: period.to_owned(),
    };

    let code = period.trim();
    if code.len() != 3 || !code.is_ascii() {
        return Err(invalid());
    }
    let (kind, number) = code.split_at(1);
    let number = number.parse::<u8>().map_err(|_| invalid())?;

    let month = match (kind, number) {
        ("M", 1..=12) => number,
        ("M", 13) | ("S", 3) => return Ok(None),
        ("Q", 1..=4) => (number - 1) * 3 + 1,
        ("S", 1) => 1,
        ("S", 2) => 7,
        ("A", 1) => 1,
        _ => return Err(invalid()),
    };

    ObservationDate::from_ymd(year, month, 1).map(Some)
}
