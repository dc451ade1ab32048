use std::sync::Arc;

use serde::Deserialize;

use crate::config::{SourceConfig, FRED_API_KEY_ENV};
use crate::data_source::{FetchFuture, FetchRequest, SeriesSource, SourceError, SourceStatus};
use crate::http_client::{HttpClient, HttpRequest};
use crate::{Observation, ObservationDate, RawSeries, SourceKind};

const FRED_OBSERVATIONS_URL: &str = "https://api.stlouisfed.org/fred/series/observations";

/// Marker FRED uses for an observation with no value.
const FRED_MISSING_VALUE: &str = ".";

/// Federal Reserve Economic Data adapter (`series/observations` endpoint).
#[derive(Clone)]
pub struct FredAdapter {
    http_client: Arc<dyn HttpClient>,
    api_key: Option<String>,
    base_url: String,
    timeout_ms: u64,
}

impl FredAdapter {
    pub fn new(http_client: Arc<dyn HttpClient>, api_key: Option<String>) -> Self {
        Self {
            http_client,
            api_key,
            base_url: String::from(FRED_OBSERVATIONS_URL),
            timeout_ms: SourceConfig::default().timeout_ms,
        }
    }

    pub fn from_config(http_client: Arc<dyn HttpClient>, config: &SourceConfig) -> Self {
        Self::new(http_client, config.fred_api_key.clone()).with_timeout_ms(config.timeout_ms)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    fn observations_url(&self, req: &FetchRequest, api_key: &str) -> String {
        let mut url = format!(
            "{}?series_id={}&api_key={}&file_type=json",
            self.base_url,
            urlencoding::encode(&req.identifier),
            urlencoding::encode(api_key),
        );
        if let Some(start) = req.start {
            url.push_str("&observation_start=");
            url.push_str(&start.format_iso());
        }
        url
    }

    #[tracing::instrument(name = "fred.fetch", skip_all, fields(series = %req.identifier))]
    async fn fetch_observations(&self, req: FetchRequest) -> Result<RawSeries, SourceError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(SourceError::missing_credentials(format!(
                "FRED requires an API key; set {FRED_API_KEY_ENV}"
            )));
        };

        let request =
            HttpRequest::get(self.observations_url(&req, api_key)).with_timeout_ms(self.timeout_ms);

        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|e| SourceError::unavailable(format!("fred transport error: {}", e.message())))?;

        if !response.is_success() {
            return Err(classify_failure(&req.identifier, response.status, &response.body));
        }

        let series = parse_observations(&req.identifier, &response.body)?;
        tracing::debug!(observations = series.len(), "fred series fetched");
        Ok(series)
    }
}

impl SeriesSource for FredAdapter {
    fn kind(&self) -> SourceKind {
        SourceKind::Fred
    }

    fn fetch<'a>(&'a self, req: FetchRequest) -> FetchFuture<'a> {
        Box::pin(self.fetch_observations(req))
    }

    fn status(&self) -> SourceStatus {
        if self.api_key.is_some() {
            SourceStatus::ready(SourceKind::Fred)
        } else {
            SourceStatus::missing_credentials(
                SourceKind::Fred,
                format!("set {FRED_API_KEY_ENV} or pass --fred-api-key"),
            )
        }
    }
}

#[derive(Debug, Deserialize)]
struct FredObservationsResponse {
    #[serde(default)]
    observations: Vec<FredObservation>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FredObservation {
    date: String,
    value: String,
}

#[derive(Debug, Deserialize)]
struct FredErrorResponse {
    #[serde(default)]
    error_message: Option<String>,
}

fn classify_failure(identifier: &str, status: u16, body: &str) -> SourceError {
    let upstream_message = serde_json::from_str::<FredErrorResponse>(body)
        .ok()
        .and_then(|payload| payload.error_message);

    match upstream_message {
        Some(message) if message.contains("does not exist") => {
            SourceError::not_found(format!("fred series '{identifier}': {message}"))
        }
        Some(message) => SourceError::upstream(format!("fred returned status {status}: {message}")),
        None => SourceError::unavailable(format!("fred returned status {status}")),
    }
}

fn parse_observations(identifier: &str, body: &str) -> Result<RawSeries, SourceError> {
    let payload: FredObservationsResponse = serde_json::from_str(body)
        .map_err(|e| SourceError::parse(format!("failed to parse fred response: {e}")))?;

    if let Some(message) = payload.error_message {
        return Err(SourceError::upstream(format!("fred error: {message}")));
    }

    let mut observations = Vec::with_capacity(payload.observations.len());
    let mut missing = 0usize;
    for raw in payload.observations {
        let value = raw.value.trim();
        if value == FRED_MISSING_VALUE || value.is_empty() {
            missing += 1;
            continue;
        }

        let date = ObservationDate::parse(&raw.date)
            .map_err(|e| SourceError::parse(format!("fred observation date: {e}")))?;
        let value = value.parse::<f64>().map_err(|_| {
            SourceError::parse(format!("fred observation value '{value}' on {date} is not numeric"))
        })?;
        observations.push(Observation::new(date, value));
    }

    if missing > 0 {
        tracing::warn!(series = %identifier, missing, "fred reported missing observations; skipping them");
    }

    Ok(RawSeries::new(identifier, SourceKind::Fred, observations))
}
