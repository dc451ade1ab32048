//! Series source trait and its request/error types.
//!
//! Every source (FRED, BLS, local file) implements [`SeriesSource`]: given a
//! [`FetchRequest`] it returns a [`RawSeries`] or a classified
//! [`SourceError`]. The pipeline wraps source errors together with the
//! series identifier before surfacing them.
//!
//! # Example
//!
//! ```rust,ignore
//! use econplot_core::{FetchRequest, FredAdapter, ReqwestHttpClient, SeriesSource};
//!
//! async fn unemployment(adapter: &FredAdapter) -> Result<(), econplot_core::SourceError> {
//!     let series = adapter.fetch(FetchRequest::new("UNRATE")).await?;
//!     println!("{} observations", series.len());
//!     Ok(())
//! }
//! ```

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::{ObservationDate, RawSeries, SourceKind};

/// Parameters handed to a source for one series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub identifier: String,
    /// Earliest date the caller cares about. Sources may use it to narrow the
    /// upstream query; the aligner filters again regardless.
    pub start: Option<ObservationDate>,
}

impl FetchRequest {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            start: None,
        }
    }

    pub fn with_start(mut self, start: ObservationDate) -> Self {
        self.start = Some(start);
        self
    }
}

/// Configuration state reported by the `sources` command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceStatus {
    pub kind: SourceKind,
    pub credentials_configured: bool,
    pub note: Option<String>,
}

impl SourceStatus {
    pub fn ready(kind: SourceKind) -> Self {
        Self {
            kind,
            credentials_configured: true,
            note: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn missing_credentials(kind: SourceKind, note: impl Into<String>) -> Self {
        Self {
            kind,
            credentials_configured: false,
            note: Some(note.into()),
        }
    }
}

/// Source-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    /// Required API key is not configured.
    MissingCredentials,
    /// Transport failure or non-success HTTP status.
    Unavailable,
    /// The upstream answered with an explicit error message.
    Upstream,
    /// The upstream has no data for the identifier.
    NotFound,
    /// The payload or file could not be parsed.
    Parse,
    /// Local I/O failure.
    Io,
}

/// Structured source error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
}

impl SourceError {
    pub fn missing_credentials(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::MissingCredentials, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::Unavailable, message)
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::Upstream, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::NotFound, message)
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::Parse, message)
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::Io, message)
    }

    fn new(kind: SourceErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::MissingCredentials => "source.missing_credentials",
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::Upstream => "source.upstream",
            SourceErrorKind::NotFound => "source.not_found",
            SourceErrorKind::Parse => "source.parse",
            SourceErrorKind::Io => "source.io",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

pub type FetchFuture<'a> = Pin<Box<dyn Future<Output = Result<RawSeries, SourceError>> + Send + 'a>>;

/// Source adapter contract.
///
/// Implementations must be `Send + Sync`; one router instance is shared by
/// every invocation.
pub trait SeriesSource: Send + Sync {
    /// Which source tag this adapter serves.
    fn kind(&self) -> SourceKind;

    /// Fetches one series.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when credentials are missing, the upstream is
    /// unreachable or reports an error, or the payload cannot be parsed.
    fn fetch<'a>(&'a self, req: FetchRequest) -> FetchFuture<'a>;

    /// Reports whether the adapter is ready to serve requests.
    fn status(&self) -> SourceStatus {
        SourceStatus::ready(self.kind())
    }
}
