use thiserror::Error;

use crate::data_source::SourceError;
use crate::{ObservationDate, SourceKind};

/// Validation and contract errors exposed by `econplot-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("series identifier cannot be empty")]
    EmptyIdentifier,
    #[error("unknown source tag '{value}', expected one of fred, bls, file")]
    UnknownSourceTag { value: String },
    #[error("invalid source '{value}' for series '{identifier}', expected one of fred, bls, file")]
    InvalidSource { identifier: String, value: String },

    #[error("date must be YYYY-MM-DD, 'YYYY-MM-DD HH:MM:SS' or RFC3339: '{value}'")]
    InvalidDate { value: String },
    #[error("invalid BLS period '{value}'")]
    InvalidPeriod { value: String },
    #[error("invalid legend position '{value}', expected upper-right, upper-left, lower-right or lower-left")]
    InvalidLegendPosition { value: String },

    #[error("request_id must be at least 8 characters")]
    InvalidRequestId,
    #[error("schema_version must match vMAJOR.MINOR.PATCH: '{value}'")]
    InvalidSchemaVersion { value: String },

    #[error("error code cannot be empty")]
    EmptyErrorCode,
    #[error("error message cannot be empty")]
    EmptyErrorMessage,
}

/// Percent change and year-over-year were requested together.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("percent change and year-over-year cannot be combined; choose one")]
pub struct ConflictError;

/// Terminal failure of one pipeline invocation.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("no series requested")]
    EmptyRequest,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("invalid source '{source_tag}' for series '{identifier}'")]
    InvalidSource {
        identifier: String,
        source_tag: String,
    },

    #[error("failed to fetch '{identifier}' from {source_kind}: {cause}")]
    Fetch {
        identifier: String,
        source_kind: SourceKind,
        #[source]
        cause: SourceError,
    },

    #[error(transparent)]
    Conflict(#[from] ConflictError),

    #[error("series share no dates on or after {start}; nothing to plot")]
    NoOverlappingData { start: ObservationDate },

    #[error("at least two aligned rows are needed to infer periods per year, found {rows}")]
    InsufficientData { rows: usize },
}

impl PipelineError {
    /// Stable machine-readable code used in the output envelope.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::EmptyRequest => "pipeline.empty_request",
            Self::Validation(_) => "pipeline.validation",
            Self::InvalidSource { .. } => "pipeline.invalid_source",
            Self::Fetch { .. } => "pipeline.fetch",
            Self::Conflict(_) => "pipeline.conflict",
            Self::NoOverlappingData { .. } => "pipeline.no_overlap",
            Self::InsufficientData { .. } => "pipeline.insufficient_data",
        }
    }

    /// Identifier of the series that caused the failure, when there is one.
    pub fn identifier(&self) -> Option<&str> {
        match self {
            Self::InvalidSource { identifier, .. } | Self::Fetch { identifier, .. } => {
                Some(identifier)
            }
            _ => None,
        }
    }

    pub const fn source_kind(&self) -> Option<SourceKind> {
        match self {
            Self::Fetch { source_kind, .. } => Some(*source_kind),
            _ => None,
        }
    }
}
