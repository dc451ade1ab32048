//! # Econplot Core
//!
//! Fetching, alignment, transforms and chart rendering for economic time
//! series.
//!
//! ## Overview
//!
//! - **Sources** for FRED, BLS and local CSV/TSV files behind one trait
//! - **Aligner** inner-joining series on their dates from a start date
//! - **Frequency inference** from the median date spacing
//! - **Transforms**: first difference, percent change, year-over-year
//! - **Renderers** producing SVG line, scatter-cohort and vertical-drop charts
//! - **Response envelope** with metadata and structured errors
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | FRED, BLS and file sources |
//! | [`align`] | Inner join on dates |
//! | [`config`] | API keys and transport settings |
//! | [`data_source`] | Source trait and request/error types |
//! | [`domain`] | Dates, series requests, raw series, aligned tables |
//! | [`envelope`] | Response envelope with metadata |
//! | [`error`] | Validation, conflict and pipeline errors |
//! | [`frequency`] | Periods-per-year inference |
//! | [`http_client`] | HTTP client abstraction |
//! | [`pipeline`] | Fetch → align → infer → transform |
//! | [`render`] | SVG renderers |
//! | [`routing`] | Source registry |
//! | [`source`] | Source tags |
//! | [`transform`] | Difference, percent change, year-over-year |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use econplot_core::{
//!     LineRenderer, ObservationDate, PipelineRequest, PlotConfig, Renderer, SeriesPipeline,
//!     SeriesRequest, SeriesRouterBuilder, SourceConfig,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let router = SeriesRouterBuilder::new()
//!         .with_config(SourceConfig::from_env())
//!         .build();
//!     let pipeline = SeriesPipeline::new(Arc::new(router));
//!
//!     let request = PipelineRequest::new(
//!         vec![SeriesRequest::fred("UNRATE")?, SeriesRequest::bls("LNS14000000")?],
//!         ObservationDate::parse("2010-01-01")?,
//!     );
//!     let output = pipeline.run(&request).await?;
//!
//!     let svg = LineRenderer::default().render(&output.table, &PlotConfig::default())?;
//!     std::fs::write("chart.svg", svg)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  CLI / User     │
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ Series Pipeline │────▶│ Series Router    │
//! └────────┬────────┘     └────────┬─────────┘
//!          │                       ▼
//!          │              ┌──────────────────┐     ┌─────────────┐
//!          │              │ Series Source    │────▶│ HTTP Client │
//!          │              │ (FRED/BLS/File)  │     │ (reqwest)   │
//!          │              └──────────────────┘     └─────────────┘
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ Align/Transform │────▶│ Renderer (SVG)   │
//! └─────────────────┘     └──────────────────┘
//! ```
//!
//! ## Error Handling
//!
//! Pipeline failures carry a stable code and, for fetch failures, the
//! offending series:
//!
//! ```rust
//! use econplot_core::PipelineError;
//!
//! fn describe(error: &PipelineError) -> String {
//!     match error.identifier() {
//!         Some(series) => format!("{} ({series})", error.code()),
//!         None => error.code().to_owned(),
//!     }
//! }
//! ```
//!
//! ## Security
//!
//! - API keys come from the environment or flags and are redacted from
//!   `Debug` output and transport errors

pub mod adapters;
pub mod align;
pub mod config;
pub mod data_source;
pub mod domain;
pub mod envelope;
pub mod error;
pub mod frequency;
pub mod http_client;
pub mod pipeline;
pub mod render;
pub mod routing;
pub mod source;
pub mod transform;

// Source implementations
pub use adapters::{period_start, BlsAdapter, FileSource, FredAdapter};

// Alignment and frequency
pub use align::inner_join;
pub use frequency::{infer_periods_per_year, median_spacing_days};

// Configuration
pub use config::{SourceConfig, BLS_API_KEY_ENV, FRED_API_KEY_ENV};

// Source trait and types
pub use data_source::{
    FetchFuture, FetchRequest, SeriesSource, SourceError, SourceErrorKind, SourceStatus,
};

// Domain models
pub use domain::{AlignedTable, Observation, ObservationDate, RawSeries, SeriesRequest, ValueColumn};

// Envelope types
pub use envelope::{Envelope, EnvelopeError, EnvelopeMeta};

// Error types
pub use error::{ConflictError, PipelineError, ValidationError};

// HTTP client types
pub use http_client::{HttpClient, HttpError, HttpMethod, HttpRequest, HttpResponse, ReqwestHttpClient};

// Pipeline
pub use pipeline::{PipelineOutput, PipelineRequest, SeriesPipeline};

// Rendering
pub use render::{
    cohorts, default_attribution, Cohort, LegendPosition, LineRenderer, PlotConfig, RenderError,
    Renderer, ScatterCohortRenderer, VerticalDropRenderer, PALETTE,
};

// Routing
pub use routing::{SeriesRouter, SeriesRouterBuilder, SourceSnapshot};

// Source tags
pub use source::SourceKind;

// Transforms
pub use transform::{TransformConfig, TransformPlan, TransformStep};
