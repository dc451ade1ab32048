use std::collections::HashMap;
use std::sync::Arc;

use crate::adapters::{BlsAdapter, FileSource, FredAdapter};
use crate::config::SourceConfig;
use crate::data_source::{SeriesSource, SourceStatus};
use crate::http_client::{HttpClient, ReqwestHttpClient};
use crate::{PipelineError, SeriesRequest, SourceKind};

/// Registry mapping each source tag to its adapter.
///
/// Built once per process and shared read-only by every pipeline run.
pub struct SeriesRouter {
    sources: HashMap<SourceKind, Arc<dyn SeriesSource>>,
}

impl SeriesRouter {
    /// Registers the given adapters; a later adapter for the same kind
    /// replaces an earlier one.
    pub fn new(sources: Vec<Arc<dyn SeriesSource>>) -> Self {
        let sources = sources
            .into_iter()
            .map(|source| (source.kind(), source))
            .collect();
        Self { sources }
    }

    pub fn source(&self, kind: SourceKind) -> Option<&Arc<dyn SeriesSource>> {
        self.sources.get(&kind)
    }

    pub fn is_registered(&self, kind: SourceKind) -> bool {
        self.sources.contains_key(&kind)
    }

    /// Fails on the first request whose source has no adapter.
    ///
    /// Called before any fetch so an unusable request never costs a network
    /// round trip for the others.
    pub fn ensure_registered(&self, requests: &[SeriesRequest]) -> Result<(), PipelineError> {
        match requests
            .iter()
            .find(|request| !self.is_registered(request.source()))
        {
            Some(request) => Err(PipelineError::InvalidSource {
                identifier: request.identifier().to_owned(),
                source_tag: request.source().to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Status of every known source kind, in a stable order. Unregistered
    /// kinds are reported as such.
    pub fn snapshots(&self) -> Vec<SourceSnapshot> {
        SourceKind::ALL
            .into_iter()
            .map(|kind| match self.sources.get(&kind) {
                Some(source) => SourceSnapshot {
                    kind,
                    registered: true,
                    status: source.status(),
                },
                None => SourceSnapshot {
                    kind,
                    registered: false,
                    status: SourceStatus::missing_credentials(kind, "no adapter registered"),
                },
            })
            .collect()
    }
}

impl std::fmt::Debug for SeriesRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut kinds: Vec<_> = self.sources.keys().copied().collect();
        kinds.sort();
        f.debug_struct("SeriesRouter").field("sources", &kinds).finish()
    }
}

/// Source snapshot used by the `sources` CLI command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSnapshot {
    pub kind: SourceKind,
    pub registered: bool,
    pub status: SourceStatus,
}

impl SourceSnapshot {
    pub fn status_label(&self) -> &'static str {
        if !self.registered {
            "unregistered"
        } else if self.status.credentials_configured {
            "ready"
        } else {
            "missing_credentials"
        }
    }
}

/// Builder wiring the FRED, BLS and file sources to one HTTP client.
///
/// # Example
///
/// ```rust,ignore
/// use econplot_core::{SeriesRouterBuilder, SourceConfig};
///
/// let router = SeriesRouterBuilder::new()
///     .with_config(SourceConfig::from_env())
///     .build();
/// ```
#[derive(Default)]
pub struct SeriesRouterBuilder {
    config: SourceConfig,
    http_client: Option<Arc<dyn HttpClient>>,
    extra: Vec<Arc<dyn SeriesSource>>,
}

impl SeriesRouterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: SourceConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces the reqwest transport, typically with a canned-response fake.
    pub fn with_http_client(mut self, http_client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(http_client);
        self
    }

    /// Registers an additional adapter, replacing the built-in one of the
    /// same kind.
    pub fn with_source(mut self, source: Arc<dyn SeriesSource>) -> Self {
        self.extra.push(source);
        self
    }

    pub fn build(self) -> SeriesRouter {
        let http_client = self
            .http_client
            .unwrap_or_else(|| Arc::new(ReqwestHttpClient::new()));

        let mut sources: Vec<Arc<dyn SeriesSource>> = vec![
            Arc::new(FredAdapter::from_config(Arc::clone(&http_client), &self.config)),
            Arc::new(BlsAdapter::from_config(http_client, &self.config)),
            Arc::new(FileSource::new()),
        ];
        sources.extend(self.extra);

        tracing::debug!(config = ?self.config, "series router built");
        SeriesRouter::new(sources)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unregistered_source_is_rejected_with_identifier() {
        let router = SeriesRouter::new(vec![Arc::new(FileSource::new())]);
        let requests = vec![
            SeriesRequest::file("data.csv").expect("valid"),
            SeriesRequest::fred("UNRATE").expect("valid"),
        ];

        let err = router.ensure_registered(&requests).expect_err("must fail");
        assert!(matches!(
            err,
            PipelineError::InvalidSource { ref identifier, ref source_tag }
                if identifier == "UNRATE" && source_tag == "fred"
        ));
    }

    #[test]
    fn snapshots_cover_every_kind() {
        let router = SeriesRouter::new(vec![Arc::new(FileSource::new())]);
        let snapshots = router.snapshots();

        assert_eq!(snapshots.len(), 3);
        assert_eq!(snapshots[0].status_label(), "unregistered");
        assert_eq!(snapshots[2].kind, SourceKind::File);
        assert_eq!(snapshots[2].status_label(), "ready");
    }

    #[test]
    fn builder_registers_all_sources() {
        let router = SeriesRouterBuilder::new().build();
        assert!(SourceKind::ALL.iter().all(|kind| router.is_registered(*kind)));
    }
}
