use econplot_core::{SeriesRouter, SourceKind};
use serde::Serialize;

use crate::error::CliError;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct SourceRow {
    source: SourceKind,
    publisher: &'static str,
    registered: bool,
    status: &'static str,
    credentials_configured: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    note: Option<String>,
}

#[derive(Debug, Serialize)]
struct SourcesResponseData {
    sources: Vec<SourceRow>,
}

pub fn run(router: &SeriesRouter) -> Result<CommandResult, CliError> {
    let mut warnings = Vec::new();
    let sources = router
        .snapshots()
        .into_iter()
        .map(|snapshot| {
            let status = snapshot.status_label();
            if status == "missing_credentials" {
                warnings.push(format!("{} credentials are not configured", snapshot.kind));
            }
            SourceRow {
                source: snapshot.kind,
                publisher: snapshot.kind.publisher(),
                registered: snapshot.registered,
                status,
                credentials_configured: snapshot.status.credentials_configured,
                note: snapshot.status.note,
            }
        })
        .collect::<Vec<_>>();

    let data = serde_json::to_value(SourcesResponseData { sources })?;
    Ok(CommandResult::ok(data, Vec::new()).with_warnings(warnings))
}
