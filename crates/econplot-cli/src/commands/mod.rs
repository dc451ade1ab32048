mod bars;
mod line;
mod plot;
mod scatter;
mod sources;

use std::sync::Arc;

use econplot_core::{Envelope, SeriesPipeline, SeriesRouterBuilder, SourceConfig, SourceKind};
use serde_json::Value;

use crate::cli::{Cli, Command};
use crate::error::CliError;
use crate::metadata::Metadata;

pub struct CommandResult {
    pub data: Value,
    pub warnings: Vec<String>,
    pub errors: Vec<econplot_core::EnvelopeError>,
    pub latency_ms: u64,
    pub source_chain: Vec<SourceKind>,
}

impl CommandResult {
    pub fn ok(data: Value, source_chain: Vec<SourceKind>) -> Self {
        Self {
            data,
            warnings: Vec::new(),
            errors: Vec::new(),
            latency_ms: 0,
            source_chain,
        }
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings.extend(warnings);
        self
    }

    pub fn with_error(mut self, error: econplot_core::EnvelopeError) -> Self {
        self.errors.push(error);
        self
    }

    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }
}

pub async fn run(cli: &Cli) -> Result<Envelope<Value>, CliError> {
    let config = SourceConfig::from_env()
        .with_fred_api_key(cli.fred_api_key.clone())
        .with_bls_api_key(cli.bls_api_key.clone())
        .with_timeout_ms(cli.timeout_ms);
    let router = Arc::new(SeriesRouterBuilder::new().with_config(config).build());
    let pipeline = SeriesPipeline::new(router);

    let command_result = match &cli.command {
        Command::Line(args) => line::run(args, &pipeline).await?,
        Command::Bars(args) => bars::run(args, &pipeline).await?,
        Command::Scatter(args) => scatter::run(args, &pipeline).await?,
        Command::Sources => sources::run(pipeline.router())?,
    };

    let CommandResult {
        data,
        warnings,
        errors,
        latency_ms,
        source_chain,
    } = command_result;

    let mut metadata = Metadata::new(source_chain, latency_ms);
    for warning in warnings {
        metadata.push_warning(warning);
    }
    let meta = metadata.into_envelope_meta()?;

    Envelope::with_errors(meta, data, errors).map_err(CliError::from)
}

/// Process exit code for the first structured error of an envelope.
pub fn exit_code_for(code: &str) -> u8 {
    match code {
        "pipeline.fetch" => 3,
        "pipeline.no_overlap" | "pipeline.insufficient_data" | "render.no_values" => 4,
        _ => 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_error_codes_to_exit_codes() {
        assert_eq!(exit_code_for("pipeline.fetch"), 3);
        assert_eq!(exit_code_for("pipeline.no_overlap"), 4);
        assert_eq!(exit_code_for("pipeline.insufficient_data"), 4);
        assert_eq!(exit_code_for("render.no_values"), 4);
        assert_eq!(exit_code_for("pipeline.conflict"), 2);
        assert_eq!(exit_code_for("pipeline.invalid_source"), 2);
        assert_eq!(exit_code_for("render.column_count"), 2);
    }
}
