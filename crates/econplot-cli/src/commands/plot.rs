//! Shared fetch → render → write flow behind the chart commands.

use std::path::Path;
use std::time::Instant;

use econplot_core::{
    EnvelopeError, ObservationDate, PipelineOutput, PipelineRequest, PlotConfig, Renderer,
    SeriesPipeline, SourceKind, TransformConfig, TransformStep,
};
use serde::Serialize;

use crate::cli::ChartArgs;
use crate::error::CliError;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct ColumnSummary {
    identifier: String,
    source: SourceKind,
    label: String,
    missing: usize,
}

#[derive(Debug, Serialize)]
struct ChartSummary {
    chart: &'static str,
    output: Option<String>,
    rows: usize,
    columns: Vec<ColumnSummary>,
    first_date: Option<ObservationDate>,
    last_date: Option<ObservationDate>,
    periods_per_year: Option<u32>,
    periods_inferred: bool,
    transforms: Vec<TransformStep>,
}

impl ChartSummary {
    fn failed(chart: &'static str) -> Self {
        Self {
            chart,
            output: None,
            rows: 0,
            columns: Vec::new(),
            first_date: None,
            last_date: None,
            periods_per_year: None,
            periods_inferred: false,
            transforms: Vec::new(),
        }
    }

    fn from_output(
        chart: &'static str,
        output: &PipelineOutput,
        config: &PlotConfig,
        path: Option<&Path>,
    ) -> Self {
        let table = &output.table;
        Self {
            chart,
            output: path.map(|path| path.display().to_string()),
            rows: table.row_count(),
            columns: table
                .columns()
                .iter()
                .enumerate()
                .map(|(index, column)| ColumnSummary {
                    identifier: column.identifier.clone(),
                    source: column.source,
                    label: config.label_for(table, index),
                    missing: column.missing_count(),
                })
                .collect(),
            first_date: table.first_date(),
            last_date: table.last_date(),
            periods_per_year: output.periods_per_year,
            periods_inferred: output.periods_inferred,
            transforms: output.plan.steps.clone(),
        }
    }
}

/// Runs the pipeline for `args`, draws the table and writes the SVG.
///
/// Pipeline and render failures become envelope errors so the summary is
/// still printed; only writing the file fails the command outright.
pub async fn run(
    args: &ChartArgs,
    transform: TransformConfig,
    renderer: &dyn Renderer,
    pipeline: &SeriesPipeline,
) -> Result<CommandResult, CliError> {
    let started = Instant::now();
    let chart = renderer.name();
    let requested_chain = requested_sources(args);

    let request = match PipelineRequest::from_specs(args.specs(), args.from) {
        Ok(request) => request.with_transform(transform),
        Err(error) => {
            return failure(chart, EnvelopeError::from(&error), requested_chain, started);
        }
    };

    let output = match pipeline.run(&request).await {
        Ok(output) => output,
        Err(error) => {
            return failure(chart, EnvelopeError::from(&error), requested_chain, started);
        }
    };

    let config = args.plot_config();
    let svg = match renderer.render(&output.table, &config) {
        Ok(svg) => svg,
        Err(error) => {
            let envelope_error = EnvelopeError::new(error.code(), error.to_string())?;
            let summary = ChartSummary::from_output(chart, &output, &config, None);
            return Ok(CommandResult::ok(serde_json::to_value(summary)?, output.source_chain)
                .with_warnings(output.warnings)
                .with_error(envelope_error)
                .with_latency(elapsed_ms(started)));
        }
    };

    std::fs::write(&args.output, svg)?;
    tracing::info!(chart, path = %args.output.display(), "chart written");

    let summary = ChartSummary::from_output(chart, &output, &config, Some(args.output.as_path()));
    Ok(CommandResult::ok(serde_json::to_value(summary)?, output.source_chain)
        .with_warnings(output.warnings)
        .with_latency(elapsed_ms(started)))
}

fn failure(
    chart: &'static str,
    error: EnvelopeError,
    source_chain: Vec<SourceKind>,
    started: Instant,
) -> Result<CommandResult, CliError> {
    Ok(
        CommandResult::ok(serde_json::to_value(ChartSummary::failed(chart))?, source_chain)
            .with_error(error)
            .with_latency(elapsed_ms(started)),
    )
}

/// Distinct known source tags in request order; unknown tags are skipped.
fn requested_sources(args: &ChartArgs) -> Vec<SourceKind> {
    let mut chain = Vec::new();
    for spec in &args.series {
        if let Ok(kind) = spec.source_tag.parse::<SourceKind>() {
            if !chain.contains(&kind) {
                chain.push(kind);
            }
        }
    }
    chain
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
