use econplot_core::{ScatterCohortRenderer, SeriesPipeline, TransformConfig};

use crate::cli::ScatterArgs;
use crate::error::CliError;

use super::{plot, CommandResult};

/// Scatter plots levels; transform flags are not offered.
pub async fn run(args: &ScatterArgs, pipeline: &SeriesPipeline) -> Result<CommandResult, CliError> {
    let count = args.chart.series.len();
    if count != 2 {
        return Err(CliError::Usage(format!(
            "scatter needs exactly two --series (x then y), got {count}"
        )));
    }

    let renderer = ScatterCohortRenderer::with_cutoff(args.cohort_cutoff);
    plot::run(&args.chart, TransformConfig::none(), &renderer, pipeline).await
}
