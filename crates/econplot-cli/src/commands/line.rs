use econplot_core::{LineRenderer, SeriesPipeline, TransformConfig};

use crate::cli::LineArgs;
use crate::error::CliError;

use super::{plot, CommandResult};

pub async fn run(args: &LineArgs, pipeline: &SeriesPipeline) -> Result<CommandResult, CliError> {
    let transform = TransformConfig::from(&args.transform);
    plot::run(&args.chart, transform, &LineRenderer::default(), pipeline).await
}
