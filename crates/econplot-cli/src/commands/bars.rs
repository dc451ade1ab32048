use econplot_core::{SeriesPipeline, TransformConfig, VerticalDropRenderer};

use crate::cli::BarsArgs;
use crate::error::CliError;

use super::{plot, CommandResult};

pub async fn run(args: &BarsArgs, pipeline: &SeriesPipeline) -> Result<CommandResult, CliError> {
    if !args.bar_width.is_finite() || args.bar_width <= 0.0 {
        return Err(CliError::Usage(format!(
            "--bar-width must be a positive number, got {}",
            args.bar_width
        )));
    }

    let transform = TransformConfig::from(&args.transform);
    let renderer = VerticalDropRenderer::with_line_width(args.bar_width);
    plot::run(&args.chart, transform, &renderer, pipeline).await
}
