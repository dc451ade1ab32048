use crate::AlignedTable;

use super::svg::{date_ticks, numeric_ticks, padded_domain, Canvas, LegendEntry, LegendMarker};
use super::{palette_color, PlotConfig, RenderError, Renderer};

/// One line per column over the date axis.
///
/// Missing cells split a line into separate runs; a run of a single point is
/// drawn as a dot so it stays visible.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineRenderer {
    pub line_width: f64,
}

impl Default for LineRenderer {
    fn default() -> Self {
        Self { line_width: 2.0 }
    }
}

impl Renderer for LineRenderer {
    fn name(&self) -> &'static str {
        "line"
    }

    fn render(&self, table: &AlignedTable, config: &PlotConfig) -> Result<String, RenderError> {
        let (low, high) = table.value_range().ok_or(RenderError::NoValues)?;
        let (first, last) = table
            .first_date()
            .zip(table.last_date())
            .ok_or(RenderError::NoValues)?;

        let x_domain = (f64::from(first.julian_day()), f64::from(last.julian_day()));
        let y_domain = padded_domain(low, high, false);
        let mut canvas = Canvas::new(
            config,
            x_domain,
            y_domain,
            &date_ticks(first, last),
            &numeric_ticks(y_domain.0, y_domain.1),
        );

        let mut legend = Vec::with_capacity(table.column_count());
        for (index, column) in table.columns().iter().enumerate() {
            let color = palette_color(index);
            let mut run: Vec<(f64, f64)> = Vec::new();

            for (date, value) in table.dates().iter().zip(&column.values) {
                match value {
                    Some(value) => run.push((
                        canvas.x(f64::from(date.julian_day())),
                        canvas.y(*value),
                    )),
                    None => flush_run(&mut canvas, &mut run, color, self.line_width),
                }
            }
            flush_run(&mut canvas, &mut run, color, self.line_width);

            legend.push(LegendEntry::new(
                config.label_for(table, index),
                color,
                LegendMarker::Line,
            ));
        }

        let footer = config.footer_text(&table.sources());
        Ok(canvas.finish(&legend, footer.as_deref()))
    }
}

fn flush_run(canvas: &mut Canvas<'_>, run: &mut Vec<(f64, f64)>, color: &str, width: f64) {
    match run.as_slice() {
        [] => {}
        [(x, y)] => canvas.circle(*x, *y, width.max(2.0), color, 1.0),
        points => canvas.polyline(points, color, width),
    }
    run.clear();
}
