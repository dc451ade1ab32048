use crate::AlignedTable;

use super::svg::{date_ticks, numeric_ticks, padded_domain, Canvas, LegendEntry, LegendMarker};
use super::{palette_color, PlotConfig, RenderError, Renderer};

const BAR_OPACITY: f64 = 0.6;

/// Vertical segment from zero to every value, one colour per column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VerticalDropRenderer {
    /// Stroke width of each bar, in pixels.
    pub line_width: f64,
}

impl Default for VerticalDropRenderer {
    fn default() -> Self {
        Self { line_width: 10.0 }
    }
}

impl VerticalDropRenderer {
    pub fn with_line_width(line_width: f64) -> Self {
        Self { line_width }
    }
}

impl Renderer for VerticalDropRenderer {
    fn name(&self) -> &'static str {
        "bars"
    }

    fn render(&self, table: &AlignedTable, config: &PlotConfig) -> Result<String, RenderError> {
        let (low, high) = table.value_range().ok_or(RenderError::NoValues)?;
        let (first, last) = table
            .first_date()
            .zip(table.last_date())
            .ok_or(RenderError::NoValues)?;

        let x_domain = (f64::from(first.julian_day()), f64::from(last.julian_day()));
        let y_domain = padded_domain(low, high, true);
        let mut canvas = Canvas::new(
            config,
            x_domain,
            y_domain,
            &date_ticks(first, last),
            &numeric_ticks(y_domain.0, y_domain.1),
        );

        let baseline = canvas.baseline();
        let mut legend = Vec::with_capacity(table.column_count());
        for (index, column) in table.columns().iter().enumerate() {
            let color = palette_color(index);
            for (date, value) in table.dates().iter().zip(&column.values) {
                let Some(value) = value else { continue };
                let x = canvas.x(f64::from(date.julian_day()));
                let y = canvas.y(*value);
                canvas.segment((x, baseline), (x, y), color, self.line_width, BAR_OPACITY);
            }
            legend.push(LegendEntry::new(
                config.label_for(table, index),
                color,
                LegendMarker::Bar,
            ));
        }
        canvas.zero_rule();

        let footer = config.footer_text(&table.sources());
        Ok(canvas.finish(&legend, footer.as_deref()))
    }
}
