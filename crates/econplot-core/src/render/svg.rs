//! SVG canvas shared by the renderers: layout, scales, ticks, legend, footer.

use crate::ObservationDate;

use super::{LegendPosition, PlotConfig};

const MARGIN_LEFT: f64 = 90.0;
const MARGIN_RIGHT: f64 = 40.0;
const MARGIN_TOP: f64 = 70.0;
const MARGIN_BOTTOM: f64 = 100.0;

const TEXT_COLOR: &str = "#333333";
const GRID_COLOR: &str = "#cccccc";
const MAX_TICKS: usize = 8;

/// Maps a data interval onto a pixel interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    /// A degenerate domain is widened so every value maps to the middle.
    pub(crate) fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        let (low, high) = domain;
        let domain = if (high - low).abs() < f64::EPSILON {
            let pad = if low == 0.0 { 1.0 } else { low.abs() * 0.5 };
            (low - pad, high + pad)
        } else {
            domain
        };
        Self { domain, range }
    }

    pub(crate) fn map(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        r0 + (value - d0) / (d1 - d0) * (r1 - r0)
    }

    pub(crate) fn domain(&self) -> (f64, f64) {
        self.domain
    }
}

/// Extends `(low, high)` by 5% on each side, optionally forcing zero into
/// the interval first.
pub(crate) fn padded_domain(low: f64, high: f64, include_zero: bool) -> (f64, f64) {
    let (low, high) = if include_zero {
        (low.min(0.0), high.max(0.0))
    } else {
        (low, high)
    };
    let pad = (high - low) * 0.05;
    (low - pad, high + pad)
}

/// One axis tick: data position plus label.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Tick {
    pub(crate) position: f64,
    pub(crate) label: String,
}

fn nice_step(span: f64, max_ticks: usize) -> f64 {
    let raw = span / max_ticks as f64;
    let magnitude = 10f64.powf(raw.log10().floor());
    let normalized = raw / magnitude;
    let nice = if normalized <= 1.0 {
        1.0
    } else if normalized <= 2.0 {
        2.0
    } else if normalized <= 2.5 {
        2.5
    } else if normalized <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * magnitude
}

/// Round-numbered ticks inside `[low, high]`.
pub(crate) fn numeric_ticks(low: f64, high: f64) -> Vec<Tick> {
    let span = high - low;
    if !span.is_finite() || span <= 0.0 {
        return vec![Tick {
            position: low,
            label: format_value(low, 1.0),
        }];
    }

    let step = nice_step(span, MAX_TICKS);
    let first = (low / step).ceil();
    (0..)
        .map(|i| (first + f64::from(i)) * step)
        .take_while(|value| *value <= high + step * 1e-9)
        .map(|value| Tick {
            position: value,
            label: format_value(value, step),
        })
        .collect()
}

fn format_value(value: f64, step: f64) -> String {
    let decimals = (-step.log10().floor()).clamp(0.0, 6.0) as usize;
    let text = format!("{value:.decimals$}");
    if text.trim_start_matches('-').chars().all(|ch| ch == '0' || ch == '.') {
        text.trim_start_matches('-').to_owned()
    } else {
        text
    }
}

/// Year ticks for multi-year spans, month ticks for shorter ones, and the
/// two end dates when neither lands inside the window.
pub(crate) fn date_ticks(first: ObservationDate, last: ObservationDate) -> Vec<Tick> {
    let tick = |date: ObservationDate, label: String| Tick {
        position: f64::from(date.julian_day()),
        label,
    };
    let in_window = |date: &ObservationDate| *date >= first && *date <= last;

    let ticks: Vec<Tick> = if last.days_since(first) >= 730 {
        let span = last.year() - first.year();
        let step = [1, 2, 5, 10, 20, 50, 100]
            .into_iter()
            .find(|step| span / step <= MAX_TICKS as i32)
            .unwrap_or(100);
        (first.year()..=last.year())
            .filter(|year| year % step == 0)
            .filter_map(|year| ObservationDate::from_ymd(year, 1, 1).ok())
            .filter(in_window)
            .map(|date| tick(date, date.year().to_string()))
            .collect()
    } else {
        let months = |date: ObservationDate| date.year() * 12 + i32::from(date.month()) - 1;
        let span = months(last) - months(first);
        let step = [1, 2, 3, 6]
            .into_iter()
            .find(|step| span / step <= MAX_TICKS as i32)
            .unwrap_or(6);
        (months(first)..=months(last))
            .filter(|index| index % step == 0)
            .filter_map(|index| {
                let month = u8::try_from(index.rem_euclid(12) + 1).ok()?;
                ObservationDate::from_ymd(index.div_euclid(12), month, 1).ok()
            })
            .filter(in_window)
            .map(|date| tick(date, format!("{}-{:02}", date.year(), date.month())))
            .collect()
    };

    if ticks.is_empty() {
        let mut ends = vec![tick(first, first.format_iso())];
        if last != first {
            ends.push(tick(last, last.format_iso()));
        }
        ends
    } else {
        ticks
    }
}

/// How a legend entry is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LegendMarker {
    Line,
    Dot,
    Bar,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct LegendEntry {
    pub(crate) label: String,
    pub(crate) color: String,
    pub(crate) marker: LegendMarker,
}

impl LegendEntry {
    pub(crate) fn new(label: impl Into<String>, color: impl Into<String>, marker: LegendMarker) -> Self {
        Self {
            label: label.into(),
            color: color.into(),
            marker,
        }
    }
}

/// Plot area with axes already drawn; renderers add marks in data space.
pub(crate) struct Canvas<'a> {
    config: &'a PlotConfig,
    x: LinearScale,
    y: LinearScale,
    left: f64,
    top: f64,
    right: f64,
    bottom: f64,
    body: String,
}

impl<'a> Canvas<'a> {
    pub(crate) fn new(
        config: &'a PlotConfig,
        x_domain: (f64, f64),
        y_domain: (f64, f64),
        x_ticks: &[Tick],
        y_ticks: &[Tick],
    ) -> Self {
        let width = f64::from(config.width);
        let height = f64::from(config.height);
        let (left, top) = (MARGIN_LEFT, MARGIN_TOP);
        let right = (width - MARGIN_RIGHT).max(left + 1.0);
        let bottom = (height - MARGIN_BOTTOM).max(top + 1.0);

        let mut canvas = Self {
            config,
            x: LinearScale::new(x_domain, (left, right)),
            y: LinearScale::new(y_domain, (bottom, top)),
            left,
            top,
            right,
            bottom,
            body: String::new(),
        };
        canvas.draw_frame(x_ticks, y_ticks);
        canvas
    }

    pub(crate) fn x(&self, value: f64) -> f64 {
        self.x.map(value)
    }

    pub(crate) fn y(&self, value: f64) -> f64 {
        self.y.map(value)
    }

    /// Pixel y of data value 0, clamped to the plot area.
    pub(crate) fn baseline(&self) -> f64 {
        self.y(0.0).clamp(self.top, self.bottom)
    }

    fn draw_frame(&mut self, x_ticks: &[Tick], y_ticks: &[Tick]) {
        let (x_low, x_high) = self.x.domain();
        let (y_low, y_high) = self.y.domain();

        self.body.push_str(&format!(
            r##"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="#eaeaf2"/>"##,
            self.left,
            self.top,
            self.right - self.left,
            self.bottom - self.top
        ));
        self.body.push('\n');

        for tick in x_ticks.iter().filter(|tick| tick.position >= x_low && tick.position <= x_high) {
            let x = self.x(tick.position);
            self.grid_line(x, self.top, x, self.bottom);
            self.text(x, self.bottom + 20.0, 12.0, "middle", "", &tick.label);
        }
        for tick in y_ticks.iter().filter(|tick| tick.position >= y_low && tick.position <= y_high) {
            let y = self.y(tick.position);
            self.grid_line(self.left, y, self.right, y);
            self.text(self.left - 8.0, y + 4.0, 12.0, "end", "", &tick.label);
        }

        self.body.push_str(&format!(
            r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="none" stroke="{TEXT_COLOR}" stroke-width="1"/>"#,
            self.left,
            self.top,
            self.right - self.left,
            self.bottom - self.top
        ));
        self.body.push('\n');
    }

    fn grid_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
        self.body.push_str(&format!(
            r#"<line x1="{x1:.2}" y1="{y1:.2}" x2="{x2:.2}" y2="{y2:.2}" stroke="{GRID_COLOR}" stroke-width="0.6" stroke-dasharray="4 3"/>"#
        ));
        self.body.push('\n');
    }

    fn text(&mut self, x: f64, y: f64, size: f64, anchor: &str, style: &str, content: &str) {
        self.body.push_str(&format!(
            r#"<text x="{x:.2}" y="{y:.2}" font-size="{size}" text-anchor="{anchor}" fill="{TEXT_COLOR}"{style}>{}</text>"#,
            escape(content)
        ));
        self.body.push('\n');
    }

    /// Connected line through pixel-space points.
    pub(crate) fn polyline(&mut self, points: &[(f64, f64)], color: &str, width: f64) {
        let coords: Vec<String> = points
            .iter()
            .map(|(x, y)| format!("{x:.2},{y:.2}"))
            .collect();
        self.body.push_str(&format!(
            r#"<polyline points="{}" fill="none" stroke="{color}" stroke-width="{width}" stroke-linejoin="round"/>"#,
            coords.join(" ")
        ));
        self.body.push('\n');
    }

    pub(crate) fn circle(&mut self, cx: f64, cy: f64, radius: f64, color: &str, opacity: f64) {
        self.body.push_str(&format!(
            r#"<circle cx="{cx:.2}" cy="{cy:.2}" r="{radius}" fill="{color}" fill-opacity="{opacity}"/>"#
        ));
        self.body.push('\n');
    }

    pub(crate) fn segment(&mut self, from: (f64, f64), to: (f64, f64), color: &str, width: f64, opacity: f64) {
        self.body.push_str(&format!(
            r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" stroke="{color}" stroke-width="{width}" stroke-opacity="{opacity}"/>"#,
            from.0, from.1, to.0, to.1
        ));
        self.body.push('\n');
    }

    /// Draws a horizontal rule at data value 0 when it is inside the plot.
    pub(crate) fn zero_rule(&mut self) {
        let (low, high) = self.y.domain();
        if low <= 0.0 && high >= 0.0 {
            let y = self.y(0.0);
            self.body.push_str(&format!(
                r#"<line x1="{:.2}" y1="{y:.2}" x2="{:.2}" y2="{y:.2}" stroke="{TEXT_COLOR}" stroke-width="0.8"/>"#,
                self.left, self.right
            ));
            self.body.push('\n');
        }
    }

    /// Adds labels, legend and footer and returns the complete document.
    pub(crate) fn finish(mut self, legend: &[LegendEntry], footer: Option<&str>) -> String {
        let width = f64::from(self.config.width);
        let height = f64::from(self.config.height);
        let config = self.config;

        self.text(width / 2.0, 40.0, 22.0, "middle", r#" font-weight="bold""#, &config.title);
        self.text(
            (self.left + self.right) / 2.0,
            self.bottom + 50.0,
            16.0,
            "middle",
            r#" font-weight="bold""#,
            &config.x_label,
        );

        let mid_y = (self.top + self.bottom) / 2.0;
        self.body.push_str(&format!(
            r#"<text x="24" y="{mid_y:.2}" font-size="16" font-weight="bold" text-anchor="middle" fill="{TEXT_COLOR}" transform="rotate(-90 24 {mid_y:.2})">{}</text>"#,
            escape(&config.y_label)
        ));
        self.body.push('\n');

        if !legend.is_empty() {
            self.legend(legend, config.legend);
        }

        if let Some(footer) = footer {
            self.text(self.left, height - 15.0, 14.0, "start", r#" font-style="italic""#, footer);
        }

        format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\" font-family=\"DejaVu Sans, Arial, sans-serif\">\n<rect width=\"100%\" height=\"100%\" fill=\"#ffffff\"/>\n{body}</svg>\n",
            w = width,
            h = height,
            body = self.body
        )
    }

    fn legend(&mut self, entries: &[LegendEntry], position: LegendPosition) {
        let longest = entries
            .iter()
            .map(|entry| entry.label.chars().count())
            .max()
            .unwrap_or(0);
        let box_width = longest as f64 * 7.5 + 50.0;
        let box_height = entries.len() as f64 * 22.0 + 12.0;
        let inset = 10.0;

        let x = if position.is_right() {
            self.right - inset - box_width
        } else {
            self.left + inset
        };
        let y = if position.is_upper() {
            self.top + inset
        } else {
            self.bottom - inset - box_height
        };

        self.body.push_str(&format!(
            r##"<rect x="{x:.2}" y="{y:.2}" width="{box_width:.2}" height="{box_height:.2}" rx="4" fill="#ffffff" fill-opacity="0.9" stroke="{GRID_COLOR}"/>"##
        ));
        self.body.push('\n');

        for (index, entry) in entries.iter().enumerate() {
            let row = y + 17.0 + index as f64 * 22.0;
            let marker_x = x + 10.0;
            match entry.marker {
                LegendMarker::Line => {
                    self.segment((marker_x, row - 4.0), (marker_x + 24.0, row - 4.0), &entry.color, 3.0, 1.0)
                }
                LegendMarker::Dot => self.circle(marker_x + 12.0, row - 4.0, 5.0, &entry.color, 1.0),
                LegendMarker::Bar => {
                    self.body.push_str(&format!(
                        r#"<rect x="{marker_x:.2}" y="{:.2}" width="24" height="10" fill="{}" fill-opacity="0.6"/>"#,
                        row - 9.0,
                        entry.color
                    ));
                    self.body.push('\n');
                }
            }
            self.text(marker_x + 32.0, row, 12.0, "start", "", &entry.label);
        }
    }
}

/// Escapes text for use in SVG character data and attribute values.
pub(crate) fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}
