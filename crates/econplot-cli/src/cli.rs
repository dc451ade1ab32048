//! CLI argument definitions for econplot.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `line` | Line chart of one or more series |
//! | `bars` | Vertical-drop chart of one or more series |
//! | `scatter` | Two series against each other, coloured by year cohort |
//! | `sources` | List data sources and credential status |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `json` | Output format (json, table) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--timeout-ms` | `30000` | Per-request timeout in ms |
//! | `--fred-api-key` | `$FRED_API_KEY` | FRED API key |
//! | `--bls-api-key` | `$BLS_API_KEY` | BLS registration key |
//! | `-v` | warn | Raise log verbosity (repeatable) |
//!
//! # Examples
//!
//! ```bash
//! # Unemployment rate from FRED and BLS since 2010
//! econplot line --series UNRATE --series LNS14000000:bls:BLS --from 2010-01-01
//!
//! # Year-over-year CPI as bars
//! econplot bars --series CPIAUCSL --yoy --output cpi.svg
//!
//! # Beveridge curve
//! econplot scatter --series UNRATE --series JTSJOR --x-label Unemployment --y-label Vacancies
//! ```

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use econplot_core::{LegendPosition, ObservationDate, PlotConfig, TransformConfig};

/// Economic time-series plotter
///
/// Fetches series from FRED, BLS or local files, aligns them on common
/// dates, optionally transforms them and writes an SVG chart.
#[derive(Debug, Parser)]
#[command(
    name = "econplot",
    author,
    version,
    about = "Economic time-series plotter",
    long_about = "econplot fetches economic time series from FRED, the BLS public API or \
local CSV/TSV files, inner-joins them on their dates and renders an SVG chart.\n\
\n\
Use 'econplot <command> --help' for command-specific help."
)]
pub struct Cli {
    /// Output format for the command summary.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Per-request timeout in milliseconds.
    #[arg(long, global = true, default_value_t = 30_000)]
    pub timeout_ms: u64,

    /// FRED API key.
    #[arg(long, global = true, env = "FRED_API_KEY", hide_env_values = true)]
    pub fred_api_key: Option<String>,

    /// BLS registration key. Optional; raises the per-request year window.
    #[arg(long, global = true, env = "BLS_API_KEY", hide_env_values = true)]
    pub bls_api_key: Option<String>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace). RUST_LOG overrides.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary.
    Table,
    /// Single JSON envelope.
    Json,
}

/// Available CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Line chart, one line per series.
    ///
    /// # Examples
    ///
    ///   econplot line --series UNRATE
    ///   econplot line --series PAYEMS --change --percent
    Line(LineArgs),

    /// Vertical-drop ("bar") chart, one bar per observation.
    ///
    /// # Examples
    ///
    ///   econplot bars --series PAYEMS --change
    ///   econplot bars --series CPIAUCSL --yoy --bar-width 4
    Bars(BarsArgs),

    /// Scatter of two series, coloured by calendar-year cohort.
    ///
    /// # Examples
    ///
    ///   econplot scatter --series UNRATE --series JTSJOR --cohort-cutoff 2020
    Scatter(ScatterArgs),

    /// List data sources and whether their credentials are configured.
    Sources,
}

/// One `--series` value: `ID[:SOURCE[:LABEL]]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesSpec {
    pub identifier: String,
    /// Raw source tag; validated by the pipeline so an unknown tag names
    /// its series.
    pub source_tag: String,
    pub label: Option<String>,
}

pub fn parse_series_spec(value: &str) -> Result<SeriesSpec, String> {
    let mut parts = value.splitn(3, ':');
    let identifier = parts.next().unwrap_or_default().trim();
    if identifier.is_empty() {
        return Err(String::from("series identifier cannot be empty"));
    }
    let source_tag = parts
        .next()
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .unwrap_or("fred");
    let label = parts
        .next()
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .map(str::to_owned);

    Ok(SeriesSpec {
        identifier: identifier.to_owned(),
        source_tag: source_tag.to_owned(),
        label,
    })
}

fn parse_date(value: &str) -> Result<ObservationDate, String> {
    ObservationDate::parse(value).map_err(|error| error.to_string())
}

fn parse_legend(value: &str) -> Result<LegendPosition, String> {
    value.parse().map_err(|error: econplot_core::ValidationError| error.to_string())
}

/// Options shared by every chart command.
#[derive(Debug, Args)]
pub struct ChartArgs {
    /// Series to plot, as ID[:SOURCE[:LABEL]]; SOURCE is fred (default), bls or file.
    #[arg(short, long = "series", required = true, value_parser = parse_series_spec)]
    pub series: Vec<SeriesSpec>,

    /// Earliest date to keep (YYYY-MM-DD).
    #[arg(long, default_value = "2000-01-01", value_parser = parse_date)]
    pub from: ObservationDate,

    /// Chart title.
    #[arg(long, default_value = "Economic Data Plot")]
    pub title: String,

    /// X-axis label.
    #[arg(long, default_value = "Date")]
    pub x_label: String,

    /// Y-axis label.
    #[arg(long, default_value = "Series Value")]
    pub y_label: String,

    /// Footer text; defaults to the publishers of the series. Pass "" to omit.
    #[arg(long)]
    pub source_text: Option<String>,

    /// Legend corner: upper-right, upper-left, lower-right, lower-left.
    #[arg(long, default_value = "upper-right", value_parser = parse_legend)]
    pub legend: LegendPosition,

    /// SVG file to write.
    #[arg(short, long, default_value = "chart.svg")]
    pub output: PathBuf,
}

impl ChartArgs {
    pub fn plot_config(&self) -> PlotConfig {
        PlotConfig {
            title: self.title.clone(),
            x_label: self.x_label.clone(),
            y_label: self.y_label.clone(),
            legend: self.legend,
            attribution: self.source_text.clone(),
            series_labels: self
                .series
                .iter()
                .map(|spec| spec.label.clone().unwrap_or_default())
                .collect(),
            ..PlotConfig::default()
        }
    }

    pub fn specs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.series
            .iter()
            .map(|spec| (spec.identifier.as_str(), spec.source_tag.as_str()))
    }
}

/// Value transforms for `line` and `bars`.
#[derive(Debug, Args)]
pub struct TransformArgs {
    /// Plot period-over-period change instead of levels.
    #[arg(long, default_value_t = false)]
    pub change: bool,

    /// With --change, plot percent change instead of absolute difference.
    #[arg(long, default_value_t = false)]
    pub percent: bool,

    /// Plot year-over-year percent change. Cannot be combined with --percent.
    #[arg(long, default_value_t = false)]
    pub yoy: bool,

    /// Observations per year for --yoy; 0 infers it from the dates.
    #[arg(long, default_value_t = 0)]
    pub periods_per_year: u32,
}

impl From<&TransformArgs> for TransformConfig {
    fn from(args: &TransformArgs) -> Self {
        Self {
            apply_change: args.change,
            as_percent: args.percent,
            as_year_over_year: args.yoy,
            periods_per_year: Some(args.periods_per_year),
        }
    }
}

/// Arguments for the `line` command.
#[derive(Debug, Args)]
pub struct LineArgs {
    #[command(flatten)]
    pub chart: ChartArgs,

    #[command(flatten)]
    pub transform: TransformArgs,
}

/// Arguments for the `bars` command.
#[derive(Debug, Args)]
pub struct BarsArgs {
    #[command(flatten)]
    pub chart: ChartArgs,

    #[command(flatten)]
    pub transform: TransformArgs,

    /// Bar stroke width in pixels.
    #[arg(long, default_value_t = 10.0)]
    pub bar_width: f64,
}

/// Arguments for the `scatter` command.
#[derive(Debug, Args)]
pub struct ScatterArgs {
    #[command(flatten)]
    pub chart: ChartArgs,

    /// Years before this one are drawn as a single grey group.
    #[arg(long, default_value_t = 2020)]
    pub cohort_cutoff: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn series_spec_defaults_to_fred() {
        let spec = parse_series_spec("UNRATE").expect("valid");
        assert_eq!(spec.source_tag, "fred");
        assert_eq!(spec.label, None);
    }

    #[test]
    fn series_spec_keeps_label_colons() {
        let spec = parse_series_spec("LNS14000000:bls:Rate: headline").expect("valid");
        assert_eq!(spec.identifier, "LNS14000000");
        assert_eq!(spec.source_tag, "bls");
        assert_eq!(spec.label.as_deref(), Some("Rate: headline"));
    }

    #[test]
    fn series_spec_rejects_empty_identifier() {
        assert!(parse_series_spec(":bls").is_err());
    }

    #[test]
    fn parses_line_command() {
        let cli = Cli::try_parse_from([
            "econplot",
            "line",
            "--series",
            "UNRATE",
            "-s",
            "data.csv:file:Local",
            "--yoy",
            "--legend",
            "lower left",
        ])
        .expect("valid arguments");

        let Command::Line(args) = cli.command else {
            panic!("expected line command");
        };
        assert_eq!(args.chart.series.len(), 2);
        assert_eq!(args.chart.legend, LegendPosition::LowerLeft);
        assert_eq!(args.chart.from.to_string(), "2000-01-01");
        assert!(TransformConfig::from(&args.transform).as_year_over_year);
        assert_eq!(
            args.chart.plot_config().series_labels,
            vec![String::new(), String::from("Local")]
        );
    }

    #[test]
    fn rejects_bad_start_date() {
        let result = Cli::try_parse_from(["econplot", "line", "--series", "UNRATE", "--from", "01/02/2000"]);
        assert!(result.is_err());
    }
}
