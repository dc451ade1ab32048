use econplot_core::Envelope;
use serde_json::Value;

use crate::cli::OutputFormat;
use crate::error::CliError;

pub fn render(
    envelope: &Envelope<Value>,
    format: OutputFormat,
    pretty: bool,
) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => {
            let payload = if pretty {
                serde_json::to_string_pretty(envelope)?
            } else {
                serde_json::to_string(envelope)?
            };
            println!("{payload}");
        }
        OutputFormat::Table => print!("{}", render_table(envelope)?),
    }

    Ok(())
}

fn render_table(envelope: &Envelope<Value>) -> Result<String, CliError> {
    let mut out = String::new();
    let mut line = |text: String| {
        out.push_str(&text);
        out.push('\n');
    };

    line(format!("request_id  : {}", envelope.meta.request_id));
    line(format!("schema      : {}", envelope.meta.schema_version));
    line(format!("generated_at: {}", envelope.meta.generated_at));
    line(format!(
        "sources     : {}",
        envelope
            .meta
            .source_chain
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(",")
    ));
    line(format!("latency_ms  : {}", envelope.meta.latency_ms));

    if !envelope.meta.warnings.is_empty() {
        line(String::from("warnings:"));
        for warning in &envelope.meta.warnings {
            line(format!("  - {warning}"));
        }
    }

    line(String::from("data:"));
    let pretty_data = serde_json::to_string_pretty(&envelope.data)?;
    for data_line in pretty_data.lines() {
        line(format!("  {data_line}"));
    }

    if !envelope.errors.is_empty() {
        line(String::from("errors:"));
        for error in &envelope.errors {
            match &error.identifier {
                Some(identifier) => line(format!("  - {} [{identifier}]: {}", error.code, error.message)),
                None => line(format!("  - {}: {}", error.code, error.message)),
            }
        }
    }

    Ok(out)
}
