use ku_cli::domain::{DomainResult, KeyOutput};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;

/// Values longer than this are wrapped in human output
const WRAP_THRESHOLD: usize = 80;
/// Characters kept on the first line of a wrapped value
const WRAP_AT: usize = 66;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Text,
}

impl OutputFormat {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            Self::Json
        } else {
            Self::Text
        }
    }
}

pub fn render(output: &KeyOutput, format: OutputFormat) -> DomainResult<String> {
    match format {
        OutputFormat::Json => render_json(output),
        OutputFormat::Text => Ok(render_human(output)),
    }
}

/// Sorted JSON object of the valued fields, indented by three spaces
pub fn render_json(output: &KeyOutput) -> DomainResult<String> {
    let mut buffer = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(b"   "));
    output.display_map().serialize(&mut serializer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Aligned `label: value` table
///
/// A lone valued field is printed bare so the output can be piped.
pub fn render_human(output: &KeyOutput) -> String {
    if output.is_empty() {
        return "no output: use -j option to see keys".to_string();
    }

    let values = output.display_map();
    if values.len() == 1 {
        if let Some(value) = values.into_values().next() {
            return value;
        }
    }

    let width = output
        .fields()
        .iter()
        .map(|f| f.label.chars().count())
        .max()
        .unwrap_or(0);

    let mut lines = vec![String::new()];
    for field in output.fields() {
        match &field.value {
            None => lines.push(field.label.clone()),
            Some(value) => {
                let padding = " ".repeat(1 + width - field.label.chars().count());
                lines.push(format!("{}{}: {}", field.label, padding, wrap(value, width)));
            }
        }
    }
    lines.join("\n")
}

fn wrap(value: &str, width: usize) -> String {
    if value.chars().count() <= WRAP_THRESHOLD {
        return value.to_string();
    }
    let split = value
        .char_indices()
        .nth(WRAP_AT)
        .map(|(i, _)| i)
        .unwrap_or(value.len());
    format!(
        "{}\\\n{}{}",
        &value[..split],
        " ".repeat(width + 5),
        &value[split..]
    )
}
