//! Plain-text result summary

use super::RenderSettings;
use crate::store::{Record, Value};
use crate::vocab;

/// Line-oriented summary of one record
///
/// Cohort header, name and identifier, then every other field in column
/// order. Absent values print as the placeholder; numeric values carry a
/// pass/fail mark against the threshold.
pub fn render_text(record: &Record, cohort_key: &str, settings: &RenderSettings) -> String {
    let schema = record.schema();
    let mut lines = vec![
        format!("{}: {}", vocab::LABEL_COHORT, cohort_key),
        format!("{}: {}", vocab::LABEL_NAME, display_or_missing(record.display_name())),
        format!("{}: {}", vocab::LABEL_IDENTIFIER, display_or_missing(record.identifier())),
    ];

    for (index, (column, value)) in record.fields().enumerate() {
        if index == schema.identifier || index == schema.display_name {
            continue;
        }
        let line = match value {
            Value::Number(n) => {
                let mark = if *n >= settings.pass_threshold {
                    vocab::PASS_MARK
                } else {
                    vocab::FAIL_MARK
                };
                format!("{}: {} {}", column, value, mark)
            }
            other => format!("{}: {}", column, display_or_missing(other)),
        };
        lines.push(line);
    }

    lines.join("\n")
}

fn display_or_missing(value: &Value) -> String {
    value.display().unwrap_or_else(|| vocab::MISSING.to_string())
}
