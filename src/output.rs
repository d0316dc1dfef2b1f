use serde::Serialize;
use serde_json::Value;

use crate::compliance::Report;

const SEPARATOR_WIDTH: usize = 119;

pub fn format_report(report: &Report) -> serde_json::Result<String> {
    let mut output = String::new();

    output.push_str("Below is the license info for all the packages\n");
    output.push_str(&render_tree(&report.repositories)?);
    output.push('\n');

    let separator = "*".repeat(SEPARATOR_WIDTH);
    output.push('\n');
    for _ in 0..3 {
        output.push_str(&separator);
        output.push('\n');
    }
    output.push('\n');

    output.push_str(&flagged_count_line(report.flagged.len(), "below"));
    for entry in &report.flagged {
        output.push_str(&render_tree(entry)?);
        output.push('\n');
    }
    output.push_str(&flagged_count_line(report.flagged.len(), "above"));

    Ok(output)
}

fn flagged_count_line(count: usize, direction: &str) -> String {
    format!(
        "{} packages were flagged. Please verify manually that the licenses are valid. See those packages {}.\n",
        count, direction
    )
}

/// Render any serializable value as a box-drawing tree. Maps and arrays
/// become branches (arrays keyed by index), scalars become `key: value` leaves.
pub fn render_tree<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<String> {
    let value = serde_json::to_value(value)?;
    let mut output = String::new();

    if is_branch(&value) {
        render_children(&value, "", &mut output);
    } else {
        output.push_str(&scalar_text(&value));
        output.push('\n');
    }

    Ok(output)
}

fn render_children(value: &Value, prefix: &str, output: &mut String) {
    let children: Vec<(String, &Value)> = match value {
        Value::Object(map) => map.iter().map(|(k, v)| (k.clone(), v)).collect(),
        Value::Array(items) => items.iter().enumerate().map(|(i, v)| (i.to_string(), v)).collect(),
        _ => return,
    };

    let count = children.len();
    for (index, (key, child)) in children.into_iter().enumerate() {
        let last = index + 1 == count;
        output.push_str(prefix);
        output.push_str(if last { "└─ " } else { "├─ " });
        output.push_str(&key);

        if is_branch(child) {
            output.push('\n');
            let child_prefix = format!("{}{}", prefix, if last { "   " } else { "│  " });
            render_children(child, &child_prefix, output);
        } else {
            output.push_str(": ");
            output.push_str(&scalar_text(child));
            output.push('\n');
        }
    }
}

fn is_branch(value: &Value) -> bool {
    matches!(value, Value::Object(_) | Value::Array(_))
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
