use serde_json::Value;

/// Renders an argument value into the string values of a request location.
///
/// Arrays expand into one entry per element and `null` into none, so an
/// optional argument that is absent places nothing.
pub fn render_values(value: &Value) -> Vec<String> {
    match value {
        Value::Null => Vec::new(),
        Value::Array(items) => items.iter().flat_map(render_values).collect(),
        other => vec![render_scalar(other)],
    }
}

/// Renders one value; strings are taken as-is, objects as JSON text.
pub fn render_scalar(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
