//! Schema validation helpers for lost & found JSON5 configuration.

use crate::{ConfigError, FieldKey};
use serde_json::{Map, Value};

/// Validate a single config layer against the schema.
///
/// Layers may be partial; required flow keys are checked after merging.
pub(super) fn validate_layer_schema(value: &Value, layer: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, "")?;
    ensure_allowed_keys(map, &["$schema", "store", "chat", "flows"], layer, "")?;

    if let Some(value) = map.get("$schema") {
        expect_string(value, layer, "$schema")?;
    }
    if let Some(value) = map.get("store") {
        validate_store(value, layer, "store")?;
    }
    if let Some(value) = map.get("chat") {
        validate_chat(value, layer, "chat")?;
    }
    if let Some(value) = map.get("flows") {
        let flows = expect_object(value, layer, "flows")?;
        ensure_allowed_keys(flows, &["lost", "found"], layer, "flows")?;
        for key in ["lost", "found"] {
            if let Some(flow) = flows.get(key) {
                validate_flow(flow, layer, &join_path("flows", key))?;
            }
        }
    }
    Ok(())
}

/// Validate the "store" block.
fn validate_store(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    ensure_allowed_keys(map, &["path"], layer, path)?;
    if let Some(value) = map.get("path")
        && !value.is_null()
    {
        expect_string(value, layer, &join_path(path, "path"))?;
    }
    Ok(())
}

/// Validate the "chat" block.
fn validate_chat(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    ensure_allowed_keys(map, &["reply_delay_ms", "summary_delay_ms"], layer, path)?;
    for key in ["reply_delay_ms", "summary_delay_ms"] {
        if let Some(value) = map.get(key) {
            expect_u64(value, layer, &join_path(path, key))?;
        }
    }
    Ok(())
}

/// Validate a single intake flow block.
fn validate_flow(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    let text_keys = [
        "greeting",
        "summary_title",
        "reference_label",
        "summary_footer",
    ];
    let mut allowed = text_keys.to_vec();
    allowed.push("steps");
    ensure_allowed_keys(map, &allowed, layer, path)?;

    for key in text_keys {
        if let Some(value) = map.get(key) {
            expect_string(value, layer, &join_path(path, key))?;
        }
    }
    if let Some(value) = map.get("steps") {
        let steps_path = join_path(path, "steps");
        let steps = expect_array(value, layer, &steps_path)?;
        for (idx, step) in steps.iter().enumerate() {
            validate_step(step, layer, &format!("{steps_path}[{idx}]"))?;
        }
    }
    Ok(())
}

/// Validate one `{field, prompt, label}` entry.
fn validate_step(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    ensure_allowed_keys(map, &["field", "prompt", "label"], layer, path)?;
    for key in ["field", "prompt", "label"] {
        let Some(value) = map.get(key) else {
            return Err(invalid_field(layer, &join_path(path, key), "missing key"));
        };
        expect_string(value, layer, &join_path(path, key))?;
    }
    let field = map.get("field").and_then(Value::as_str).unwrap_or_default();
    if FieldKey::parse(field).is_none() {
        return Err(invalid_field(
            layer,
            &join_path(path, "field"),
            "expected one of name, location, date, description, contact_info",
        ));
    }
    Ok(())
}

/// Expect a JSON object or return a typed error.
fn expect_object<'a>(
    value: &'a Value,
    layer: &str,
    path: &str,
) -> Result<&'a Map<String, Value>, ConfigError> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(invalid_field(layer, path, "expected object")),
    }
}

/// Expect a JSON array or return a typed error.
fn expect_array<'a>(
    value: &'a Value,
    layer: &str,
    path: &str,
) -> Result<&'a Vec<Value>, ConfigError> {
    match value {
        Value::Array(arr) => Ok(arr),
        _ => Err(invalid_field(layer, path, "expected array")),
    }
}

fn expect_string(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    if value.is_string() {
        Ok(())
    } else {
        Err(invalid_field(layer, path, "expected string"))
    }
}

fn expect_u64(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    if value.is_u64() {
        Ok(())
    } else {
        Err(invalid_field(layer, path, "expected non-negative integer"))
    }
}

/// Ensure an object contains only allowed keys.
fn ensure_allowed_keys(
    map: &Map<String, Value>,
    allowed: &[&str],
    layer: &str,
    path: &str,
) -> Result<(), ConfigError> {
    for key in map.keys() {
        if !allowed.contains(&key.as_str()) {
            return Err(invalid_field(layer, &join_path(path, key), "unknown key"));
        }
    }
    Ok(())
}

fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

/// Build a structured invalid-field error.
fn invalid_field(layer: &str, path: &str, message: &str) -> ConfigError {
    let normalized_path = if path.is_empty() { "root" } else { path };
    ConfigError::InvalidField {
        path: format!("{layer}:{normalized_path}"),
        message: message.to_string(),
    }
}
