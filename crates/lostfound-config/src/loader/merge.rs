//! JSON merge helpers for layered configuration.

use serde_json::Value;

/// Merge an overlay into the base value.
///
/// Objects merge key by key, arrays and scalars replace the base, and an
/// explicit `null` keeps whatever the lower layer set.
pub(super) fn merge_json_values(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (_, Value::Null) => {}
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                let slot = base_map.entry(key.clone()).or_insert(Value::Null);
                merge_json_values(slot, value);
            }
        }
        (slot, value) => *slot = value.clone(),
    }
}
