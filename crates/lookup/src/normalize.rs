//! Payload normalization.
//!
//! Upstream responses are arbitrary text, ideally JSON of unknown shape.
//! Normalization turns any payload into a flat, ordered field map: mapping
//! keys join with `.`, sequence elements append `[index]`, scalars
//! terminate a path. Non-JSON bodies degrade to a single `raw` entry.

use indexmap::IndexMap;
use serde_json::Value;

/// Ordered flat field map produced by [`flatten`].
pub type FlatFields = IndexMap<String, Value>;

/// Vendor noise keys stripped from a top-level mapping before flattening.
const STRIP_KEYS: [&str; 2] = ["dev", "channel"];

/// Parse a raw upstream payload into a JSON value.
///
/// Parse failure yields `{"raw": <text>}` so downstream stages never see
/// an error. Top-level vendor noise keys are removed.
pub fn parse_payload(raw: &str) -> Value {
    match serde_json::from_str::<Value>(raw) {
        Ok(mut value) => {
            if let Value::Object(map) = &mut value {
                for key in STRIP_KEYS {
                    map.shift_remove(key);
                }
            }
            value
        }
        Err(_) => {
            let mut map = serde_json::Map::new();
            map.insert("raw".to_string(), Value::String(raw.to_string()));
            Value::Object(map)
        }
    }
}

/// Recursively flatten a value into path/scalar pairs, preserving
/// traversal order.
pub fn flatten(value: &Value) -> FlatFields {
    let mut out = IndexMap::new();
    flatten_into(value, String::new(), &mut out);
    out
}

fn flatten_into(value: &Value, prefix: String, out: &mut FlatFields) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", prefix, key)
                };
                flatten_into(child, path, out);
            }
        }
        Value::Array(items) => {
            for (idx, item) in items.iter().enumerate() {
                flatten_into(item, format!("{}[{}]", prefix, idx), out);
            }
        }
        scalar => {
            out.insert(prefix, scalar.clone());
        }
    }
}

/// Parse and flatten in one step.
pub fn normalize(raw: &str) -> FlatFields {
    flatten(&parse_payload(raw))
}
