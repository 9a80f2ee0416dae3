//! Vendor-specific schema translation layer.
//!
//! All "this vendor needs the schema *this* way" logic lives here and
//! nowhere else. Each transform renders the caller's [`Schema`] into a
//! fresh `serde_json::Value`; the caller's tree is never mutated.
//!
//! Two vendor families are covered:
//!
//! - **Strict mode** ([`to_strict_schema`]): the vendor validates output
//!   server-side against the schema but requires every property to be
//!   present (`required`), forbids unknown keys (`additionalProperties:
//!   false`), rejects `pattern` and array length bounds, and demands an
//!   object at the schema root. Optional properties are widened to
//!   nullable since omission is not allowed; a non-object root is wrapped
//!   in a synthetic single-key object and unwrapped after parsing.
//! - **Schema stripping** ([`to_gemini_schema`]): the vendor rejects
//!   JSON-schema meta fields. `$schema`, `additionalProperties`, and
//!   internal markers are removed recursively and every property is
//!   marked required.

use serde_json::{Map, Value, json};

use crate::types::Schema;

/// Synthetic key used when a non-object root must be wrapped for strict mode.
pub(crate) const ROOT_WRAPPER_KEY: &str = "value";

/// Render a schema for the strict-mode vendor family.
///
/// Returns the vendor-compliant schema and whether the root was wrapped;
/// a wrapped result must be unwound with [`unwrap_root`] after parsing.
pub(crate) fn to_strict_schema(schema: &Schema) -> (Value, bool) {
    if schema.is_object() {
        (render_strict(schema, false), false)
    } else {
        let wrapped = json!({
            "type": "object",
            "properties": { ROOT_WRAPPER_KEY: render_strict(schema, false) },
            "required": [ROOT_WRAPPER_KEY],
            "additionalProperties": false,
        });
        (wrapped, true)
    }
}

/// Undo the synthetic root wrapping applied by [`to_strict_schema`].
pub(crate) fn unwrap_root(mut value: Value) -> Value {
    match value.get_mut(ROOT_WRAPPER_KEY) {
        Some(inner) => inner.take(),
        None => value,
    }
}

fn render_strict(schema: &Schema, nullable: bool) -> Value {
    let mut node = match schema {
        Schema::Null => json!({"type": "null"}),
        Schema::Bool => json!({"type": "boolean"}),
        Schema::Number => json!({"type": "number"}),
        Schema::Integer => json!({"type": "integer"}),
        // pattern constraints are incompatible with strict mode
        Schema::String { .. } => json!({"type": "string"}),
        Schema::Object {
            properties,
            required,
        } => {
            let props: Map<String, Value> = properties
                .iter()
                // strict mode forbids omission, so formerly-optional
                // properties are widened to nullable instead
                .map(|(k, v)| (k.clone(), render_strict(v, !required.contains(k))))
                .collect();
            json!({
                "type": "object",
                "properties": props,
                "required": properties.keys().collect::<Vec<_>>(),
                "additionalProperties": false,
            })
        }
        // length bounds are incompatible with strict mode
        Schema::Array { items, .. } => json!({
            "type": "array",
            "items": render_strict(items, false),
        }),
    };
    if nullable && let Some(map) = node.as_object_mut() {
        let current = map
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or("string")
            .to_string();
        map.insert("type".into(), json!([current, "null"]));
    }
    node
}

/// Render a schema for the schema-stripping vendor family.
pub(crate) fn to_gemini_schema(schema: &Schema) -> Value {
    let mut value = schema.to_json_schema();
    normalize_for_gemini(&mut value);
    value
}

fn normalize_for_gemini(value: &mut Value) {
    let Some(map) = value.as_object_mut() else {
        return;
    };
    map.remove("$schema");
    map.remove("additionalProperties");
    map.remove("optional");

    let node_type = map.get("type").and_then(Value::as_str).map(str::to_owned);
    match node_type.as_deref() {
        Some("object") => {
            let all_keys: Vec<Value> = map
                .get("properties")
                .and_then(Value::as_object)
                .map(|props| props.keys().map(|k| json!(k)).collect())
                .unwrap_or_default();
            map.insert("required".into(), Value::Array(all_keys));
            if let Some(props) = map.get_mut("properties").and_then(Value::as_object_mut) {
                for child in props.values_mut() {
                    normalize_for_gemini(child);
                }
            }
        }
        Some("array") => {
            if let Some(items) = map.get_mut("items") {
                normalize_for_gemini(items);
            }
        }
        _ => {}
    }
}
