//! Structured-output schema tree.
//!
//! [`Schema`] is a tagged union describing the shape a structured generation
//! call must return. It is data, not code: vendor adapters render it into a
//! fresh vendor-compliant JSON value and never mutate the caller's tree
//! (see [`crate::providers::adapter`]).

use std::collections::{BTreeMap, BTreeSet};

use serde_json::{Map, Value, json};

/// Expected output shape for a structured generation call.
///
/// Object properties live in a `BTreeMap`, so rendering is key-sorted and
/// two schemas with the same property set always render identically
/// regardless of declaration order — the response cache relies on this.
#[derive(Debug, Clone, PartialEq)]
pub enum Schema {
    Null,
    Bool,
    Number,
    Integer,
    String {
        pattern: Option<String>,
    },
    Object {
        properties: BTreeMap<String, Schema>,
        required: BTreeSet<String>,
    },
    Array {
        items: Box<Schema>,
        min_items: Option<usize>,
        max_items: Option<usize>,
    },
}

impl Schema {
    /// A plain string schema.
    pub fn string() -> Self {
        Schema::String { pattern: None }
    }

    /// A string schema constrained by a regex pattern.
    ///
    /// Strict-mode vendors cannot express patterns; their adapter strips
    /// the constraint before dispatch.
    pub fn string_pattern(pattern: impl Into<String>) -> Self {
        Schema::String {
            pattern: Some(pattern.into()),
        }
    }

    pub fn number() -> Self {
        Schema::Number
    }

    pub fn integer() -> Self {
        Schema::Integer
    }

    pub fn boolean() -> Self {
        Schema::Bool
    }

    /// An empty object schema; add fields with [`property`](Self::property)
    /// and [`optional`](Self::optional).
    pub fn object() -> Self {
        Schema::Object {
            properties: BTreeMap::new(),
            required: BTreeSet::new(),
        }
    }

    /// An array schema with the given item shape.
    pub fn array(items: Schema) -> Self {
        Schema::Array {
            items: Box::new(items),
            min_items: None,
            max_items: None,
        }
    }

    /// Add a required property. No-op on non-object schemas.
    pub fn property(mut self, name: impl Into<String>, schema: Schema) -> Self {
        if let Schema::Object {
            properties,
            required,
        } = &mut self
        {
            let name = name.into();
            required.insert(name.clone());
            properties.insert(name, schema);
        }
        self
    }

    /// Add an optional property. No-op on non-object schemas.
    pub fn optional(mut self, name: impl Into<String>, schema: Schema) -> Self {
        if let Schema::Object { properties, .. } = &mut self {
            properties.insert(name.into(), schema);
        }
        self
    }

    /// Set array length bounds. No-op on non-array schemas.
    pub fn length(mut self, min: Option<usize>, max: Option<usize>) -> Self {
        if let Schema::Array {
            min_items,
            max_items,
            ..
        } = &mut self
        {
            *min_items = min;
            *max_items = max;
        }
        self
    }

    /// Whether the root of this schema is an object.
    pub fn is_object(&self) -> bool {
        matches!(self, Schema::Object { .. })
    }

    /// Render as a plain (vendor-neutral) JSON schema value.
    pub fn to_json_schema(&self) -> Value {
        match self {
            Schema::Null => json!({"type": "null"}),
            Schema::Bool => json!({"type": "boolean"}),
            Schema::Number => json!({"type": "number"}),
            Schema::Integer => json!({"type": "integer"}),
            Schema::String { pattern } => {
                let mut node = Map::new();
                node.insert("type".into(), json!("string"));
                if let Some(p) = pattern {
                    node.insert("pattern".into(), json!(p));
                }
                Value::Object(node)
            }
            Schema::Object {
                properties,
                required,
            } => {
                let props: Map<String, Value> = properties
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json_schema()))
                    .collect();
                json!({
                    "type": "object",
                    "properties": props,
                    "required": required.iter().collect::<Vec<_>>(),
                })
            }
            Schema::Array {
                items,
                min_items,
                max_items,
            } => {
                let mut node = Map::new();
                node.insert("type".into(), json!("array"));
                node.insert("items".into(), items.to_json_schema());
                if let Some(min) = min_items {
                    node.insert("minItems".into(), json!(min));
                }
                if let Some(max) = max_items {
                    node.insert("maxItems".into(), json!(max));
                }
                Value::Object(node)
            }
        }
    }
}
