//! Structured-output schema descriptor
//!
//! The same value is sent to Gemini as `responseSchema` and used to check the
//! body that comes back, so a shape mismatch is reported with the JSON path
//! where it happened instead of slipping through as partial data.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Subset of the Gemini (OpenAPI-style) schema object.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum Schema {
    String,
    Integer,
    Array {
        items: Box<Schema>,
    },
    Object {
        properties: BTreeMap<String, Schema>,
        #[serde(rename = "propertyOrdering")]
        property_ordering: Vec<String>,
        required: Vec<String>,
    },
}

impl Schema {
    pub fn array(items: Schema) -> Self {
        Schema::Array {
            items: Box::new(items),
        }
    }

    pub fn object() -> Self {
        Schema::Object {
            properties: BTreeMap::new(),
            property_ordering: Vec::new(),
            required: Vec::new(),
        }
    }

    /// Adds a required property. Only meaningful on objects.
    pub fn field(mut self, name: &str, schema: Schema) -> Self {
        if let Schema::Object {
            properties,
            property_ordering,
            required,
        } = &mut self
        {
            properties.insert(name.to_string(), schema);
            property_ordering.push(name.to_string());
            required.push(name.to_string());
        }
        self
    }

    fn kind(&self) -> &'static str {
        match self {
            Schema::String => "string",
            Schema::Integer => "integer",
            Schema::Array { .. } => "array",
            Schema::Object { .. } => "object",
        }
    }

    /// Checks `value` against this schema; the error names the first
    /// offending path (`$[2].seo.keywords[0]`).
    pub fn validate(&self, value: &Value) -> Result<(), String> {
        self.validate_at(value, "$")
    }

    fn validate_at(&self, value: &Value, path: &str) -> Result<(), String> {
        let matches = match (self, value) {
            (Schema::String, Value::String(_)) => true,
            (Schema::Integer, Value::Number(n)) => n.is_i64() || n.is_u64(),
            (Schema::Array { items }, Value::Array(values)) => {
                for (i, item) in values.iter().enumerate() {
                    items.validate_at(item, &format!("{}[{}]", path, i))?;
                }
                true
            }
            (
                Schema::Object {
                    properties,
                    required,
                    ..
                },
                Value::Object(map),
            ) => {
                for name in required {
                    if !map.contains_key(name) {
                        return Err(format!("{}.{}: missing required field", path, name));
                    }
                }
                for (name, schema) in properties {
                    if let Some(field) = map.get(name) {
                        schema.validate_at(field, &format!("{}.{}", path, name))?;
                    }
                }
                true
            }
            _ => false,
        };

        if matches {
            Ok(())
        } else {
            Err(format!(
                "{}: expected {}, found {}",
                path,
                self.kind(),
                json_kind(value)
            ))
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Output schema for the strategy request: an array of strategy objects.
pub fn strategies() -> Schema {
    let string_list = || Schema::array(Schema::String);

    Schema::array(
        Schema::object()
            .field("id", Schema::Integer)
            .field("problem", Schema::String)
            .field("hook", Schema::String)
            .field(
                "script",
                Schema::object()
                    .field("voiceover", Schema::String)
                    .field("scenes", Schema::String),
            )
            .field(
                "seo",
                Schema::object()
                    .field("title", Schema::String)
                    .field("keywords", string_list())
                    .field("tags", string_list())
                    .field("description", Schema::String),
            )
            .field(
                "thumbnail",
                Schema::object()
                    .field("text", Schema::String)
                    .field("imageIdea", Schema::String)
                    .field("emotion", Schema::String),
            ),
    )
}
