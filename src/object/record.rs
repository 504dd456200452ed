use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A loaded external record with property-style field access.
///
/// Wraps the raw JSON object exactly as fetched (plus any overlays) so the
/// host can read fields by name and serialize it back unchanged.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectRecord {
    fields: Map<String, Value>,
}

impl ObjectRecord {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Build from any JSON value; non-objects yield `None`.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self { fields }),
            _ => None,
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.fields.get_mut(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn insert(&mut self, name: &str, value: Value) -> Option<Value> {
        self.fields.insert(name.to_string(), value)
    }

    /// The `id` field as a string, whether the API sent it as number or text.
    pub fn id(&self) -> Option<String> {
        record_id(&self.fields)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}

/// Identifier of a raw JSON record: a number or a non-empty string.
pub fn record_id(fields: &Map<String, Value>) -> Option<String> {
    match fields.get("id")? {
        Value::Number(id) => Some(id.to_string()),
        Value::String(id) if !id.is_empty() => Some(id.clone()),
        _ => None,
    }
}
