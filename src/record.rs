//! Typed customer records handed over by the ingestion layer.

use serde::{Deserialize, Serialize};

/// A single field value: numeric or free text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    /// The value as a finite number, if it is one.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(v) if v.is_finite() => Some(*v),
            _ => None,
        }
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Number(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Text(v)
    }
}

/// An immutable input record: a unique identifier plus ordered named fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    #[serde(default)]
    pub fields: Vec<(String, FieldValue)>,
}

impl Record {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: Vec::new(),
        }
    }

    /// Append a field, keeping insertion order.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    /// First value stored under `name`.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    pub fn numeric(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(FieldValue::as_number)
    }

    /// Numeric value of `name`, with missing, textual and non-finite values read as 0.
    pub fn coerced(&self, name: &str) -> f64 {
        self.numeric(name).unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coercion() {
        let record = Record::new("c1")
            .with_field("spend", 12.5)
            .with_field("segment", "gold")
            .with_field("broken", f64::NAN);

        assert_eq!(record.numeric("spend"), Some(12.5));
        assert_eq!(record.coerced("segment"), 0.0);
        assert_eq!(record.coerced("broken"), 0.0);
        assert_eq!(record.coerced("missing"), 0.0);
    }

    #[test]
    fn test_json_untagged_values() {
        let json = r#"{"id":"c9","fields":[["spend",100.0],["tier","gold"]]}"#;
        let record: Record = serde_json::from_str(json).unwrap();
        assert_eq!(record.get("spend"), Some(&FieldValue::Number(100.0)));
        assert_eq!(record.get("tier"), Some(&FieldValue::Text("gold".to_string())));
    }
}
