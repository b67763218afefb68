//! Purpose: Closed JSON-like value model exchanged between the client and its renderer.
//! Exports: `StructuredValue`, `Primitive`, `Fields`.
//! Role: Typed view over decoded response payloads; replaces runtime type probing.
//! Invariants: `Fields` keys are unique and iterate in insertion order.
//! Invariants: Conversions to and from `serde_json::Value` are lossless.
use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Number, Value};

#[derive(Clone, Debug, PartialEq)]
pub enum StructuredValue {
    Null,
    Primitive(Primitive),
    Sequence(Vec<StructuredValue>),
    Mapping(Fields),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Primitive {
    String(String),
    Number(Number),
    Bool(bool),
}

/// Ordered mapping from field name to value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Fields {
    entries: Vec<(String, StructuredValue)>,
}

impl StructuredValue {
    pub fn string(text: impl Into<String>) -> Self {
        Self::Primitive(Primitive::String(text.into()))
    }

    pub fn as_mapping(&self) -> Option<&Fields> {
        match self {
            Self::Mapping(fields) => Some(fields),
            _ => None,
        }
    }

    pub fn into_mapping(self) -> Option<Fields> {
        match self {
            Self::Mapping(fields) => Some(fields),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Primitive(Primitive::String(text)) => Value::String(text.clone()),
            Self::Primitive(Primitive::Number(num)) => Value::Number(num.clone()),
            Self::Primitive(Primitive::Bool(val)) => Value::Bool(*val),
            Self::Sequence(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            Self::Mapping(fields) => Value::Object(fields.to_json_map()),
        }
    }
}

impl Primitive {
    /// Plain text form: strings verbatim, numbers in JSON notation.
    pub fn to_text(&self) -> String {
        match self {
            Primitive::String(text) => text.clone(),
            Primitive::Number(num) => num.to_string(),
            Primitive::Bool(val) => val.to_string(),
        }
    }
}

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&StructuredValue> {
        self.entries
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value)
    }

    /// Inserts or replaces. A replaced key keeps its original position.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<StructuredValue>,
    ) -> Option<StructuredValue> {
        let key = key.into();
        let value = value.into();
        if let Some((_, slot)) = self.entries.iter_mut().find(|(name, _)| *name == key) {
            return Some(std::mem::replace(slot, value));
        }
        self.entries.push((key, value));
        None
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &StructuredValue)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn to_json_map(&self) -> Map<String, Value> {
        self.entries
            .iter()
            .map(|(name, value)| (name.clone(), value.to_json()))
            .collect()
    }
}

impl FromIterator<(String, StructuredValue)> for Fields {
    fn from_iter<I: IntoIterator<Item = (String, StructuredValue)>>(iter: I) -> Self {
        let mut fields = Fields::new();
        for (key, value) in iter {
            fields.insert(key, value);
        }
        fields
    }
}

impl From<Value> for StructuredValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(val) => Self::Primitive(Primitive::Bool(val)),
            Value::Number(num) => Self::Primitive(Primitive::Number(num)),
            Value::String(text) => Self::Primitive(Primitive::String(text)),
            Value::Array(items) => Self::Sequence(items.into_iter().map(Self::from).collect()),
            Value::Object(map) => Self::Mapping(Fields::from(map)),
        }
    }
}

impl From<Map<String, Value>> for Fields {
    fn from(map: Map<String, Value>) -> Self {
        map.into_iter()
            .map(|(key, value)| (key, StructuredValue::from(value)))
            .collect()
    }
}

impl From<&StructuredValue> for Value {
    fn from(value: &StructuredValue) -> Self {
        value.to_json()
    }
}

impl From<&str> for StructuredValue {
    fn from(text: &str) -> Self {
        Self::string(text)
    }
}

impl From<String> for StructuredValue {
    fn from(text: String) -> Self {
        Self::string(text)
    }
}

impl From<Fields> for StructuredValue {
    fn from(fields: Fields) -> Self {
        Self::Mapping(fields)
    }
}

impl Serialize for StructuredValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Primitive(Primitive::String(text)) => serializer.serialize_str(text),
            Self::Primitive(Primitive::Number(num)) => num.serialize(serializer),
            Self::Primitive(Primitive::Bool(val)) => serializer.serialize_bool(*val),
            Self::Sequence(items) => serializer.collect_seq(items),
            Self::Mapping(fields) => fields.serialize(serializer),
        }
    }
}

impl Serialize for Fields {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self.iter() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for StructuredValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Self::from)
    }
}

#[cfg(test)]
mod tests {
    use super::{Fields, Primitive, StructuredValue};
    use serde_json::json;

    #[test]
    fn decoded_objects_keep_document_order() {
        let value: StructuredValue =
            serde_json::from_str(r#"{"zeta":1,"alpha":2,"mid":3}"#).expect("decode");
        let fields = value.as_mapping().expect("mapping");
        let keys: Vec<&str> = fields.keys().collect();
        assert_eq!(keys, ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn insert_replaces_in_place() {
        let mut fields = Fields::new();
        fields.insert("a", "one");
        fields.insert("b", "two");
        let previous = fields.insert("a", "uno");
        assert_eq!(previous, Some(StructuredValue::string("one")));
        let keys: Vec<&str> = fields.keys().collect();
        assert_eq!(keys, ["a", "b"]);
        assert_eq!(fields.get("a"), Some(&StructuredValue::string("uno")));
    }

    #[test]
    fn json_conversion_is_lossless() {
        let original = json!({
            "answer": "42",
            "confidence": 0.9,
            "flags": [true, null, {"k": [1, 2]}],
            "empty": {}
        });
        let value = StructuredValue::from(original.clone());
        assert_eq!(value.to_json(), original);
        let encoded = serde_json::to_value(&value).expect("serialize");
        assert_eq!(encoded, original);
    }

    #[test]
    fn primitive_text_forms() {
        assert_eq!(Primitive::String("two".to_string()).to_text(), "two");
        assert_eq!(Primitive::Number(1.into()).to_text(), "1");
        assert_eq!(Primitive::Bool(false).to_text(), "false");
        let number = serde_json::Number::from_f64(0.9).expect("finite");
        assert_eq!(Primitive::Number(number).to_text(), "0.9");
    }
}
