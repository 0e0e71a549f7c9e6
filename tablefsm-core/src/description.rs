//! Declarative transition table descriptions.
//!
//! A description is a flat object of key text to target state:
//!
//! ```json
//! {
//!   "Created-Continue": "Stopped",
//!   "Created-Cancel": "InternalErrorState",
//!   "Stopped-Run": "Running",
//!   "Running-Cancel": "Cancelled"
//! }
//! ```
//!
//! Converting text to and from a description is the job of a [`TableCodec`].
//! The engine itself only ever sees [`TableDescription`] values.

use crate::error::CoreError;
use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Ordered `(key text, target state)` pairs.
///
/// Document order is kept when decoding so that a table rebuilt from a
/// description iterates the way the description was written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableDescription {
    entries: Vec<(String, String)>,
}

impl TableDescription {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: impl Into<String>, target: impl Into<String>) {
        self.entries.push((key.into(), target.into()));
    }

    /// Returns the target of the first entry whose key text equals `key` exactly.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for TableDescription
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl Serialize for TableDescription {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, target) in &self.entries {
            map.serialize_entry(key, target)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for TableDescription {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct DescriptionVisitor;

        impl<'de> Visitor<'de> for DescriptionVisitor {
            type Value = TableDescription;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map of \"state-condition\" keys to target states")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, target)) = map.next_entry::<String, String>()? {
                    entries.push((key, target));
                }
                Ok(TableDescription { entries })
            }

            fn visit_unit<E>(self) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(TableDescription::default())
            }
        }

        deserializer.deserialize_map(DescriptionVisitor)
    }
}

/// Converts descriptions to and from text.
pub trait TableCodec {
    /// Short name used in error messages.
    fn name(&self) -> &'static str;

    fn decode(&self, text: &str) -> Result<TableDescription, CoreError>;

    fn encode(&self, description: &TableDescription) -> Result<String, CoreError>;
}

/// JSON codec. Compact output is the canonical serialization.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec {
    pub pretty: bool,
}

impl JsonCodec {
    pub fn pretty() -> Self {
        Self { pretty: true }
    }
}

impl TableCodec for JsonCodec {
    fn name(&self) -> &'static str {
        "json"
    }

    fn decode(&self, text: &str) -> Result<TableDescription, CoreError> {
        Ok(serde_json::from_str(text)?)
    }

    fn encode(&self, description: &TableDescription) -> Result<String, CoreError> {
        let text = if self.pretty {
            serde_json::to_string_pretty(description)?
        } else {
            serde_json::to_string(description)?
        };
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CUSTOM: &str = r#"{"Created-Continue":"Stopped","Created-Cancel":"InternalErrorState","Stopped-Run":"Running","Running-Cancel":"Cancelled"}"#;

    #[test]
    fn test_decode_keeps_document_order() {
        let desc = JsonCodec::default().decode(CUSTOM).unwrap();
        let keys: Vec<&str> = desc.iter().map(|(k, _)| k).collect();
        assert_eq!(
            keys,
            vec![
                "Created-Continue",
                "Created-Cancel",
                "Stopped-Run",
                "Running-Cancel"
            ]
        );
        assert_eq!(desc.get("Stopped-Run"), Some("Running"));
    }

    #[test]
    fn test_encode_matches_input() {
        let codec = JsonCodec::default();
        let desc = codec.decode(CUSTOM).unwrap();
        assert_eq!(codec.encode(&desc).unwrap(), CUSTOM);
    }

    #[test]
    fn test_decode_empty_object() {
        let desc = JsonCodec::default().decode("{}").unwrap();
        assert!(desc.is_empty());
    }

    #[test]
    fn test_decode_rejects_non_string_values() {
        let codec = JsonCodec::default();
        assert!(matches!(
            codec.decode(r#"{"Created-Continue": 1}"#),
            Err(CoreError::Json(_))
        ));
        assert!(matches!(
            codec.decode(r#"{"Created-Continue": {"to": "Running"}}"#),
            Err(CoreError::Json(_))
        ));
        assert!(matches!(codec.decode("[]"), Err(CoreError::Json(_))));
        assert!(matches!(codec.decode("not json"), Err(CoreError::Json(_))));
    }

    #[test]
    fn test_pretty_output_decodes_back() {
        let codec = JsonCodec::pretty();
        let desc: TableDescription = [("Created-Continue", "Running")].into_iter().collect();
        let text = codec.encode(&desc).unwrap();
        assert!(text.contains('\n'));
        assert_eq!(codec.decode(&text).unwrap(), desc);
    }
}
