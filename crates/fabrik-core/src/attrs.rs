use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Insertion-ordered attribute bag
///
/// Stores field values as JSON, like a metadata map, but keeps insertion
/// order: default generators are evaluated in declaration order and each one
/// sees exactly the fields accumulated before it, so the backing storage is
/// an ordered pair list rather than a hash map.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Attributes {
    entries: Vec<(String, Value)>,
}

impl Attributes {
    /// Create a new empty attribute bag
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Get a value by field name
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }

    /// Set a field value
    ///
    /// An existing field keeps its position and has its value replaced;
    /// a new field is appended at the end.
    pub fn set(&mut self, field: impl Into<String>, value: Value) {
        let field = field.into();
        match self.entries.iter_mut().find(|(name, _)| *name == field) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((field, value)),
        }
    }

    /// Remove a field, returning its value if present
    pub fn remove(&mut self, field: &str) -> Option<Value> {
        let index = self.entries.iter().position(|(name, _)| name == field)?;
        Some(self.entries.remove(index).1)
    }

    /// Check if a field is present
    pub fn contains(&self, field: &str) -> bool {
        self.entries.iter().any(|(name, _)| name == field)
    }

    /// Iterate fields in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Get the number of fields
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the bag is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<Vec<(String, Value)>> for Attributes {
    fn from(pairs: Vec<(String, Value)>) -> Self {
        let mut attrs = Self::new();
        for (field, value) in pairs {
            attrs.set(field, value);
        }
        attrs
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let mut attrs = Self::new();
        for (field, value) in iter {
            attrs.set(field, value);
        }
        attrs
    }
}

impl<K: Into<String>> Extend<(K, Value)> for Attributes {
    fn extend<I: IntoIterator<Item = (K, Value)>>(&mut self, iter: I) {
        for (field, value) in iter {
            self.set(field, value);
        }
    }
}

impl Serialize for Attributes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (field, value) in &self.entries {
            map.serialize_entry(field, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Attributes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct AttributesVisitor;

        impl<'de> Visitor<'de> for AttributesVisitor {
            type Value = Attributes;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an attribute map")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut attrs = Attributes::new();
                while let Some((field, value)) = map.next_entry::<String, Value>()? {
                    attrs.set(field, value);
                }
                Ok(attrs)
            }
        }

        deserializer.deserialize_map(AttributesVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn preserves_insertion_order() {
        let mut attrs = Attributes::new();
        attrs.set("b", json!(2));
        attrs.set("a", json!(1));
        attrs.set("c", json!(3));

        let fields: Vec<&str> = attrs.iter().map(|(name, _)| name).collect();
        assert_eq!(fields, vec!["b", "a", "c"]);
    }

    #[test]
    fn set_replaces_in_place() {
        let mut attrs = Attributes::from_iter([("x", json!(1)), ("y", json!(2))]);
        attrs.set("x", json!(10));

        let fields: Vec<&str> = attrs.iter().map(|(name, _)| name).collect();
        assert_eq!(fields, vec!["x", "y"]);
        assert_eq!(attrs.get("x"), Some(&json!(10)));
        assert_eq!(attrs.len(), 2);
    }

    #[test]
    fn serializes_as_ordered_map() {
        let attrs = Attributes::from_iter([("first", json!("a")), ("second", json!(2))]);
        let text = serde_json::to_string(&attrs).unwrap();
        assert_eq!(text, r#"{"first":"a","second":2}"#);

        let back: Attributes = serde_json::from_str(&text).unwrap();
        assert_eq!(back, attrs);
    }
}
