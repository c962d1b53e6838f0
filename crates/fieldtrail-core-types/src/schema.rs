use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Declared type of a single audited field
///
/// Decimal fields carry the declared digit count and decimal places; the
/// inbound coercion path renders float intermediates at exactly this width
/// and scale before parsing them back into an exact decimal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldType {
    Boolean,
    Integer,
    Float,
    Decimal { max_digits: u32, decimal_places: u32 },
    Date,
    DateTime,
    Text,
}

/// Explicit schema descriptor for one entity kind
///
/// Replaces runtime reflection against the host's model layer: the host
/// declares its field types once, the audit engine resolves them here at
/// registration time and reuses the mapping on every read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySchema {
    kind: String,
    fields: BTreeMap<String, FieldType>,
}

impl EntitySchema {
    /// Create an empty schema for the given entity kind
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Declare a field, builder style
    pub fn with_field(mut self, name: impl Into<String>, field_type: FieldType) -> Self {
        self.fields.insert(name.into(), field_type);
        self
    }

    /// The entity kind this schema describes
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Look up a field's declared type
    pub fn field_type(&self, name: &str) -> Option<FieldType> {
        self.fields.get(name).copied()
    }

    /// Whether the schema declares a field with this name
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Iterate over declared field names
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Number of declared fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the schema declares no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_and_lookup() {
        let schema = EntitySchema::new("fleet.Courier")
            .with_field("deliveries", FieldType::Integer)
            .with_field(
                "fastest_route",
                FieldType::Decimal {
                    max_digits: 5,
                    decimal_places: 2,
                },
            );

        assert_eq!(schema.kind(), "fleet.Courier");
        assert_eq!(schema.len(), 2);
        assert!(schema.contains("deliveries"));
        assert!(!schema.contains("missing"));
        assert_eq!(schema.field_type("deliveries"), Some(FieldType::Integer));
        assert_eq!(schema.field_type("missing"), None);
    }

    #[test]
    fn test_field_names_sorted() {
        let schema = EntitySchema::new("k")
            .with_field("b", FieldType::Text)
            .with_field("a", FieldType::Text);
        let names: Vec<_> = schema.field_names().collect();
        assert_eq!(names, vec!["a", "b"]);
    }
}
