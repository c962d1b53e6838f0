use std::collections::BTreeSet;

use fieldtrail_core_types::{EntityDescriptor, EntityId, EntitySchema, FieldValue};

use crate::entry::FieldMap;
use crate::errors::{AuditError, Result};

/// Validated logged-field set for one entity kind
///
/// Registration is where the fixed set of trackable field names is checked
/// against the entity schema. A name absent from the schema fails here,
/// before any entity of the kind can be audited; the write and read paths
/// can then assume every logged field has a declared type.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditRegistration {
    schema: EntitySchema,
    logged_fields: BTreeSet<String>,
}

impl AuditRegistration {
    /// Register an entity kind for auditing
    ///
    /// # Errors
    ///
    /// `UnknownLoggedField` if any name in `logged_fields` is not declared on
    /// the schema. Registration aborts on the first offending name.
    pub fn register<I, S>(schema: EntitySchema, logged_fields: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let logged_fields: BTreeSet<String> =
            logged_fields.into_iter().map(Into::into).collect();

        for field in &logged_fields {
            if !schema.contains(field) {
                return Err(AuditError::UnknownLoggedField {
                    kind: schema.kind().to_string(),
                    field: field.clone(),
                });
            }
        }

        Ok(Self {
            schema,
            logged_fields,
        })
    }

    /// The entity kind this registration covers
    pub fn kind(&self) -> &str {
        self.schema.kind()
    }

    /// The underlying schema descriptor
    pub fn schema(&self) -> &EntitySchema {
        &self.schema
    }

    /// Whether a field name is in the logged set
    pub fn is_logged(&self, field: &str) -> bool {
        self.logged_fields.contains(field)
    }

    /// Iterate over the logged field names
    pub fn logged_fields(&self) -> impl Iterator<Item = &str> {
        self.logged_fields.iter().map(String::as_str)
    }

    /// Build the descriptor for one entity of this kind
    pub fn descriptor(&self, id: impl Into<EntityId>) -> EntityDescriptor {
        EntityDescriptor::new(self.kind(), id)
    }

    /// All-null map over the logged set
    ///
    /// The before-state used when no prior record state is known (creation,
    /// or an update racing a concurrent delete).
    pub fn null_baseline(&self) -> FieldMap {
        self.logged_fields
            .iter()
            .map(|field| (field.clone(), FieldValue::Null))
            .collect()
    }
}
