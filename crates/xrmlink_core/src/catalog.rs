//! Per-entity field descriptor catalog.

use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use xrmlink_codec::{FieldDescriptor, FieldType, OptionSet};

/// The synchronized set of field descriptors for one entity.
///
/// A catalog is immutable once built. Synchronization replaces it wholesale;
/// there is no partial merge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptorCatalog {
    entity_name: String,
    fields: Vec<FieldDescriptor>,
}

impl FieldDescriptorCatalog {
    /// Creates a catalog. Field order is kept.
    pub fn new(entity_name: impl Into<String>, fields: Vec<FieldDescriptor>) -> Self {
        Self {
            entity_name: entity_name.into(),
            fields,
        }
    }

    /// Logical name of the entity.
    pub fn entity_name(&self) -> &str {
        &self.entity_name
    }

    /// All descriptors, in remote order.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Finds a descriptor by logical name.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name() == name)
    }

    /// Finds a descriptor by logical name, then by display name.
    pub fn resolve(&self, key: &str) -> Option<&FieldDescriptor> {
        self.field(key)
            .or_else(|| self.fields.iter().find(|f| f.display_name() == key))
    }

    /// Descriptors create must be given: required and written by create.
    pub fn required_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|f| f.required() && f.updatable())
    }

    /// Descriptors create and update write.
    pub fn updatable_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|f| f.updatable())
    }

    /// Choice descriptors.
    pub fn choice_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields
            .iter()
            .filter(|f| f.field_type() == FieldType::Choice)
    }

    /// Option set of a choice field.
    pub fn option_set(&self, name: &str) -> Option<&OptionSet> {
        self.field(name).and_then(FieldDescriptor::option_set)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if there are no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Renders one line per field, for diagnostics.
    pub fn describe(&self) -> String {
        let mut out = format!("{} ({} fields)", self.entity_name, self.fields.len());
        for field in &self.fields {
            let _ = write!(
                out,
                "\n  {} ({}): {}/{}",
                field.name(),
                field.display_name(),
                field.field_type(),
                field.value_type()
            );
            if field.required() {
                out.push_str(" required");
            }
            if field.updatable() {
                out.push_str(" updatable");
            }
            if let Some(options) = field.option_set() {
                let pairs: Vec<String> = options
                    .iter()
                    .map(|o| format!("'{}':{}", o.label, o.code))
                    .collect();
                let _ = write!(out, " [{}]", pairs.join(", "));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xrmlink_codec::ValueType;

    fn catalog() -> FieldDescriptorCatalog {
        FieldDescriptorCatalog::new(
            "contact",
            vec![
                FieldDescriptor::identifier("contactid", "Contact"),
                FieldDescriptor::scalar("lastname", "Last Name", ValueType::Text)
                    .with_required(true)
                    .with_updatable(true),
                FieldDescriptor::choice(
                    "statuscode",
                    "Status Reason",
                    OptionSet::from_pairs([("Active", 1), ("Inactive", 2)]),
                )
                .with_updatable(true),
                FieldDescriptor::scalar("createdon", "Created On", ValueType::DateTime)
                    .with_required(true),
            ],
        )
    }

    #[test]
    fn lookups() {
        let catalog = catalog();
        assert_eq!(catalog.len(), 4);
        assert!(catalog.field("lastname").is_some());
        assert!(catalog.field("Last Name").is_none());
        assert_eq!(
            catalog.resolve("Last Name").map(FieldDescriptor::name),
            Some("lastname")
        );
        assert_eq!(catalog.option_set("statuscode").map(OptionSet::len), Some(2));
    }

    #[test]
    fn filters() {
        let catalog = catalog();
        let required: Vec<&str> = catalog.required_fields().map(FieldDescriptor::name).collect();
        // createdon is required remotely but never written, so never demanded.
        assert_eq!(required, vec!["lastname"]);

        let updatable: Vec<&str> = catalog.updatable_fields().map(FieldDescriptor::name).collect();
        assert_eq!(updatable, vec!["lastname", "statuscode"]);

        assert_eq!(catalog.choice_fields().count(), 1);
    }

    #[test]
    fn describe_lists_every_field() {
        let text = catalog().describe();
        assert!(text.starts_with("contact (4 fields)"));
        assert!(text.contains("lastname (Last Name): scalar/text required updatable"));
        assert!(text.contains("['Active':1, 'Inactive':2]"));
    }
}
