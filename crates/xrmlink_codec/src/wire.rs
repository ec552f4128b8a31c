//! Wire value model.
//!
//! These are the shapes the remote service accepts and returns. Monetary
//! amounts, option codes and lookups each have their own wrapper, the same
//! way the service's own SDK types them.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::btree_map;
use std::collections::BTreeMap;
use uuid::Uuid;

/// A monetary amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money(pub Decimal);

impl Money {
    /// Returns the amount.
    pub fn value(&self) -> Decimal {
        self.0
    }
}

/// A reference to a record in another entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityReference {
    /// Logical name of the target entity.
    pub logical_name: String,
    /// Identifier of the target record.
    pub id: Uuid,
    /// Primary name of the target record, when the service supplies it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl EntityReference {
    /// Creates a reference without a name.
    pub fn new(logical_name: impl Into<String>, id: Uuid) -> Self {
        Self {
            logical_name: logical_name.into(),
            id,
            name: None,
        }
    }
}

/// A value as carried by the remote service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum WireValue {
    /// Explicit "clear this field" marker.
    Null,
    /// Text (string and memo attributes).
    String(String),
    /// Whole number (integer and bigint attributes).
    Integer(i64),
    /// Floating point number.
    Double(f64),
    /// Exact decimal (non-monetary decimal attributes).
    Decimal(Decimal),
    /// Boolean.
    Boolean(bool),
    /// Timestamp.
    DateTime(DateTime<Utc>),
    /// Unique identifier.
    Guid(Uuid),
    /// Monetary wrapper.
    Money(Money),
    /// Option code of a choice attribute.
    OptionSetValue(i32),
    /// Lookup to another record.
    EntityReference(EntityReference),
}

impl WireValue {
    /// Returns true if this is the clear marker.
    pub fn is_clear(&self) -> bool {
        matches!(self, WireValue::Null)
    }

    /// Short name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            WireValue::Null => "null",
            WireValue::String(_) => "string",
            WireValue::Integer(_) => "integer",
            WireValue::Double(_) => "double",
            WireValue::Decimal(_) => "decimal",
            WireValue::Boolean(_) => "boolean",
            WireValue::DateTime(_) => "datetime",
            WireValue::Guid(_) => "guid",
            WireValue::Money(_) => "money",
            WireValue::OptionSetValue(_) => "option set value",
            WireValue::EntityReference(_) => "entity reference",
        }
    }
}

/// A record as sent to or received from the remote service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireRecord {
    /// Logical name of the entity this record belongs to.
    pub logical_name: String,
    /// Record identifier; unset on create.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    /// Attribute values keyed by logical name.
    #[serde(default)]
    pub attributes: BTreeMap<String, WireValue>,
}

impl WireRecord {
    /// Creates an empty record for the given entity.
    pub fn new(logical_name: impl Into<String>) -> Self {
        Self {
            logical_name: logical_name.into(),
            id: None,
            attributes: BTreeMap::new(),
        }
    }

    /// Sets the record identifier (builder style).
    #[must_use]
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = Some(id);
        self
    }

    /// Sets an attribute (builder style).
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: WireValue) -> Self {
        self.set(name, value);
        self
    }

    /// Sets an attribute.
    pub fn set(&mut self, name: impl Into<String>, value: WireValue) {
        self.attributes.insert(name.into(), value);
    }

    /// Gets an attribute.
    pub fn get(&self, name: &str) -> Option<&WireValue> {
        self.attributes.get(name)
    }

    /// Returns true if the attribute is present.
    pub fn contains(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// Number of attributes present.
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Returns true if no attributes are present.
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Iterates over attributes in name order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, WireValue> {
        self.attributes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_record_builder() {
        let id = Uuid::new_v4();
        let record = WireRecord::new("contact")
            .with_id(id)
            .with("lastname", WireValue::String("Smith".into()))
            .with("statuscode", WireValue::OptionSetValue(1));

        assert_eq!(record.id, Some(id));
        assert_eq!(record.len(), 2);
        assert_eq!(record.get("statuscode"), Some(&WireValue::OptionSetValue(1)));
        assert!(!record.contains("firstname"));
    }

    #[test]
    fn clear_marker() {
        assert!(WireValue::Null.is_clear());
        assert!(!WireValue::String(String::new()).is_clear());
        assert_eq!(WireValue::Money(Money(Decimal::ONE)).kind(), "money");
    }

    #[test]
    fn wire_record_json_shape() {
        let record = WireRecord::new("contact").with("creditlimit", WireValue::Money(Money(Decimal::new(25, 0))));
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["logical_name"], "contact");
        assert_eq!(json["attributes"]["creditlimit"]["type"], "Money");
        assert!(json.get("id").is_none());
    }
}
