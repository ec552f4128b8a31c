//! Canonical value model.
//!
//! Callers of the CRUD operations exchange [`Record`]s: a bag of field
//! names mapped to [`Value`]s. The field descriptor, not the value, decides
//! how a value is put on the wire.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::btree_map;
use std::collections::BTreeMap;

/// A lookup value pointing at a record in another entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LookupValue {
    /// Logical name of the target entity.
    pub entity_name: String,
    /// Identifier of the target record.
    pub id: String,
}

impl LookupValue {
    /// Creates a new lookup value.
    pub fn new(entity_name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            entity_name: entity_name.into(),
            id: id.into(),
        }
    }

    /// Returns true if both the entity name and the identifier are non-empty.
    pub fn is_complete(&self) -> bool {
        !self.entity_name.is_empty() && !self.id.is_empty()
    }
}

/// A canonical (caller-facing) field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    /// No value. Clears the remote field unless an update policy says otherwise.
    Null,
    /// Text. Choice fields use the option label.
    Text(String),
    /// Whole number.
    Integer(i64),
    /// Floating point number.
    Number(f64),
    /// Exact decimal. Monetary fields use this.
    Decimal(Decimal),
    /// Boolean.
    Bool(bool),
    /// Point in time (UTC).
    DateTime(DateTime<Utc>),
    /// Lookup to another record.
    Reference(LookupValue),
}

impl Value {
    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Check if this value is an empty text string.
    pub fn is_empty_text(&self) -> bool {
        matches!(self, Value::Text(s) if s.is_empty())
    }

    /// Get this value as a string, if it is text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Get this value as an integer, if it is one.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Get this value as a float, if it is one.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Get this value as a decimal, if it is one.
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Value::Decimal(d) => Some(*d),
            _ => None,
        }
    }

    /// Get this value as a boolean, if it is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get this value as a timestamp, if it is one.
    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::DateTime(t) => Some(*t),
            _ => None,
        }
    }

    /// Get this value as a lookup, if it is one.
    pub fn as_reference(&self) -> Option<&LookupValue> {
        match self {
            Value::Reference(r) => Some(r),
            _ => None,
        }
    }

    /// Short name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Text(_) => "text",
            Value::Integer(_) => "integer",
            Value::Number(_) => "number",
            Value::Decimal(_) => "decimal",
            Value::Bool(_) => "bool",
            Value::DateTime(_) => "datetime",
            Value::Reference(_) => "reference",
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(i64::from(n))
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<Decimal> for Value {
    fn from(d: Decimal) -> Self {
        Value::Decimal(d)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(t: DateTime<Utc>) -> Self {
        Value::DateTime(t)
    }
}

impl From<LookupValue> for Value {
    fn from(r: LookupValue) -> Self {
        Value::Reference(r)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// A runtime bag of field values keyed by field name.
///
/// Records are the input and output of every CRUD operation. They are not
/// persisted by xrmlink.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, Value>,
}

impl Record {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field and returns the record (builder style).
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Sets a field, returning the previous value if any.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(name.into(), value.into())
    }

    /// Gets a field value.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Removes a field.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.fields.remove(name)
    }

    /// Returns true if the field is present (even when null).
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Number of fields present.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if no fields are present.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates over fields in name order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.fields.iter()
    }

    /// Iterates over field names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl IntoIterator for Record {
    type Item = (String, Value);
    type IntoIter = btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

impl<'a> IntoIterator for &'a Record {
    type Item = (&'a String, &'a Value);
    type IntoIter = btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_completeness() {
        assert!(LookupValue::new("account", "abc").is_complete());
        assert!(!LookupValue::new("", "abc").is_complete());
        assert!(!LookupValue::new("account", "").is_complete());
    }

    #[test]
    fn value_accessors() {
        assert!(Value::Null.is_null());
        assert!(!Value::Bool(false).is_null());

        assert!(Value::Text(String::new()).is_empty_text());
        assert!(!Value::Text("x".into()).is_empty_text());
        assert!(!Value::Null.is_empty_text());

        assert_eq!(Value::Text("hello".into()).as_text(), Some("hello"));
        assert_eq!(Value::Integer(42).as_integer(), Some(42));
        assert_eq!(Value::Integer(42).as_bool(), None);
        assert_eq!(Value::Decimal(Decimal::new(1050, 2)).as_decimal(), Some(Decimal::new(1050, 2)));
        assert_eq!(Value::Reference(LookupValue::new("a", "b")).kind(), "reference");
    }

    #[test]
    fn from_impls() {
        assert_eq!(Value::from(true), Value::Bool(true));
        assert_eq!(Value::from(7i32), Value::Integer(7));
        assert_eq!(Value::from("x"), Value::Text("x".to_string()));
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some(3i64)), Value::Integer(3));
    }

    #[test]
    fn record_builder_and_lookup() {
        let record = Record::new()
            .with("lastname", "Smith")
            .with("statuscode", "Active")
            .with("birthdate", Value::Null);

        assert_eq!(record.len(), 3);
        assert_eq!(record.get("lastname"), Some(&Value::Text("Smith".into())));
        assert!(record.contains("birthdate"));
        assert!(!record.contains("firstname"));

        let names: Vec<&str> = record.names().collect();
        assert_eq!(names, vec!["birthdate", "lastname", "statuscode"]);
    }

    #[test]
    fn record_serde_is_a_plain_map() {
        let record = Record::new().with("lastname", "Smith");
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"lastname":{"type":"text","value":"Smith"}}"#);

        let back: Record = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
