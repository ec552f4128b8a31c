//! Field descriptors.
//!
//! A [`FieldDescriptor`] is produced by schema synchronization and tells the
//! codec how to move one field between the canonical and wire models.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a field's value is mapped to and from the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    /// Monetary amount: decimal locally, money wrapper on the wire.
    Money,
    /// Choice: option label locally, integer code on the wire.
    Choice,
    /// Lookup: (entity, id) pair locally, entity reference on the wire.
    Reference,
    /// Unique identifier. Never updatable.
    Identifier,
    /// Everything else passes through unchanged.
    Scalar,
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldType::Money => "money",
            FieldType::Choice => "choice",
            FieldType::Reference => "reference",
            FieldType::Identifier => "identifier",
            FieldType::Scalar => "scalar",
        };
        f.write_str(name)
    }
}

/// The canonical value type a field surfaces to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    /// Text (string, memo, and choice labels).
    Text,
    /// Whole number.
    Integer,
    /// Floating point number.
    Number,
    /// Exact decimal.
    Decimal,
    /// Boolean.
    Bool,
    /// Timestamp.
    DateTime,
    /// Unique identifier, surfaced as text.
    Identifier,
    /// Lookup pair.
    Reference,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueType::Text => "text",
            ValueType::Integer => "integer",
            ValueType::Number => "number",
            ValueType::Decimal => "decimal",
            ValueType::Bool => "bool",
            ValueType::DateTime => "datetime",
            ValueType::Identifier => "identifier",
            ValueType::Reference => "reference",
        };
        f.write_str(name)
    }
}

/// One labeled option of a choice field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OptionEntry {
    /// Display label.
    pub label: String,
    /// Integer code sent on the wire.
    pub code: i32,
}

impl OptionEntry {
    /// Creates an option entry.
    pub fn new(label: impl Into<String>, code: i32) -> Self {
        Self {
            label: label.into(),
            code,
        }
    }
}

/// Ordered (label, code) pairs for a choice field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionSet {
    entries: Vec<OptionEntry>,
}

impl OptionSet {
    /// Creates an option set from entries, keeping their order.
    pub fn new(entries: Vec<OptionEntry>) -> Self {
        Self { entries }
    }

    /// Creates an option set from (label, code) pairs.
    pub fn from_pairs<L: Into<String>>(pairs: impl IntoIterator<Item = (L, i32)>) -> Self {
        Self {
            entries: pairs
                .into_iter()
                .map(|(label, code)| OptionEntry::new(label, code))
                .collect(),
        }
    }

    /// Code of the entry whose label matches exactly.
    pub fn code_for(&self, label: &str) -> Option<i32> {
        self.entries
            .iter()
            .find(|e| e.label == label)
            .map(|e| e.code)
    }

    /// Label of the entry with the given code.
    pub fn label_for(&self, code: i32) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.code == code)
            .map(|e| e.label.as_str())
    }

    /// Returns true if an entry has the given code.
    pub fn contains_code(&self, code: i32) -> bool {
        self.entries.iter().any(|e| e.code == code)
    }

    /// Iterates over labels in order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.label.as_str())
    }

    /// Iterates over entries in order.
    pub fn iter(&self) -> std::slice::Iter<'_, OptionEntry> {
        self.entries.iter()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Describes one field of a remote entity.
///
/// Identifier fields are never updatable; [`FieldDescriptor::updatable`]
/// enforces that regardless of what the remote metadata claimed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    name: String,
    display_name: String,
    field_type: FieldType,
    value_type: ValueType,
    required: bool,
    updatable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    option_set: Option<OptionSet>,
}

impl FieldDescriptor {
    /// Creates a descriptor. Fields start optional and not updatable.
    pub fn new(
        name: impl Into<String>,
        display_name: impl Into<String>,
        field_type: FieldType,
        value_type: ValueType,
    ) -> Self {
        Self {
            name: name.into(),
            display_name: display_name.into(),
            field_type,
            value_type,
            required: false,
            updatable: false,
            option_set: None,
        }
    }

    /// Creates a scalar descriptor.
    pub fn scalar(
        name: impl Into<String>,
        display_name: impl Into<String>,
        value_type: ValueType,
    ) -> Self {
        Self::new(name, display_name, FieldType::Scalar, value_type)
    }

    /// Creates a monetary descriptor.
    pub fn money(name: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self::new(name, display_name, FieldType::Money, ValueType::Decimal)
    }

    /// Creates a choice descriptor with its option set.
    pub fn choice(
        name: impl Into<String>,
        display_name: impl Into<String>,
        options: OptionSet,
    ) -> Self {
        Self::new(name, display_name, FieldType::Choice, ValueType::Text).with_options(options)
    }

    /// Creates a lookup descriptor.
    pub fn reference(name: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self::new(name, display_name, FieldType::Reference, ValueType::Reference)
    }

    /// Creates an identifier descriptor.
    pub fn identifier(name: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self::new(name, display_name, FieldType::Identifier, ValueType::Identifier)
    }

    /// Sets the required flag.
    #[must_use]
    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Sets the updatable flag. Ignored for identifier fields.
    #[must_use]
    pub fn with_updatable(mut self, updatable: bool) -> Self {
        self.updatable = updatable && self.field_type != FieldType::Identifier;
        self
    }

    /// Attaches an option set.
    #[must_use]
    pub fn with_options(mut self, options: OptionSet) -> Self {
        self.option_set = Some(options);
        self
    }

    /// Logical (wire) name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Display name.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// How the field is mapped.
    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    /// Canonical value type.
    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    /// Whether create must supply this field.
    pub fn required(&self) -> bool {
        self.required
    }

    /// Whether this field is written by create and update.
    pub fn updatable(&self) -> bool {
        self.updatable && self.field_type != FieldType::Identifier
    }

    /// Option set of a choice field.
    pub fn option_set(&self) -> Option<&OptionSet> {
        self.option_set.as_ref()
    }
}
