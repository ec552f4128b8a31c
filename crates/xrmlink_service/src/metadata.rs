//! Remote entity metadata, as returned by the describe and list calls.

use serde::{Deserialize, Serialize};

/// Attribute type as declared by the remote service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttributeTypeCode {
    /// 64-bit integer.
    BigInt,
    /// Two-option boolean.
    Boolean,
    /// Lookup to an account or contact.
    Customer,
    /// Date and time.
    DateTime,
    /// Exact decimal.
    Decimal,
    /// Floating point.
    Double,
    /// 32-bit integer.
    Integer,
    /// Lookup to one entity.
    Lookup,
    /// Long text.
    Memo,
    /// Monetary amount.
    Money,
    /// Owning user or team.
    Owner,
    /// Activity party list.
    PartyList,
    /// Option set.
    Picklist,
    /// Record state.
    State,
    /// Record status reason.
    Status,
    /// Text.
    String,
    /// Unique identifier.
    Uniqueidentifier,
    /// Computed attribute with no storage.
    Virtual,
    /// Entity name.
    EntityName,
    /// Calendar rules.
    CalendarRules,
    /// Managed property.
    ManagedProperty,
}

/// How strongly the remote service requires an attribute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequiredLevel {
    /// Optional.
    #[default]
    None,
    /// Recommended but optional.
    Recommended,
    /// Required by the application.
    ApplicationRequired,
    /// Required by the system.
    SystemRequired,
}

impl RequiredLevel {
    /// Returns true for application- and system-required levels.
    pub fn is_required(self) -> bool {
        matches!(
            self,
            RequiredLevel::ApplicationRequired | RequiredLevel::SystemRequired
        )
    }
}

/// One option of a picklist attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionMetadata {
    /// The numeric code.
    pub value: i32,
    /// The localized label, if any.
    #[serde(default)]
    pub label: Option<String>,
}

/// Metadata of one attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeMetadata {
    /// Logical name.
    pub logical_name: String,
    /// First localized display label, if any.
    #[serde(default)]
    pub display_name: Option<String>,
    /// Declared type.
    pub attribute_type: AttributeTypeCode,
    /// Required level.
    #[serde(default)]
    pub required_level: RequiredLevel,
    /// Whether the attribute can be set on create.
    #[serde(default)]
    pub is_valid_for_create: Option<bool>,
    /// Whether the attribute can be set on update.
    #[serde(default)]
    pub is_valid_for_update: Option<bool>,
    /// Whether this is the entity's primary identifier.
    #[serde(default)]
    pub is_primary_id: bool,
    /// Options of a picklist attribute, in remote order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<OptionMetadata>,
}

impl AttributeMetadata {
    /// Creates attribute metadata valid for create and update.
    pub fn new(logical_name: impl Into<String>, attribute_type: AttributeTypeCode) -> Self {
        Self {
            logical_name: logical_name.into(),
            display_name: None,
            attribute_type,
            required_level: RequiredLevel::None,
            is_valid_for_create: Some(true),
            is_valid_for_update: Some(true),
            is_primary_id: false,
            options: Vec::new(),
        }
    }

    /// Sets the display label.
    #[must_use]
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    /// Sets the required level.
    #[must_use]
    pub fn with_required_level(mut self, level: RequiredLevel) -> Self {
        self.required_level = level;
        self
    }

    /// Sets the valid-for-create flag.
    #[must_use]
    pub fn with_valid_for_create(mut self, valid: bool) -> Self {
        self.is_valid_for_create = Some(valid);
        self
    }

    /// Sets the valid-for-update flag.
    #[must_use]
    pub fn with_valid_for_update(mut self, valid: bool) -> Self {
        self.is_valid_for_update = Some(valid);
        self
    }

    /// Marks this attribute as the primary identifier.
    #[must_use]
    pub fn primary_id(mut self) -> Self {
        self.is_primary_id = true;
        self
    }

    /// Appends a picklist option.
    #[must_use]
    pub fn with_option(mut self, label: impl Into<String>, value: i32) -> Self {
        self.options.push(OptionMetadata {
            value,
            label: Some(label.into()),
        });
        self
    }

    /// Returns true if the attribute can be set on create.
    pub fn valid_for_create(&self) -> bool {
        self.is_valid_for_create == Some(true)
    }

    /// Returns true if the attribute can be set on update.
    pub fn valid_for_update(&self) -> bool {
        self.is_valid_for_update == Some(true)
    }
}

/// Metadata of one entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMetadata {
    /// Logical name.
    pub logical_name: String,
    /// First localized display label, if any.
    #[serde(default)]
    pub display_name: Option<String>,
    /// Logical name of the primary identifier attribute.
    #[serde(default)]
    pub primary_id_attribute: Option<String>,
    /// Attributes, in remote order.
    #[serde(default)]
    pub attributes: Vec<AttributeMetadata>,
}

impl EntityMetadata {
    /// Creates entity metadata with no attributes.
    pub fn new(logical_name: impl Into<String>) -> Self {
        Self {
            logical_name: logical_name.into(),
            display_name: None,
            primary_id_attribute: None,
            attributes: Vec::new(),
        }
    }

    /// Sets the display label.
    #[must_use]
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    /// Appends an attribute. A primary-id attribute also becomes the
    /// entity's primary identifier.
    #[must_use]
    pub fn with_attribute(mut self, attribute: AttributeMetadata) -> Self {
        if attribute.is_primary_id {
            self.primary_id_attribute = Some(attribute.logical_name.clone());
        }
        self.attributes.push(attribute);
        self
    }

    /// Finds an attribute by logical name.
    pub fn attribute(&self, logical_name: &str) -> Option<&AttributeMetadata> {
        self.attributes
            .iter()
            .find(|a| a.logical_name == logical_name)
    }

    /// Finds an attribute by logical name for modification.
    pub fn attribute_mut(&mut self, logical_name: &str) -> Option<&mut AttributeMetadata> {
        self.attributes
            .iter_mut()
            .find(|a| a.logical_name == logical_name)
    }

    /// Returns the summary used in entity lists.
    pub fn summary(&self) -> EntitySummary {
        EntitySummary {
            logical_name: self.logical_name.clone(),
            display_name: self.display_name.clone(),
        }
    }
}

/// An entry of the remote entity list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntitySummary {
    /// Logical name.
    pub logical_name: String,
    /// First localized display label, if any.
    #[serde(default)]
    pub display_name: Option<String>,
}

impl EntitySummary {
    /// Creates a summary.
    pub fn new(logical_name: impl Into<String>, display_name: Option<String>) -> Self {
        Self {
            logical_name: logical_name.into(),
            display_name,
        }
    }

    /// The display label, falling back to the logical name.
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(&self.logical_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_levels() {
        assert!(RequiredLevel::ApplicationRequired.is_required());
        assert!(RequiredLevel::SystemRequired.is_required());
        assert!(!RequiredLevel::Recommended.is_required());
        assert!(!RequiredLevel::None.is_required());
    }

    #[test]
    fn primary_id_is_tracked() {
        let entity = EntityMetadata::new("contact")
            .with_attribute(AttributeMetadata::new("contactid", AttributeTypeCode::Uniqueidentifier).primary_id())
            .with_attribute(AttributeMetadata::new("lastname", AttributeTypeCode::String));
        assert_eq!(entity.primary_id_attribute.as_deref(), Some("contactid"));
        assert!(entity.attribute("lastname").is_some());
    }

    #[test]
    fn missing_flags_are_not_valid() {
        let json = r#"{"logical_name":"createdon","attribute_type":"DateTime"}"#;
        let attr: AttributeMetadata = serde_json::from_str(json).unwrap();
        assert!(!attr.valid_for_create());
        assert!(!attr.valid_for_update());
        assert_eq!(attr.required_level, RequiredLevel::None);
    }

    #[test]
    fn summary_label_falls_back() {
        assert_eq!(EntitySummary::new("contact", Some("Contact".into())).label(), "Contact");
        assert_eq!(EntitySummary::new("new_widget", None).label(), "new_widget");
        assert_eq!(EntitySummary::new("new_widget", Some(String::new())).label(), "new_widget");
    }
}
