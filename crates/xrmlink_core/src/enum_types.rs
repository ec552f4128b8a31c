//! Generated enumeration types for choice fields.
//!
//! Every choice field of a definition gets one enumeration type, named
//! `<entity>_<attribute>` in the connection's namespace. Hosts use these
//! as the selectable values of a choice; the executor uses them to resolve
//! a member name back to its label.

use crate::ids::{ConnectionId, DefinitionId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use xrmlink_codec::OptionSet;

/// Prefix of every generated namespace.
pub const NAMESPACE_PREFIX: &str = "xrmlink";

/// Fully qualified name of a generated enumeration type.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EnumTypeName {
    /// Namespace, `xrmlink.crm_<connection id without dashes>`.
    pub namespace: String,
    /// Type name, `<entity>_<attribute>`.
    pub name: String,
}

impl EnumTypeName {
    /// Name of the type generated for one choice field.
    pub fn for_field(connection: ConnectionId, entity_name: &str, field_name: &str) -> Self {
        Self {
            namespace: connection_namespace(connection),
            name: format!("{entity_name}_{field_name}"),
        }
    }
}

impl fmt::Display for EnumTypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.namespace, self.name)
    }
}

/// Namespace of the types generated through one connection.
pub fn connection_namespace(connection: ConnectionId) -> String {
    format!("{NAMESPACE_PREFIX}.crm_{}", connection.compact())
}

/// Strips quote characters from an option label.
pub fn clean_label(label: &str) -> String {
    label.chars().filter(|c| *c != '"').collect()
}

/// Turns an option label into a member name: quotes and whitespace removed.
pub fn member_name(label: &str) -> String {
    label
        .chars()
        .filter(|c| *c != '"' && !c.is_whitespace())
        .collect()
}

/// One member of an enumeration type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumMember {
    /// Identifier-form name.
    pub name: String,
    /// Display label; matches the option set entry.
    pub label: String,
    /// Option code.
    pub code: i32,
}

/// An enumeration type generated for one choice field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumType {
    type_name: EnumTypeName,
    owner: DefinitionId,
    members: Vec<EnumMember>,
}

impl EnumType {
    /// Builds a type from a field's option set.
    pub fn from_options(type_name: EnumTypeName, owner: DefinitionId, options: &OptionSet) -> Self {
        let members = options
            .iter()
            .map(|o| EnumMember {
                name: member_name(&o.label),
                label: o.label.clone(),
                code: o.code,
            })
            .collect();
        Self {
            type_name,
            owner,
            members,
        }
    }

    /// Fully qualified name.
    pub fn type_name(&self) -> &EnumTypeName {
        &self.type_name
    }

    /// Definition that produced this type.
    pub fn owner(&self) -> DefinitionId {
        self.owner
    }

    /// Members, in option order.
    pub fn members(&self) -> &[EnumMember] {
        &self.members
    }

    /// Finds a member by name, ignoring case.
    pub fn member(&self, name: &str) -> Option<&EnumMember> {
        self.members
            .iter()
            .find(|m| m.name.eq_ignore_ascii_case(name))
    }

    /// Member labels, in order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(|m| m.label.as_str())
    }
}

/// Every generated enumeration type, keyed by qualified name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnumTypeRegistry {
    types: BTreeMap<EnumTypeName, EnumType>,
}

impl EnumTypeRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets a type by name.
    pub fn get(&self, name: &EnumTypeName) -> Option<&EnumType> {
        self.types.get(name)
    }

    /// Adds a type, or replaces the value list of an existing one.
    /// Returns the previous type.
    pub fn upsert(&mut self, enum_type: EnumType) -> Option<EnumType> {
        self.types.insert(enum_type.type_name.clone(), enum_type)
    }

    /// Removes a type.
    pub fn remove(&mut self, name: &EnumTypeName) -> Option<EnumType> {
        self.types.remove(name)
    }

    /// Removes every type produced by a definition.
    pub fn remove_owned_by(&mut self, owner: DefinitionId) -> Vec<EnumType> {
        let names: Vec<EnumTypeName> = self
            .types
            .values()
            .filter(|t| t.owner == owner)
            .map(|t| t.type_name.clone())
            .collect();
        names.iter().filter_map(|n| self.types.remove(n)).collect()
    }

    /// Types produced by a definition.
    pub fn owned_by(&self, owner: DefinitionId) -> impl Iterator<Item = &EnumType> {
        self.types.values().filter(move |t| t.owner == owner)
    }

    /// Iterates over all types in name order.
    pub fn iter(&self) -> impl Iterator<Item = &EnumType> {
        self.types.values()
    }

    /// Number of types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns true if there are no types.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl FromIterator<EnumType> for EnumTypeRegistry {
    fn from_iter<I: IntoIterator<Item = EnumType>>(iter: I) -> Self {
        let mut registry = Self::new();
        for t in iter {
            registry.upsert(t);
        }
        registry
    }
}
