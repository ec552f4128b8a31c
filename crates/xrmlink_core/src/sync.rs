//! Schema synchronization.
//!
//! Builds a definition's field catalog from the live remote schema and keeps
//! the generated enumeration types in step with it. The build is pure; the
//! result is committed to the store in one step, so a failed sync leaves the
//! previous catalog and enumeration types untouched.

use crate::catalog::FieldDescriptorCatalog;
use crate::connector::ServiceConnector;
use crate::definition::EntityDefinition;
use crate::enum_types::{clean_label, EnumType, EnumTypeName};
use crate::error::{CoreError, CoreResult};
use crate::ids::{ConnectionId, DefinitionId};
use crate::store::DefinitionStore;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};
use xrmlink_codec::{FieldDescriptor, FieldType, OptionEntry, OptionSet, ValueType};
use xrmlink_service::{AttributeMetadata, AttributeTypeCode, EntityMetadata};

/// Maps a remote attribute type to how xrmlink handles it.
///
/// Returns `None` for types xrmlink does not map; such attributes are left
/// out of the catalog.
pub fn map_attribute_type(code: AttributeTypeCode) -> Option<(FieldType, ValueType)> {
    use AttributeTypeCode as A;
    Some(match code {
        A::Money => (FieldType::Money, ValueType::Decimal),
        A::Picklist => (FieldType::Choice, ValueType::Text),
        A::Customer | A::Lookup => (FieldType::Reference, ValueType::Reference),
        A::Uniqueidentifier => (FieldType::Identifier, ValueType::Identifier),
        A::Boolean => (FieldType::Scalar, ValueType::Bool),
        A::DateTime => (FieldType::Scalar, ValueType::DateTime),
        A::Integer | A::BigInt => (FieldType::Scalar, ValueType::Integer),
        A::Double => (FieldType::Scalar, ValueType::Number),
        A::Decimal => (FieldType::Scalar, ValueType::Decimal),
        A::String | A::Memo => (FieldType::Scalar, ValueType::Text),
        A::Owner
        | A::PartyList
        | A::State
        | A::Status
        | A::Virtual
        | A::EntityName
        | A::CalendarRules
        | A::ManagedProperty => return None,
    })
}

/// Display name of a field: the remote label or the logical name, with
/// backslashes removed.
pub fn field_display_name(attribute: &AttributeMetadata) -> String {
    attribute
        .display_name
        .as_deref()
        .filter(|s| !s.is_empty())
        .unwrap_or(&attribute.logical_name)
        .replace('\\', "")
}

/// A built catalog and the enumeration types of its choice fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogBuild {
    /// The catalog.
    pub catalog: FieldDescriptorCatalog,
    /// One enumeration type per choice field.
    pub enum_types: Vec<EnumType>,
}

/// Builds a catalog from remote entity metadata.
///
/// Only attributes valid for create are kept, and of those only the ones
/// whose type maps.
pub fn build_catalog(
    connection: ConnectionId,
    owner: DefinitionId,
    metadata: &EntityMetadata,
) -> CatalogBuild {
    let entity_name = metadata.logical_name.as_str();
    let mut fields = Vec::new();
    let mut enum_types = Vec::new();

    for attribute in metadata.attributes.iter().filter(|a| a.valid_for_create()) {
        let Some((mut field_type, mut value_type)) = map_attribute_type(attribute.attribute_type)
        else {
            debug!(
                entity = entity_name,
                attribute = %attribute.logical_name,
                attribute_type = ?attribute.attribute_type,
                "attribute type not mapped; skipping"
            );
            continue;
        };
        if attribute.is_primary_id {
            field_type = FieldType::Identifier;
            value_type = ValueType::Identifier;
        }

        let mut field = FieldDescriptor::new(
            attribute.logical_name.clone(),
            field_display_name(attribute),
            field_type,
            value_type,
        )
        .with_required(attribute.required_level.is_required())
        .with_updatable(attribute.valid_for_update());

        if field_type == FieldType::Choice {
            let options = OptionSet::new(
                attribute
                    .options
                    .iter()
                    .map(|o| {
                        let label = o
                            .label
                            .as_deref()
                            .map_or_else(|| o.value.to_string(), clean_label);
                        OptionEntry::new(label, o.value)
                    })
                    .collect(),
            );
            enum_types.push(EnumType::from_options(
                EnumTypeName::for_field(connection, entity_name, &attribute.logical_name),
                owner,
                &options,
            ));
            field = field.with_options(options);
        }

        fields.push(field);
    }

    CatalogBuild {
        catalog: FieldDescriptorCatalog::new(entity_name, fields),
        enum_types,
    }
}

/// Builds and refreshes entity definitions from the remote schema.
pub struct SchemaSynchronizer {
    store: Arc<DefinitionStore>,
    connector: Arc<dyn ServiceConnector>,
}

impl SchemaSynchronizer {
    /// Creates a synchronizer.
    pub fn new(store: Arc<DefinitionStore>, connector: Arc<dyn ServiceConnector>) -> Self {
        Self { store, connector }
    }

    /// Creates a definition for an entity picked from a connection's entity
    /// list, given as `"Display Name (logical_name)"`.
    ///
    /// # Errors
    ///
    /// Fails if the connection is unknown, the choice is not in its list,
    /// the entity is already defined for the connection (checked before any
    /// remote call), or the remote describe fails.
    pub fn save_definition(&self, connection: ConnectionId, choice: &str) -> CoreResult<DefinitionId> {
        let conn = self
            .store
            .connection(connection)
            .ok_or_else(|| CoreError::connection_not_found(connection))?;
        let entity = conn
            .resolve_choice(choice)
            .ok_or(CoreError::UnknownEntityChoice)?;
        let entity_name = entity.logical_name.clone();

        if self.store.find_definition(connection, &entity_name).is_some() {
            return Err(CoreError::DuplicateEntity);
        }

        let lock = self.store.sync_lock(connection, &entity_name);
        let _guard = lock.lock();
        if self.store.find_definition(connection, &entity_name).is_some() {
            return Err(CoreError::DuplicateEntity);
        }

        let id = DefinitionId::new();
        self.synchronize(id, connection, &entity_name, true)?;
        Ok(id)
    }

    /// Rebuilds a stored definition's catalog from the remote schema.
    ///
    /// # Errors
    ///
    /// Fails if the definition or its connection is unknown, or the remote
    /// describe fails. The previous catalog stays in place on failure.
    pub fn regenerate(&self, id: DefinitionId) -> CoreResult<()> {
        let definition = self
            .store
            .definition(id)
            .ok_or_else(|| CoreError::definition_not_found(id))?;

        let lock = self
            .store
            .sync_lock(definition.connection_id(), definition.entity_name());
        let _guard = lock.lock();
        self.synchronize(id, definition.connection_id(), definition.entity_name(), false)
    }

    fn synchronize(
        &self,
        id: DefinitionId,
        connection: ConnectionId,
        entity_name: &str,
        is_new: bool,
    ) -> CoreResult<()> {
        let conn = self
            .store
            .connection(connection)
            .ok_or_else(|| CoreError::connection_not_found(connection))?;

        info!(connection = %conn, entity = entity_name, "synchronizing entity schema");
        let service = self.connector.connect(&conn)?;
        let metadata = service.describe_entity(entity_name)?;

        let build = build_catalog(connection, id, &metadata);
        if let Some(previous) = self.store.definition(id) {
            debug!(catalog = %previous.catalog().describe(), "catalog before synchronization");
        }
        debug!(catalog = %build.catalog.describe(), "catalog after synchronization");

        for enum_type in &build.enum_types {
            match self.store.enum_type(enum_type.type_name()) {
                None => debug!(enum_type = %enum_type.type_name(), "creating enum type"),
                Some(previous) => {
                    for label in previous.labels() {
                        if !enum_type.labels().any(|l| l == label) {
                            warn!(
                                enum_type = %enum_type.type_name(),
                                label,
                                "option no longer offered by the remote schema; dropping it"
                            );
                        }
                    }
                }
            }
        }

        let display_name = metadata
            .display_name
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(&metadata.logical_name)
            .to_string();
        let fields = build.catalog.len();
        let definition = EntityDefinition::new(id, connection, display_name, build.catalog);
        self.store
            .commit_definition(definition, build.enum_types, is_new)?;

        info!(entity = entity_name, fields, "entity schema synchronized");
        Ok(())
    }
}

impl fmt::Debug for SchemaSynchronizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaSynchronizer")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xrmlink_service::RequiredLevel;

    fn contact() -> EntityMetadata {
        EntityMetadata::new("contact")
            .with_display_name("Contact")
            .with_attribute(
                AttributeMetadata::new("contactid", AttributeTypeCode::Uniqueidentifier)
                    .primary_id(),
            )
            .with_attribute(
                AttributeMetadata::new("lastname", AttributeTypeCode::String)
                    .with_display_name("Last Name")
                    .with_required_level(RequiredLevel::ApplicationRequired),
            )
            .with_attribute(
                AttributeMetadata::new("statuscode", AttributeTypeCode::Picklist)
                    .with_display_name("Status\\Reason")
                    .with_option("Active", 1)
                    .with_option("\"Inactive\"", 2),
            )
            .with_attribute(
                AttributeMetadata::new("createdon", AttributeTypeCode::DateTime)
                    .with_valid_for_create(false),
            )
            .with_attribute(AttributeMetadata::new("ownerid", AttributeTypeCode::Owner))
    }

    #[test]
    fn type_mapping() {
        assert_eq!(
            map_attribute_type(AttributeTypeCode::Money),
            Some((FieldType::Money, ValueType::Decimal))
        );
        assert_eq!(
            map_attribute_type(AttributeTypeCode::Customer),
            Some((FieldType::Reference, ValueType::Reference))
        );
        assert_eq!(
            map_attribute_type(AttributeTypeCode::BigInt),
            Some((FieldType::Scalar, ValueType::Integer))
        );
        assert_eq!(map_attribute_type(AttributeTypeCode::State), None);
    }

    #[test]
    fn build_filters_and_maps() {
        let build = build_catalog(ConnectionId::new(), DefinitionId::new(), &contact());
        let names: Vec<&str> = build.catalog.fields().iter().map(FieldDescriptor::name).collect();
        assert_eq!(names, vec!["contactid", "lastname", "statuscode"]);

        let id = build.catalog.field("contactid").unwrap();
        assert_eq!(id.field_type(), FieldType::Identifier);
        assert!(!id.updatable());

        let lastname = build.catalog.field("lastname").unwrap();
        assert!(lastname.required());
        assert!(lastname.updatable());
    }

    #[test]
    fn choice_fields_get_options_and_enum_types() {
        let connection = ConnectionId::new();
        let owner = DefinitionId::new();
        let build = build_catalog(connection, owner, &contact());

        let status = build.catalog.field("statuscode").unwrap();
        assert_eq!(status.display_name(), "StatusReason");
        let options = status.option_set().unwrap();
        assert_eq!(options.code_for("Inactive"), Some(2));

        assert_eq!(build.enum_types.len(), 1);
        let enum_type = &build.enum_types[0];
        assert_eq!(
            enum_type.type_name(),
            &EnumTypeName::for_field(connection, "contact", "statuscode")
        );
        assert_eq!(enum_type.owner(), owner);
        assert_eq!(enum_type.labels().collect::<Vec<_>>(), vec!["Active", "Inactive"]);
    }

    #[test]
    fn display_name_falls_back_to_logical_name() {
        let attr = AttributeMetadata::new("new_code", AttributeTypeCode::String);
        assert_eq!(field_display_name(&attr), "new_code");
    }

    #[test]
    fn missing_option_label_uses_code() {
        let mut attr = AttributeMetadata::new("prioritycode", AttributeTypeCode::Picklist);
        attr.options.push(xrmlink_service::OptionMetadata {
            value: 7,
            label: None,
        });
        let metadata = EntityMetadata::new("incident").with_attribute(attr);

        let build = build_catalog(ConnectionId::new(), DefinitionId::new(), &metadata);
        assert_eq!(build.catalog.option_set("prioritycode").unwrap().code_for("7"), Some(7));
    }
}
