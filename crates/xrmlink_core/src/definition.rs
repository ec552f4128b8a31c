//! Entity definitions.

use crate::catalog::FieldDescriptorCatalog;
use crate::ids::{ConnectionId, DefinitionId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A remote entity bound to one connection, with its synchronized catalog.
///
/// (connection, entity name) pairs are unique within a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityDefinition {
    id: DefinitionId,
    connection_id: ConnectionId,
    entity_name: String,
    display_name: String,
    catalog: FieldDescriptorCatalog,
    synced_at: DateTime<Utc>,
}

impl EntityDefinition {
    /// Creates a definition with a freshly built catalog.
    pub fn new(
        id: DefinitionId,
        connection_id: ConnectionId,
        display_name: impl Into<String>,
        catalog: FieldDescriptorCatalog,
    ) -> Self {
        Self {
            id,
            connection_id,
            entity_name: catalog.entity_name().to_string(),
            display_name: display_name.into(),
            catalog,
            synced_at: Utc::now(),
        }
    }

    /// Definition ID.
    pub fn id(&self) -> DefinitionId {
        self.id
    }

    /// Connection this definition is bound to.
    pub fn connection_id(&self) -> ConnectionId {
        self.connection_id
    }

    /// Logical name of the remote entity.
    pub fn entity_name(&self) -> &str {
        &self.entity_name
    }

    /// Display name of the remote entity.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Field catalog.
    pub fn catalog(&self) -> &FieldDescriptorCatalog {
        &self.catalog
    }

    /// When the catalog was last built.
    pub fn synced_at(&self) -> DateTime<Utc> {
        self.synced_at
    }
}
