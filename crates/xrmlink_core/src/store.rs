//! Configuration store for connections, definitions and enumeration types.
//!
//! All state lives behind one lock, so a definition and the enumeration
//! types it produced are always replaced together. Snapshots are written to
//! a temporary file and renamed into place; a failed write leaves the
//! previous snapshot authoritative.

use crate::config::StoreConfig;
use crate::connection::{Connection, ConnectionSettings};
use crate::connector::ServiceConnector;
use crate::definition::EntityDefinition;
use crate::enum_types::{EnumType, EnumTypeName, EnumTypeRegistry};
use crate::error::{CoreError, CoreResult};
use crate::ids::{ConnectionId, DefinitionId};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};
use xrmlink_service::EntitySummary;

/// Snapshot format version.
pub const SNAPSHOT_FORMAT_VERSION: u16 = 1;

#[derive(Debug, Default)]
struct StoreState {
    connections: BTreeMap<ConnectionId, Connection>,
    definitions: BTreeMap<DefinitionId, EntityDefinition>,
    enum_types: EnumTypeRegistry,
}

impl StoreState {
    fn find_definition(&self, connection: ConnectionId, entity_name: &str) -> Option<&EntityDefinition> {
        self.definitions
            .values()
            .find(|d| d.connection_id() == connection && d.entity_name() == entity_name)
    }

    fn name_taken(&self, id: ConnectionId, name: &str) -> bool {
        self.connections
            .values()
            .any(|c| c.id() != id && c.name() == name)
    }
}

#[derive(Serialize, Deserialize)]
struct StoreSnapshot {
    format_version: u16,
    connections: Vec<Connection>,
    definitions: Vec<EntityDefinition>,
    enum_types: Vec<EnumType>,
}

/// Outcome of refreshing every connection's entity list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshReport {
    /// Connections whose list was refreshed.
    pub refreshed: Vec<ConnectionId>,
    /// Connections that failed, with the error message. Their lists are
    /// now empty.
    pub failed: Vec<(ConnectionId, String)>,
}

/// Holds connections, entity definitions and generated enumeration types.
pub struct DefinitionStore {
    config: StoreConfig,
    state: RwLock<StoreState>,
    sync_locks: Mutex<HashMap<(ConnectionId, String), Arc<Mutex<()>>>>,
}

impl DefinitionStore {
    /// Creates an empty store that is never persisted.
    pub fn in_memory() -> Self {
        Self::with_state(StoreConfig::new(), StoreState::default())
    }

    /// Opens a store, loading the configured snapshot if it exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be read, or it is missing and
    /// `create_if_missing` is false.
    pub fn open(config: StoreConfig) -> CoreResult<Self> {
        let state = match &config.snapshot_path {
            Some(path) if path.exists() => read_snapshot(path)?,
            Some(path) if !config.create_if_missing => {
                return Err(CoreError::snapshot(format!(
                    "{} does not exist",
                    path.display()
                )));
            }
            _ => StoreState::default(),
        };
        Ok(Self::with_state(config, state))
    }

    fn with_state(config: StoreConfig, state: StoreState) -> Self {
        Self {
            config,
            state: RwLock::new(state),
            sync_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the store configuration.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    // ---- connections ----

    /// Saves a new or edited connection and refreshes its entity list.
    ///
    /// A new connection is created when `id` is `None`. An empty credential
    /// on an existing connection keeps the stored one. Any cached service
    /// handle for the connection is invalidated first.
    ///
    /// # Errors
    ///
    /// Fails if another connection has the same name, or the entity list
    /// cannot be fetched. In the latter case the stored connection's entity
    /// list is cleared.
    pub fn save_connection(
        &self,
        id: Option<ConnectionId>,
        settings: ConnectionSettings,
        connector: &dyn ServiceConnector,
    ) -> CoreResult<ConnectionId> {
        let id = id.unwrap_or_default();
        let mut connection = Connection::new(id, settings);
        {
            let state = self.state.read();
            if state.name_taken(id, connection.name()) {
                return Err(CoreError::DuplicateConnectionName);
            }
            if let Some(existing) = state.connections.get(&id) {
                if connection.credential().is_empty() {
                    connection.set_credential(existing.credential().clone());
                }
            }
        }

        connector.invalidate(id);
        let entities = self.fetch_entity_list(&connection, connector)?;
        connection.set_entities(entities);

        let mut state = self.state.write();
        if state.name_taken(id, connection.name()) {
            return Err(CoreError::DuplicateConnectionName);
        }
        info!(
            connection = %connection,
            entities = connection.entities().len(),
            "connection saved"
        );
        state.connections.insert(id, connection);
        Ok(id)
    }

    /// Re-fetches one connection's entity list.
    ///
    /// # Errors
    ///
    /// Fails if the connection is unknown or the list cannot be fetched; in
    /// the latter case the cached list is cleared.
    pub fn refresh_entity_list(
        &self,
        id: ConnectionId,
        connector: &dyn ServiceConnector,
    ) -> CoreResult<usize> {
        let connection = self
            .connection(id)
            .ok_or_else(|| CoreError::connection_not_found(id))?;
        let entities = self.fetch_entity_list(&connection, connector)?;
        let count = entities.len();
        if let Some(stored) = self.state.write().connections.get_mut(&id) {
            stored.set_entities(entities);
        }
        Ok(count)
    }

    /// Re-fetches every connection's entity list.
    pub fn refresh_all_entity_lists(&self, connector: &dyn ServiceConnector) -> RefreshReport {
        let mut report = RefreshReport::default();
        for id in self.connection_ids() {
            match self.refresh_entity_list(id, connector) {
                Ok(_) => report.refreshed.push(id),
                Err(e) => {
                    warn!(connection = %id, error = %e, "entity list refresh failed");
                    report.failed.push((id, e.to_string()));
                }
            }
        }
        report
    }

    fn fetch_entity_list(
        &self,
        connection: &Connection,
        connector: &dyn ServiceConnector,
    ) -> CoreResult<Vec<EntitySummary>> {
        let fetched = connector
            .connect(connection)
            .and_then(|service| Ok(service.list_entities()?));
        match fetched {
            Ok(entities) => {
                debug!(connection = %connection, count = entities.len(), "entity list fetched");
                Ok(entities)
            }
            Err(e) => {
                if let Some(stored) = self.state.write().connections.get_mut(&connection.id()) {
                    stored.set_entities(Vec::new());
                }
                Err(e)
            }
        }
    }

    /// Removes a connection that no definition uses.
    ///
    /// # Errors
    ///
    /// Fails if the connection is unknown or still referenced.
    pub fn remove_connection(
        &self,
        id: ConnectionId,
        connector: &dyn ServiceConnector,
    ) -> CoreResult<Connection> {
        let mut state = self.state.write();
        let connection = state
            .connections
            .get(&id)
            .ok_or_else(|| CoreError::connection_not_found(id))?;
        let used_by = state
            .definitions
            .values()
            .filter(|d| d.connection_id() == id)
            .count();
        if used_by > 0 {
            return Err(CoreError::ConnectionInUse {
                name: connection.name().to_string(),
                definitions: used_by,
            });
        }

        let removed = state
            .connections
            .remove(&id)
            .ok_or_else(|| CoreError::connection_not_found(id))?;
        drop(state);
        connector.invalidate(id);
        info!(connection = %removed, "connection removed");
        Ok(removed)
    }

    /// Gets a connection.
    pub fn connection(&self, id: ConnectionId) -> Option<Connection> {
        self.state.read().connections.get(&id).cloned()
    }

    /// Gets a connection by name.
    pub fn connection_by_name(&self, name: &str) -> Option<Connection> {
        self.state
            .read()
            .connections
            .values()
            .find(|c| c.name() == name)
            .cloned()
    }

    /// All connections.
    pub fn connections(&self) -> Vec<Connection> {
        self.state.read().connections.values().cloned().collect()
    }

    fn connection_ids(&self) -> Vec<ConnectionId> {
        self.state.read().connections.keys().copied().collect()
    }

    // ---- definitions ----

    /// Gets a definition.
    pub fn definition(&self, id: DefinitionId) -> Option<EntityDefinition> {
        self.state.read().definitions.get(&id).cloned()
    }

    /// Finds the definition of an entity under a connection.
    pub fn find_definition(
        &self,
        connection: ConnectionId,
        entity_name: &str,
    ) -> Option<EntityDefinition> {
        self.state
            .read()
            .find_definition(connection, entity_name)
            .cloned()
    }

    /// All definitions.
    pub fn definitions(&self) -> Vec<EntityDefinition> {
        self.state.read().definitions.values().cloned().collect()
    }

    /// Definitions bound to a connection.
    pub fn definitions_for(&self, connection: ConnectionId) -> Vec<EntityDefinition> {
        self.state
            .read()
            .definitions
            .values()
            .filter(|d| d.connection_id() == connection)
            .cloned()
            .collect()
    }

    /// Replaces a definition and its enumeration types in one step.
    ///
    /// With `is_new`, the (connection, entity) pair must be unbound; without
    /// it, the definition must still exist. Types the definition owned that
    /// are not in `enum_types` are removed.
    pub(crate) fn commit_definition(
        &self,
        definition: EntityDefinition,
        enum_types: Vec<EnumType>,
        is_new: bool,
    ) -> CoreResult<()> {
        let mut state = self.state.write();
        if !state.connections.contains_key(&definition.connection_id()) {
            return Err(CoreError::connection_not_found(definition.connection_id()));
        }
        if is_new {
            if state
                .find_definition(definition.connection_id(), definition.entity_name())
                .is_some()
            {
                return Err(CoreError::DuplicateEntity);
            }
        } else if !state.definitions.contains_key(&definition.id()) {
            return Err(CoreError::definition_not_found(definition.id()));
        }

        let stale: Vec<EnumTypeName> = state
            .enum_types
            .owned_by(definition.id())
            .map(|t| t.type_name().clone())
            .filter(|n| !enum_types.iter().any(|t| t.type_name() == n))
            .collect();
        for name in &stale {
            debug!(enum_type = %name, "removing enum type");
            state.enum_types.remove(name);
        }
        for enum_type in enum_types {
            state.enum_types.upsert(enum_type);
        }
        state.definitions.insert(definition.id(), definition);
        Ok(())
    }

    /// Removes a definition and every enumeration type it produced.
    ///
    /// # Errors
    ///
    /// Fails if the definition is unknown.
    pub fn remove_definition(&self, id: DefinitionId) -> CoreResult<EntityDefinition> {
        let mut state = self.state.write();
        let definition = state
            .definitions
            .remove(&id)
            .ok_or_else(|| CoreError::definition_not_found(id))?;
        let removed = state.enum_types.remove_owned_by(id);
        drop(state);
        self.prune_sync_lock(definition.connection_id(), definition.entity_name());
        info!(
            entity = definition.entity_name(),
            enum_types = removed.len(),
            "entity definition removed"
        );
        Ok(definition)
    }

    /// Lock serializing synchronization of one (connection, entity) pair.
    pub(crate) fn sync_lock(&self, connection: ConnectionId, entity_name: &str) -> Arc<Mutex<()>> {
        Arc::clone(
            self.sync_locks
                .lock()
                .entry((connection, entity_name.to_string()))
                .or_default(),
        )
    }

    /// Forgets the lock of a pair nobody is synchronizing.
    fn prune_sync_lock(&self, connection: ConnectionId, entity_name: &str) {
        let key = (connection, entity_name.to_string());
        let mut locks = self.sync_locks.lock();
        if locks.get(&key).is_some_and(|lock| Arc::strong_count(lock) == 1) {
            locks.remove(&key);
        }
    }

    // ---- enumeration types ----

    /// Gets an enumeration type.
    pub fn enum_type(&self, name: &EnumTypeName) -> Option<EnumType> {
        self.state.read().enum_types.get(name).cloned()
    }

    /// All enumeration types.
    pub fn enum_types(&self) -> Vec<EnumType> {
        self.state.read().enum_types.iter().cloned().collect()
    }

    /// Enumeration types produced by a definition.
    pub fn enum_types_for(&self, definition: DefinitionId) -> Vec<EnumType> {
        self.state
            .read()
            .enum_types
            .owned_by(definition)
            .cloned()
            .collect()
    }

    // ---- persistence ----

    /// Writes a snapshot to the configured path.
    ///
    /// # Errors
    ///
    /// Fails if no snapshot path is configured or the write fails.
    pub fn save_snapshot(&self) -> CoreResult<()> {
        let path = self
            .config
            .snapshot_path
            .as_deref()
            .ok_or_else(|| CoreError::invalid_operation("no snapshot path configured"))?;
        self.save_snapshot_to(path)
    }

    /// Writes a snapshot to the given path. Credentials are not written.
    ///
    /// # Errors
    ///
    /// Fails if the snapshot cannot be encoded or written.
    pub fn save_snapshot_to(&self, path: &Path) -> CoreResult<()> {
        let snapshot = {
            let state = self.state.read();
            StoreSnapshot {
                format_version: SNAPSHOT_FORMAT_VERSION,
                connections: state.connections.values().cloned().collect(),
                definitions: state.definitions.values().cloned().collect(),
                enum_types: state.enum_types.iter().cloned().collect(),
            }
        };

        let mut bytes = Vec::new();
        ciborium::into_writer(&snapshot, &mut bytes)
            .map_err(|e| CoreError::snapshot(e.to_string()))?;

        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let mut file = tempfile::NamedTempFile::new_in(dir)?;
        file.write_all(&bytes)?;
        file.as_file().sync_all()?;
        file.persist(path).map_err(|e| CoreError::Io(e.error))?;

        debug!(path = %path.display(), bytes = bytes.len(), "snapshot written");
        Ok(())
    }
}

fn read_snapshot(path: &Path) -> CoreResult<StoreState> {
    let bytes = std::fs::read(path)?;
    let snapshot: StoreSnapshot =
        ciborium::from_reader(bytes.as_slice()).map_err(|e| CoreError::snapshot(e.to_string()))?;
    if snapshot.format_version != SNAPSHOT_FORMAT_VERSION {
        return Err(CoreError::snapshot(format!(
            "unsupported format version {}",
            snapshot.format_version
        )));
    }

    Ok(StoreState {
        connections: snapshot
            .connections
            .into_iter()
            .map(|c| (c.id(), c))
            .collect(),
        definitions: snapshot
            .definitions
            .into_iter()
            .map(|d| (d.id(), d))
            .collect(),
        enum_types: snapshot.enum_types.into_iter().collect(),
    })
}

impl fmt::Debug for DefinitionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        f.debug_struct("DefinitionStore")
            .field("connections", &state.connections.len())
            .field("definitions", &state.definitions.len())
            .field("enum_types", &state.enum_types.len())
            .finish_non_exhaustive()
    }
}
