//! CLI command implementations.

pub mod connection;
pub mod define;
pub mod entities;
pub mod exec;
pub mod inspect;
pub mod sync;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;
use xrmlink_core::{
    CachedConnector, Connection, CoreError, DefinitionStore, EntityDefinition, ServiceConnector,
    StoreConfig,
};
use xrmlink_service::{InMemoryService, OrganizationService, RemoteError};

/// An opened store plus the connector every command shares.
pub struct Session {
    /// The definition store.
    pub store: Arc<DefinitionStore>,
    /// Connector handing out service handles.
    pub connector: Arc<dyn ServiceConnector>,
}

impl Session {
    /// Opens the store snapshot at `store`, creating it on first save.
    ///
    /// Without a fixture every remote call fails with "not connected".
    pub fn open(store: &Path, fixture: Option<&Path>) -> Result<Self, Box<dyn std::error::Error>> {
        let config = StoreConfig::new().snapshot_path(store);
        let store = Arc::new(DefinitionStore::open(config)?);

        let fixture: Option<PathBuf> = fixture.map(Path::to_path_buf);
        let connector = CachedConnector::new(move |connection: &Connection| {
            let Some(path) = &fixture else {
                return Err(CoreError::Remote(RemoteError::NotConnected));
            };
            debug!(connection = %connection, fixture = %path.display(), "loading service fixture");
            let service: Arc<dyn OrganizationService> =
                Arc::new(InMemoryService::from_fixture_file(path)?);
            Ok(service)
        });

        Ok(Self {
            store,
            connector: Arc::new(connector),
        })
    }

    /// Writes the store snapshot.
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.store.save_snapshot()?;
        Ok(())
    }

    /// Looks up a connection by name.
    pub fn connection(&self, name: &str) -> Result<Connection, Box<dyn std::error::Error>> {
        self.store
            .connection_by_name(name)
            .ok_or_else(|| format!("No connection named '{name}'").into())
    }

    /// Looks up a connection's definition of an entity.
    pub fn definition(
        &self,
        connection: &str,
        entity: &str,
    ) -> Result<EntityDefinition, Box<dyn std::error::Error>> {
        let connection = self.connection(connection)?;
        self.store
            .find_definition(connection.id(), entity)
            .ok_or_else(|| {
                format!("No definition of '{entity}' for connection '{}'", connection.name()).into()
            })
    }
}
