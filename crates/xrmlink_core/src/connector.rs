//! Service handles per connection.

use crate::connection::Connection;
use crate::error::CoreResult;
use crate::ids::ConnectionId;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;
use xrmlink_service::OrganizationService;

/// Hands out an organization service handle for a connection.
pub trait ServiceConnector: Send + Sync {
    /// Returns a handle for the connection, opening one if needed.
    fn connect(&self, connection: &Connection) -> CoreResult<Arc<dyn OrganizationService>>;

    /// Drops any handle held for the connection.
    fn invalidate(&self, connection: ConnectionId);
}

type ServiceFactory = dyn Fn(&Connection) -> CoreResult<Arc<dyn OrganizationService>> + Send + Sync;

/// A connector that opens handles with a factory and caches one per
/// connection until invalidated.
pub struct CachedConnector {
    factory: Box<ServiceFactory>,
    handles: RwLock<HashMap<ConnectionId, Arc<dyn OrganizationService>>>,
}

impl CachedConnector {
    /// Creates a connector around a factory.
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn(&Connection) -> CoreResult<Arc<dyn OrganizationService>> + Send + Sync + 'static,
    {
        Self {
            factory: Box::new(factory),
            handles: RwLock::new(HashMap::new()),
        }
    }

    /// Creates a connector that hands out the same service for every
    /// connection.
    pub fn shared(service: Arc<dyn OrganizationService>) -> Self {
        Self::new(move |_| Ok(Arc::clone(&service)))
    }

    /// Returns true if a handle is cached for the connection.
    pub fn is_cached(&self, connection: ConnectionId) -> bool {
        self.handles.read().contains_key(&connection)
    }

    /// Drops every cached handle.
    pub fn clear(&self) {
        self.handles.write().clear();
    }
}

impl ServiceConnector for CachedConnector {
    fn connect(&self, connection: &Connection) -> CoreResult<Arc<dyn OrganizationService>> {
        if let Some(handle) = self.handles.read().get(&connection.id()) {
            return Ok(Arc::clone(handle));
        }

        debug!(connection = %connection, "opening service handle");
        let handle = (self.factory)(connection)?;
        Ok(Arc::clone(
            self.handles
                .write()
                .entry(connection.id())
                .or_insert(handle),
        ))
    }

    fn invalidate(&self, connection: ConnectionId) {
        if self.handles.write().remove(&connection).is_some() {
            debug!(%connection, "service handle invalidated");
        }
    }
}

impl fmt::Debug for CachedConnector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedConnector")
            .field("cached", &self.handles.read().len())
            .finish_non_exhaustive()
    }
}
