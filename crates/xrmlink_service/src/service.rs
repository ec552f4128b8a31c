//! The organization service contract.

use crate::error::RemoteResult;
use crate::metadata::{EntityMetadata, EntitySummary};
use std::sync::Arc;
use uuid::Uuid;
use xrmlink_codec::WireRecord;

/// A handle to the remote organization service.
///
/// This trait abstracts the transport, allowing for different
/// implementations (SOAP or web API clients supplied by a host, the
/// in-memory service for testing). Any call may fail; retries and
/// timeouts are the implementation's business.
pub trait OrganizationService: Send + Sync {
    /// Describes one entity: display name and attributes.
    fn describe_entity(&self, logical_name: &str) -> RemoteResult<EntityMetadata>;

    /// Lists every entity reachable through this service.
    fn list_entities(&self) -> RemoteResult<Vec<EntitySummary>>;

    /// Creates a record and returns its new identifier.
    fn create(&self, entity_name: &str, record: &WireRecord) -> RemoteResult<Uuid>;

    /// Updates the given attributes of an existing record.
    fn update(&self, entity_name: &str, id: Uuid, record: &WireRecord) -> RemoteResult<()>;

    /// Retrieves one record with all columns. Returns `None` if the service
    /// answered without a record.
    fn retrieve(&self, entity_name: &str, id: Uuid) -> RemoteResult<Option<WireRecord>>;

    /// Retrieves every record of an entity with all columns.
    fn retrieve_all(&self, entity_name: &str) -> RemoteResult<Vec<WireRecord>>;

    /// Deletes one record.
    fn delete(&self, entity_name: &str, id: Uuid) -> RemoteResult<()>;
}

impl<T: OrganizationService + ?Sized> OrganizationService for Arc<T> {
    fn describe_entity(&self, logical_name: &str) -> RemoteResult<EntityMetadata> {
        (**self).describe_entity(logical_name)
    }

    fn list_entities(&self) -> RemoteResult<Vec<EntitySummary>> {
        (**self).list_entities()
    }

    fn create(&self, entity_name: &str, record: &WireRecord) -> RemoteResult<Uuid> {
        (**self).create(entity_name, record)
    }

    fn update(&self, entity_name: &str, id: Uuid, record: &WireRecord) -> RemoteResult<()> {
        (**self).update(entity_name, id, record)
    }

    fn retrieve(&self, entity_name: &str, id: Uuid) -> RemoteResult<Option<WireRecord>> {
        (**self).retrieve(entity_name, id)
    }

    fn retrieve_all(&self, entity_name: &str) -> RemoteResult<Vec<WireRecord>> {
        (**self).retrieve_all(entity_name)
    }

    fn delete(&self, entity_name: &str, id: Uuid) -> RemoteResult<()> {
        (**self).delete(entity_name, id)
    }
}
