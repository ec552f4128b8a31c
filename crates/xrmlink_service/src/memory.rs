//! In-memory organization service.
//!
//! Holds entity metadata and records in memory, records every call, and can
//! be told to fail the next call. Used by tests and by the CLI, which loads
//! it from a JSON fixture.

use crate::error::{RemoteError, RemoteResult};
use crate::metadata::{EntityMetadata, EntitySummary};
use crate::service::OrganizationService;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;
use uuid::Uuid;
use xrmlink_codec::{WireRecord, WireValue};

/// A call received by [`InMemoryService`].
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceCall {
    /// `describe_entity`.
    Describe(String),
    /// `list_entities`.
    ListEntities,
    /// `create`, with the record as sent.
    Create(WireRecord),
    /// `update`, with the record as sent.
    Update(Uuid, WireRecord),
    /// `retrieve`.
    Retrieve(String, Uuid),
    /// `retrieve_all`.
    RetrieveAll(String),
    /// `delete`.
    Delete(String, Uuid),
}

/// On-disk shape of a service fixture.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceFixture {
    /// Entity metadata served by `describe_entity` and `list_entities`.
    #[serde(default)]
    pub entities: Vec<EntityMetadata>,
    /// Records present at start.
    #[serde(default)]
    pub records: Vec<WireRecord>,
}

/// An organization service that lives in memory.
#[derive(Debug)]
pub struct InMemoryService {
    entities: RwLock<BTreeMap<String, EntityMetadata>>,
    records: RwLock<BTreeMap<String, BTreeMap<Uuid, WireRecord>>>,
    connected: AtomicBool,
    fail_next: Mutex<Option<RemoteError>>,
    calls: Mutex<Vec<ServiceCall>>,
}

impl Default for InMemoryService {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryService {
    /// Creates an empty, connected service.
    pub fn new() -> Self {
        Self {
            entities: RwLock::new(BTreeMap::new()),
            records: RwLock::new(BTreeMap::new()),
            connected: AtomicBool::new(true),
            fail_next: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Builds a service from a fixture.
    pub fn from_fixture(fixture: ServiceFixture) -> Self {
        let service = Self::new();
        for entity in fixture.entities {
            service.register_entity(entity);
        }
        for record in fixture.records {
            service.insert_record(record);
        }
        service
    }

    /// Builds a service from fixture JSON.
    pub fn from_fixture_json(json: &str) -> RemoteResult<Self> {
        let fixture: ServiceFixture =
            serde_json::from_str(json).map_err(|e| RemoteError::Fixture(e.to_string()))?;
        Ok(Self::from_fixture(fixture))
    }

    /// Builds a service from a fixture JSON file.
    pub fn from_fixture_file(path: impl AsRef<Path>) -> RemoteResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| RemoteError::Fixture(format!("{}: {e}", path.display())))?;
        Self::from_fixture_json(&json)
    }

    /// Adds or replaces an entity's metadata.
    pub fn register_entity(&self, metadata: EntityMetadata) {
        self.entities
            .write()
            .insert(metadata.logical_name.clone(), metadata);
    }

    /// Removes an entity's metadata. Its records are kept.
    pub fn remove_entity(&self, logical_name: &str) -> Option<EntityMetadata> {
        self.entities.write().remove(logical_name)
    }

    /// Changes an entity's metadata in place.
    ///
    /// Returns false if the entity is not registered.
    pub fn modify_entity(&self, logical_name: &str, f: impl FnOnce(&mut EntityMetadata)) -> bool {
        match self.entities.write().get_mut(logical_name) {
            Some(metadata) => {
                f(metadata);
                true
            }
            None => false,
        }
    }

    /// Inserts a record directly, bypassing call recording. Records without
    /// an identifier get a fresh one.
    pub fn insert_record(&self, mut record: WireRecord) -> Uuid {
        let id = *record.id.get_or_insert_with(Uuid::new_v4);
        self.records
            .write()
            .entry(record.logical_name.clone())
            .or_default()
            .insert(id, record);
        id
    }

    /// Returns a stored record.
    pub fn record(&self, entity_name: &str, id: Uuid) -> Option<WireRecord> {
        self.records
            .read()
            .get(entity_name)
            .and_then(|r| r.get(&id))
            .cloned()
    }

    /// Number of stored records of an entity.
    pub fn record_count(&self, entity_name: &str) -> usize {
        self.records.read().get(entity_name).map_or(0, BTreeMap::len)
    }

    /// Makes the next call fail with the given error.
    pub fn fail_next(&self, error: RemoteError) {
        *self.fail_next.lock() = Some(error);
    }

    /// Sets the connected state.
    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    /// Checks if the service is connected.
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Every call received so far, in order.
    pub fn calls(&self) -> Vec<ServiceCall> {
        self.calls.lock().clone()
    }

    /// Forgets recorded calls.
    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    /// Number of calls received so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Records sent to `create`, in order.
    pub fn created(&self) -> Vec<WireRecord> {
        self.calls
            .lock()
            .iter()
            .filter_map(|c| match c {
                ServiceCall::Create(r) => Some(r.clone()),
                _ => None,
            })
            .collect()
    }

    /// Records sent to `update`, in order.
    pub fn updated(&self) -> Vec<(Uuid, WireRecord)> {
        self.calls
            .lock()
            .iter()
            .filter_map(|c| match c {
                ServiceCall::Update(id, r) => Some((*id, r.clone())),
                _ => None,
            })
            .collect()
    }

    fn begin(&self, call: ServiceCall) -> RemoteResult<()> {
        self.calls.lock().push(call);
        if let Some(err) = self.fail_next.lock().take() {
            debug!(error = %err, "injected failure");
            return Err(err);
        }
        if !self.is_connected() {
            return Err(RemoteError::NotConnected);
        }
        Ok(())
    }

    fn metadata(&self, entity_name: &str) -> RemoteResult<EntityMetadata> {
        self.entities
            .read()
            .get(entity_name)
            .cloned()
            .ok_or_else(|| RemoteError::unknown_entity(entity_name))
    }
}

impl OrganizationService for InMemoryService {
    fn describe_entity(&self, logical_name: &str) -> RemoteResult<EntityMetadata> {
        self.begin(ServiceCall::Describe(logical_name.to_string()))?;
        self.metadata(logical_name)
    }

    fn list_entities(&self) -> RemoteResult<Vec<EntitySummary>> {
        self.begin(ServiceCall::ListEntities)?;
        Ok(self
            .entities
            .read()
            .values()
            .map(EntityMetadata::summary)
            .collect())
    }

    fn create(&self, entity_name: &str, record: &WireRecord) -> RemoteResult<Uuid> {
        self.begin(ServiceCall::Create(record.clone()))?;
        let metadata = self.metadata(entity_name)?;

        let id = record.id.unwrap_or_else(Uuid::new_v4);
        let mut stored = WireRecord::new(entity_name).with_id(id);
        for (name, value) in record.iter() {
            if !value.is_clear() {
                stored.set(name.clone(), value.clone());
            }
        }
        if let Some(primary) = metadata.primary_id_attribute {
            stored.set(primary, WireValue::Guid(id));
        }

        debug!(entity = entity_name, %id, "record created");
        self.records
            .write()
            .entry(entity_name.to_string())
            .or_default()
            .insert(id, stored);
        Ok(id)
    }

    fn update(&self, entity_name: &str, id: Uuid, record: &WireRecord) -> RemoteResult<()> {
        self.begin(ServiceCall::Update(id, record.clone()))?;
        self.metadata(entity_name)?;

        let mut records = self.records.write();
        let stored = records
            .get_mut(entity_name)
            .and_then(|r| r.get_mut(&id))
            .ok_or_else(|| RemoteError::record_not_found(entity_name, id))?;
        for (name, value) in record.iter() {
            if value.is_clear() {
                stored.attributes.remove(name);
            } else {
                stored.set(name.clone(), value.clone());
            }
        }
        Ok(())
    }

    fn retrieve(&self, entity_name: &str, id: Uuid) -> RemoteResult<Option<WireRecord>> {
        self.begin(ServiceCall::Retrieve(entity_name.to_string(), id))?;
        self.metadata(entity_name)?;
        self.record(entity_name, id)
            .map(Some)
            .ok_or_else(|| RemoteError::record_not_found(entity_name, id))
    }

    fn retrieve_all(&self, entity_name: &str) -> RemoteResult<Vec<WireRecord>> {
        self.begin(ServiceCall::RetrieveAll(entity_name.to_string()))?;
        self.metadata(entity_name)?;
        Ok(self
            .records
            .read()
            .get(entity_name)
            .map(|r| r.values().cloned().collect())
            .unwrap_or_default())
    }

    fn delete(&self, entity_name: &str, id: Uuid) -> RemoteResult<()> {
        self.begin(ServiceCall::Delete(entity_name.to_string(), id))?;
        self.metadata(entity_name)?;
        self.records
            .write()
            .get_mut(entity_name)
            .and_then(|r| r.remove(&id))
            .map(|_| ())
            .ok_or_else(|| RemoteError::record_not_found(entity_name, id))
    }
}
