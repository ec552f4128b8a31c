//! Test fixtures and workspace helpers.
//!
//! Provides remote metadata for a small contact/account schema and a
//! workspace that wires a store, an in-memory service, a synchronizer and
//! an executor together.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use xrmlink_codec::{Record, WireRecord, WireValue};
use xrmlink_core::{
    CachedConnector, ConnectionId, ConnectionSettings, Credential, CrudExecutor, DefinitionId,
    DefinitionStore, SchemaSynchronizer, ServiceConnector, StoreConfig,
};
use xrmlink_service::{
    AttributeMetadata, AttributeTypeCode, EntityMetadata, InMemoryService, RequiredLevel,
    ServiceFixture,
};

/// Name of the connection every workspace starts with.
pub const CONNECTION_NAME: &str = "Sales";

/// Entity-list choice for the contact entity.
pub const CONTACT_CHOICE: &str = "Contact (contact)";

/// Entity-list choice for the account entity.
pub const ACCOUNT_CHOICE: &str = "Account (account)";

/// Contact metadata.
///
/// Mapped fields: `contactid` (primary id), `lastname` (required),
/// `firstname`, `statuscode` (Active = 1, Inactive = 2), `parentcustomerid`,
/// `creditlimit`, `birthdate`, `numberofchildren` and `donotemail`.
/// `createdon` is not valid for create and `ownerid` has no mapping.
pub fn contact_metadata() -> EntityMetadata {
    EntityMetadata::new("contact")
        .with_display_name("Contact")
        .with_attribute(
            AttributeMetadata::new("contactid", AttributeTypeCode::Uniqueidentifier)
                .with_display_name("Contact")
                .primary_id(),
        )
        .with_attribute(
            AttributeMetadata::new("lastname", AttributeTypeCode::String)
                .with_display_name("Last Name")
                .with_required_level(RequiredLevel::ApplicationRequired),
        )
        .with_attribute(
            AttributeMetadata::new("firstname", AttributeTypeCode::String)
                .with_display_name("First Name"),
        )
        .with_attribute(
            AttributeMetadata::new("statuscode", AttributeTypeCode::Picklist)
                .with_display_name("Status Reason")
                .with_option("Active", 1)
                .with_option("Inactive", 2),
        )
        .with_attribute(
            AttributeMetadata::new("parentcustomerid", AttributeTypeCode::Customer)
                .with_display_name("Company Name"),
        )
        .with_attribute(
            AttributeMetadata::new("creditlimit", AttributeTypeCode::Money)
                .with_display_name("Credit Limit"),
        )
        .with_attribute(
            AttributeMetadata::new("birthdate", AttributeTypeCode::DateTime)
                .with_display_name("Birthday"),
        )
        .with_attribute(
            AttributeMetadata::new("numberofchildren", AttributeTypeCode::Integer)
                .with_display_name("No. of Children"),
        )
        .with_attribute(
            AttributeMetadata::new("donotemail", AttributeTypeCode::Boolean)
                .with_display_name("Do not allow Emails"),
        )
        .with_attribute(
            AttributeMetadata::new("createdon", AttributeTypeCode::DateTime)
                .with_display_name("Created On")
                .with_valid_for_create(false)
                .with_valid_for_update(false),
        )
        .with_attribute(
            AttributeMetadata::new("ownerid", AttributeTypeCode::Owner).with_display_name("Owner"),
        )
}

/// Account metadata: `accountid`, `name` (required) and
/// `customertypecode` (Preferred Customer = 1, Standard = 2).
pub fn account_metadata() -> EntityMetadata {
    EntityMetadata::new("account")
        .with_display_name("Account")
        .with_attribute(
            AttributeMetadata::new("accountid", AttributeTypeCode::Uniqueidentifier).primary_id(),
        )
        .with_attribute(
            AttributeMetadata::new("name", AttributeTypeCode::String)
                .with_display_name("Account Name")
                .with_required_level(RequiredLevel::SystemRequired),
        )
        .with_attribute(
            AttributeMetadata::new("customertypecode", AttributeTypeCode::Picklist)
                .with_display_name("Relationship Type")
                .with_option("Preferred Customer", 1)
                .with_option("Standard", 2),
        )
}

/// An in-memory service serving the contact and account entities.
pub fn contact_service() -> Arc<InMemoryService> {
    let service = InMemoryService::new();
    service.register_entity(contact_metadata());
    service.register_entity(account_metadata());
    Arc::new(service)
}

/// The contact and account schema as a service fixture.
pub fn contact_fixture() -> ServiceFixture {
    ServiceFixture {
        entities: vec![contact_metadata(), account_metadata()],
        records: Vec::new(),
    }
}

/// Writes [`contact_fixture`] as JSON into `dir` and returns its path.
pub fn write_contact_fixture(dir: &Path) -> PathBuf {
    let path = dir.join("fixture.json");
    let json = serde_json::to_string_pretty(&contact_fixture()).expect("Failed to encode fixture");
    std::fs::write(&path, json).expect("Failed to write fixture");
    path
}

/// Connection settings pointing at a made-up organization.
pub fn connection_settings(name: &str) -> ConnectionSettings {
    ConnectionSettings::new(name, "https://crm.example.com/sales")
        .domain("EXAMPLE")
        .user("jdoe", Credential::new("secret"))
}

/// A store, service, connector, synchronizer and executor wired together,
/// with one connection and a contact definition already in place.
pub struct TestWorkspace {
    /// The definition store.
    pub store: Arc<DefinitionStore>,
    /// The in-memory remote service.
    pub service: Arc<InMemoryService>,
    /// The connector handing out `service`.
    pub connector: Arc<dyn ServiceConnector>,
    /// The saved connection.
    pub connection: ConnectionId,
    /// The schema synchronizer.
    pub synchronizer: SchemaSynchronizer,
    /// The CRUD executor.
    pub executor: CrudExecutor,
    /// The contact definition.
    pub contact: DefinitionId,
    /// The temporary directory (kept alive to prevent cleanup).
    _temp_dir: Option<TempDir>,
}

impl TestWorkspace {
    /// Creates an in-memory workspace over [`contact_service`].
    pub fn new() -> Self {
        Self::build(contact_service(), DefinitionStore::in_memory(), None)
    }

    /// Creates a workspace over the given service.
    ///
    /// The service must offer the contact entity.
    pub fn with_service(service: Arc<InMemoryService>) -> Self {
        Self::build(service, DefinitionStore::in_memory(), None)
    }

    /// Creates a workspace whose store snapshots into a temporary directory.
    pub fn persistent() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let config = StoreConfig::default().snapshot_path(temp_dir.path().join("store.cbor"));
        let store = DefinitionStore::open(config).expect("Failed to open store");
        Self::build(contact_service(), store, Some(temp_dir))
    }

    fn build(
        service: Arc<InMemoryService>,
        store: DefinitionStore,
        temp_dir: Option<TempDir>,
    ) -> Self {
        let store = Arc::new(store);
        let connector: Arc<dyn ServiceConnector> =
            Arc::new(CachedConnector::shared(service.clone()));
        let connection = store
            .save_connection(None, connection_settings(CONNECTION_NAME), connector.as_ref())
            .expect("Failed to save connection");
        let synchronizer = SchemaSynchronizer::new(store.clone(), connector.clone());
        let contact = synchronizer
            .save_definition(connection, CONTACT_CHOICE)
            .expect("Failed to define contact");
        let executor = CrudExecutor::new(store.clone(), connector.clone());
        service.clear_calls();

        Self {
            store,
            service,
            connector,
            connection,
            synchronizer,
            executor,
            contact,
            _temp_dir: temp_dir,
        }
    }

    /// Snapshot directory, if the workspace is persistent.
    pub fn dir(&self) -> Option<&Path> {
        self._temp_dir.as_ref().map(TempDir::path)
    }

    /// Defines another entity on the workspace connection.
    pub fn define(&self, choice: &str) -> DefinitionId {
        self.synchronizer
            .save_definition(self.connection, choice)
            .expect("Failed to define entity")
    }

    /// Creates a contact through the executor and returns its id.
    pub fn create_contact(&self, lastname: &str) -> String {
        self.executor
            .create(self.contact, &Record::new().with("lastname", lastname))
            .success()
            .expect("Failed to create contact")
    }

    /// Stores a contact directly in the service, bypassing the executor.
    pub fn seed_contact(&self, lastname: &str, status: Option<i32>) -> String {
        let mut record =
            WireRecord::new("contact").with("lastname", WireValue::String(lastname.to_string()));
        if let Some(code) = status {
            record.set("statuscode", WireValue::OptionSetValue(code));
        }
        self.service.insert_record(record).to_string()
    }
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Deref for TestWorkspace {
    type Target = CrudExecutor;

    fn deref(&self) -> &Self::Target {
        &self.executor
    }
}

/// Runs a test with a fresh in-memory workspace.
pub fn with_workspace<F, R>(f: F) -> R
where
    F: FnOnce(&TestWorkspace) -> R,
{
    let workspace = TestWorkspace::new();
    f(&workspace)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workspace_defines_contact() {
        let ws = TestWorkspace::new();
        let definition = ws.store.definition(ws.contact).unwrap();
        assert_eq!(definition.entity_name(), "contact");
        assert_eq!(definition.display_name(), "Contact");
        assert_eq!(definition.catalog().len(), 9);
        assert_eq!(ws.service.call_count(), 0);
    }

    #[test]
    fn fixture_file_loads() {
        let dir = TempDir::new().unwrap();
        let path = write_contact_fixture(dir.path());
        let service = InMemoryService::from_fixture_file(&path).unwrap();
        assert_eq!(service.record_count("contact"), 0);
        let ws = TestWorkspace::with_service(Arc::new(service));
        assert!(ws.store.definition(ws.contact).is_some());
    }

    #[test]
    fn seeded_records_are_visible() {
        with_workspace(|ws| {
            let id = ws.seed_contact("Smith", Some(2));
            let record = ws.retrieve(ws.contact, &id).success().unwrap();
            assert_eq!(record.get("statuscode").and_then(|v| v.as_text()), Some("Inactive"));
        });
    }
}
