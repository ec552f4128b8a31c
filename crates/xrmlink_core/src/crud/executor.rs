//! The CRUD executor.

use super::choice::{resolve_by_label, resolve_label};
use super::outcome::{Operation, Outcome};
use super::policy::UpdatePolicy;
use crate::catalog::FieldDescriptorCatalog;
use crate::connection::Connection;
use crate::connector::ServiceConnector;
use crate::definition::EntityDefinition;
use crate::enum_types::EnumTypeName;
use crate::error::{CoreError, CoreResult};
use crate::ids::DefinitionId;
use crate::store::DefinitionStore;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;
use xrmlink_codec::{
    decode_record, encode_field, Encoded, FieldDescriptor, FieldType, Record, Value, WireRecord,
};
use xrmlink_service::OrganizationService;

/// Runs create, update, retrieve, retrieve-all and delete against a stored
/// entity definition.
///
/// Every operation returns an [`Outcome`]; failures never escape as
/// `Err`, they become the outcome's error message.
///
/// Create, update, retrieve and retrieve-all encode or decode through the
/// definition's catalog and fail on a definition whose catalog is empty.
/// Delete only needs the entity name and the identifier.
pub struct CrudExecutor {
    store: Arc<DefinitionStore>,
    connector: Arc<dyn ServiceConnector>,
}

/// Everything an operation needs, resolved once up front.
struct Context {
    definition: EntityDefinition,
    connection: Connection,
    service: Arc<dyn OrganizationService>,
}

impl Context {
    fn catalog(&self) -> &FieldDescriptorCatalog {
        self.definition.catalog()
    }

    fn entity_name(&self) -> &str {
        self.definition.entity_name()
    }
}

impl CrudExecutor {
    /// Creates an executor.
    pub fn new(store: Arc<DefinitionStore>, connector: Arc<dyn ServiceConnector>) -> Self {
        Self { store, connector }
    }

    /// Host-facing step name of an operation on a definition.
    pub fn step_name(&self, definition: DefinitionId, operation: Operation) -> Option<String> {
        self.store
            .definition(definition)
            .map(|d| operation.step_name(d.display_name()))
    }

    /// Creates a record and returns its new identifier.
    ///
    /// Required fields are checked first and all missing ones are reported
    /// together. A required field given as `Null` counts as present and is
    /// sent as a clear. Fields the catalog does not know, and fields that
    /// are not updatable, are ignored.
    pub fn create(&self, definition: DefinitionId, record: &Record) -> Outcome<String> {
        Outcome::from_result(
            Operation::Create,
            definition,
            self.try_create(definition, record),
        )
    }

    /// Updates a record.
    pub fn update(
        &self,
        definition: DefinitionId,
        id: &str,
        record: &Record,
        policy: UpdatePolicy,
    ) -> Outcome<()> {
        Outcome::from_result(
            Operation::Update,
            definition,
            self.try_update(definition, id, record, policy),
        )
    }

    /// Retrieves one record.
    pub fn retrieve(&self, definition: DefinitionId, id: &str) -> Outcome<Record> {
        Outcome::from_result(
            Operation::Retrieve,
            definition,
            self.try_retrieve(definition, id),
        )
    }

    /// Retrieves every record of the definition's entity.
    pub fn retrieve_all(&self, definition: DefinitionId) -> Outcome<Vec<Record>> {
        Outcome::from_result(
            Operation::RetrieveAll,
            definition,
            self.try_retrieve_all(definition),
        )
    }

    /// Deletes a record.
    pub fn delete(&self, definition: DefinitionId, id: &str) -> Outcome<()> {
        Outcome::from_result(Operation::Delete, definition, self.try_delete(definition, id))
    }

    fn try_create(&self, definition: DefinitionId, record: &Record) -> CoreResult<String> {
        let ctx = self.context(definition)?;
        let catalog = ctx.catalog();
        let input = resolve_input(catalog, record);

        let missing: Vec<String> = catalog
            .required_fields()
            .filter(|f| !input.contains_key(f.name()))
            .map(|f| f.name().to_string())
            .collect();
        if !missing.is_empty() {
            return Err(CoreError::missing_required(missing));
        }

        let mut wire = WireRecord::new(ctx.entity_name());
        for field in catalog.fields() {
            let Some(value) = input.get(field.name()) else {
                continue;
            };
            if !field.updatable() {
                debug!(field = field.name(), "field is not updatable; ignoring");
                continue;
            }
            encode_into(&mut wire, field, value)?;
        }

        let id = ctx.service.create(ctx.entity_name(), &wire)?;
        info!(entity = ctx.entity_name(), %id, fields = wire.len(), "record created");
        Ok(id.to_string())
    }

    fn try_update(
        &self,
        definition: DefinitionId,
        id: &str,
        record: &Record,
        policy: UpdatePolicy,
    ) -> CoreResult<()> {
        let id = parse_record_id(id)?;
        let ctx = self.context(definition)?;
        let catalog = ctx.catalog();
        debug!(catalog = %catalog.describe(), "updating record");
        let input = resolve_input(catalog, record);

        let mut wire = WireRecord::new(ctx.entity_name()).with_id(id);
        for field in catalog.fields() {
            let Some(value) = input.get(field.name()) else {
                continue;
            };
            if !field.updatable() {
                debug!(field = field.name(), "field is not updatable; ignoring");
                continue;
            }
            let Some(value) = policy.apply(value) else {
                debug!(field = field.name(), "null value ignored");
                continue;
            };
            let value = self.resolve_choice_alias(&ctx, field, value);
            encode_into(&mut wire, field, &value)?;
        }

        ctx.service.update(ctx.entity_name(), id, &wire)?;
        info!(entity = ctx.entity_name(), %id, fields = wire.len(), "record updated");
        Ok(())
    }

    fn try_retrieve(&self, definition: DefinitionId, id: &str) -> CoreResult<Record> {
        let id = parse_record_id(id)?;
        let ctx = self.context(definition)?;
        let wire = ctx
            .service
            .retrieve(ctx.entity_name(), id)?
            .ok_or(CoreError::RecordNotFound)?;
        Ok(decode(ctx.catalog(), &wire))
    }

    fn try_retrieve_all(&self, definition: DefinitionId) -> CoreResult<Vec<Record>> {
        let ctx = self.context(definition)?;
        let records = ctx.service.retrieve_all(ctx.entity_name())?;
        debug!(entity = ctx.entity_name(), count = records.len(), "records retrieved");
        Ok(records.iter().map(|w| decode(ctx.catalog(), w)).collect())
    }

    fn try_delete(&self, definition: DefinitionId, id: &str) -> CoreResult<()> {
        let id = parse_record_id(id)?;
        let ctx = self.connect(definition)?;
        ctx.service.delete(ctx.entity_name(), id)?;
        info!(entity = ctx.entity_name(), %id, "record deleted");
        Ok(())
    }

    /// Resolves an operation's context; the catalog must not be empty.
    fn context(&self, definition: DefinitionId) -> CoreResult<Context> {
        self.resolve(definition, true)
    }

    /// Resolves a context for operations that never touch the catalog.
    fn connect(&self, definition: DefinitionId) -> CoreResult<Context> {
        self.resolve(definition, false)
    }

    fn resolve(&self, definition: DefinitionId, needs_catalog: bool) -> CoreResult<Context> {
        let definition = self
            .store
            .definition(definition)
            .ok_or_else(|| CoreError::definition_not_found(definition))?;
        if needs_catalog && definition.catalog().is_empty() {
            return Err(CoreError::missing_catalog(definition.entity_name()));
        }
        let connection = self
            .store
            .connection(definition.connection_id())
            .ok_or_else(|| CoreError::connection_not_found(definition.connection_id()))?;
        let service = self.connector.connect(&connection)?;
        Ok(Context {
            definition,
            connection,
            service,
        })
    }

    /// Maps a choice value that is not an option label through the field's
    /// enumeration type. Anything unresolved is returned unchanged and later
    /// skipped by the encoder.
    fn resolve_choice_alias(&self, ctx: &Context, field: &FieldDescriptor, value: Value) -> Value {
        if field.field_type() != FieldType::Choice {
            return value;
        }
        let (Value::Text(text), Some(options)) = (&value, field.option_set()) else {
            return value;
        };
        if resolve_by_label(options, text).is_some() {
            return value;
        }

        let name = EnumTypeName::for_field(ctx.connection.id(), ctx.entity_name(), field.name());
        let enum_type = self.store.enum_type(&name);
        match resolve_label(options, enum_type.as_ref(), text) {
            Some(label) => {
                debug!(field = field.name(), member = %text, label, "choice resolved through enum type");
                Value::Text(label.to_string())
            }
            None => value,
        }
    }
}

impl fmt::Debug for CrudExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CrudExecutor")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

fn parse_record_id(raw: &str) -> CoreResult<Uuid> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CoreError::EmptyIdentifier);
    }
    Uuid::parse_str(trimmed).map_err(|_| CoreError::InvalidIdentifier {
        value: raw.to_string(),
    })
}

/// Keys a record by logical name. Display names are accepted as aliases; a
/// logical-name key wins over a display-name key for the same field.
fn resolve_input<'a>(
    catalog: &'a FieldDescriptorCatalog,
    record: &'a Record,
) -> HashMap<&'a str, &'a Value> {
    let mut input = HashMap::new();
    for (key, value) in record.iter() {
        match catalog.resolve(key) {
            Some(field) => {
                if field.name() == key || !input.contains_key(field.name()) {
                    input.insert(field.name(), value);
                }
            }
            None => debug!(field = %key, "field not in catalog; ignoring"),
        }
    }
    input
}

fn encode_into(wire: &mut WireRecord, field: &FieldDescriptor, value: &Value) -> CoreResult<()> {
    match encode_field(field, value)? {
        Encoded::Set(v) => wire.set(field.name(), v),
        Encoded::Skip(reason) => debug!(field = field.name(), %reason, "field skipped"),
    }
    Ok(())
}

fn decode(catalog: &FieldDescriptorCatalog, wire: &WireRecord) -> Record {
    let decoded = decode_record(wire, |name| catalog.field(name));
    if !decoded.unknown.is_empty() {
        debug!(fields = ?decoded.unknown, "attributes not in catalog dropped");
    }
    for (name, error) in &decoded.failed {
        warn!(field = %name, %error, "attribute could not be decoded; dropped");
    }
    decoded.record
}
