//! Exec command implementation.
//!
//! Records are given and printed as plain JSON objects. A lookup is an
//! object with `entity` and `id` members. Decimal and datetime fields are
//! printed as strings and read back through the definition's catalog, so a
//! retrieved record can be passed straight to create or update.

use super::Session;
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use rust_decimal::Decimal;
use serde_json::{json, Map, Number};
use std::str::FromStr;
use xrmlink_codec::{LookupValue, Record, Value, ValueType};
use xrmlink_core::crud::ERROR_MESSAGE_LABEL;
use xrmlink_core::{CrudExecutor, FieldDescriptorCatalog, Operation, Outcome, UpdatePolicy};

/// Operation selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExecOperation {
    /// Create a record
    Create,
    /// Update a record
    Update,
    /// Retrieve one record
    Retrieve,
    /// Retrieve every record
    RetrieveAll,
    /// Delete a record
    Delete,
}

impl From<ExecOperation> for Operation {
    fn from(op: ExecOperation) -> Self {
        match op {
            ExecOperation::Create => Operation::Create,
            ExecOperation::Update => Operation::Update,
            ExecOperation::Retrieve => Operation::Retrieve,
            ExecOperation::RetrieveAll => Operation::RetrieveAll,
            ExecOperation::Delete => Operation::Delete,
        }
    }
}

/// Arguments of one exec invocation.
#[derive(Debug)]
pub struct ExecRequest {
    /// Operation to run.
    pub operation: ExecOperation,
    /// Record identifier.
    pub id: Option<String>,
    /// Record as JSON.
    pub record: Option<String>,
    /// Omit null values on update.
    pub null_as_ignore: bool,
    /// Treat empty strings as null on update.
    pub empty_as_null: bool,
}

/// Runs one CRUD operation and prints its outcome.
pub fn run(
    session: &Session,
    connection: &str,
    entity: &str,
    request: ExecRequest,
) -> Result<(), Box<dyn std::error::Error>> {
    let definition = session.definition(connection, entity)?;
    let executor = CrudExecutor::new(session.store.clone(), session.connector.clone());
    let operation = Operation::from(request.operation);
    let display_name = definition.display_name();
    let id = request.id.as_deref().unwrap_or_default();

    println!("{}", operation.step_name(display_name));

    let outcome = match request.operation {
        ExecOperation::Create => {
            let record = parse_record(request.record.as_deref(), definition.catalog())?;
            map_outcome(executor.create(definition.id(), &record), |id| json!(id))
        }
        ExecOperation::Update => {
            let record = parse_record(request.record.as_deref(), definition.catalog())?;
            let policy = UpdatePolicy::new()
                .treat_null_as_ignore(request.null_as_ignore)
                .treat_empty_string_as_null(request.empty_as_null);
            map_outcome(
                executor.update(definition.id(), id, &record, policy),
                |()| serde_json::Value::Null,
            )
        }
        ExecOperation::Retrieve => map_outcome(executor.retrieve(definition.id(), id), |r| {
            record_to_json(&r)
        }),
        ExecOperation::RetrieveAll => map_outcome(executor.retrieve_all(definition.id()), |rs| {
            serde_json::Value::Array(rs.iter().map(record_to_json).collect())
        }),
        ExecOperation::Delete => map_outcome(executor.delete(definition.id(), id), |()| {
            serde_json::Value::Null
        }),
    };

    println!("{}", outcome.path_name());
    match outcome {
        Outcome::Success(payload) => {
            if let Some(label) = operation.payload_label(display_name) {
                println!("{label}: {}", serde_json::to_string_pretty(&payload)?);
            }
            Ok(())
        }
        Outcome::Error { message } => {
            println!("{ERROR_MESSAGE_LABEL}: {message}");
            Err(message.into())
        }
    }
}

fn map_outcome<T>(
    outcome: Outcome<T>,
    f: impl FnOnce(T) -> serde_json::Value,
) -> Outcome<serde_json::Value> {
    match outcome {
        Outcome::Success(v) => Outcome::Success(f(v)),
        Outcome::Error { message } => Outcome::Error { message },
    }
}

fn parse_record(
    raw: Option<&str>,
    catalog: &FieldDescriptorCatalog,
) -> Result<Record, Box<dyn std::error::Error>> {
    let raw = raw.ok_or("--record is required for this operation")?;
    let parsed: serde_json::Value = serde_json::from_str(raw)?;
    let serde_json::Value::Object(members) = parsed else {
        return Err("--record must be a JSON object".into());
    };
    let mut record = Record::new();
    for (name, value) in members {
        let value_type = catalog.resolve(&name).map(|f| f.value_type());
        let value = json_to_value(&value, value_type)
            .ok_or_else(|| format!("unsupported value for '{name}'"))?;
        record.insert(name, value);
    }
    Ok(record)
}

/// Converts one JSON member, guided by the field's value type when known.
fn json_to_value(value: &serde_json::Value, value_type: Option<ValueType>) -> Option<Value> {
    use serde_json::Value as J;
    match (value_type, value) {
        (_, J::Null) => Some(Value::Null),
        (Some(ValueType::Decimal), J::String(s)) => {
            Decimal::from_str(s.trim()).ok().map(Value::Decimal)
        }
        (Some(ValueType::Decimal), J::Number(n)) => {
            let text = n.to_string();
            Decimal::from_str(&text)
                .or_else(|_| Decimal::from_scientific(&text))
                .ok()
                .map(Value::Decimal)
        }
        (Some(ValueType::DateTime), J::String(s)) => DateTime::parse_from_rfc3339(s.trim())
            .ok()
            .map(|t| Value::DateTime(t.with_timezone(&Utc))),
        (_, other) => plain_json_to_value(other),
    }
}

fn plain_json_to_value(value: &serde_json::Value) -> Option<Value> {
    use serde_json::Value as J;
    Some(match value {
        J::Null => Value::Null,
        J::Bool(b) => Value::Bool(*b),
        J::Number(n) => match n.as_i64() {
            Some(i) => Value::Integer(i),
            None => Value::Number(n.as_f64()?),
        },
        J::String(s) => Value::Text(s.clone()),
        J::Object(o) => {
            let entity = o.get("entity")?.as_str()?;
            let id = o.get("id")?.as_str()?;
            Value::Reference(LookupValue::new(entity, id))
        }
        J::Array(_) => return None,
    })
}

fn record_to_json(record: &Record) -> serde_json::Value {
    let members: Map<String, serde_json::Value> = record
        .iter()
        .map(|(name, value)| (name.clone(), value_to_json(value)))
        .collect();
    serde_json::Value::Object(members)
}

fn value_to_json(value: &Value) -> serde_json::Value {
    use serde_json::Value as J;
    match value {
        Value::Null => J::Null,
        Value::Text(s) => J::String(s.clone()),
        Value::Integer(i) => J::from(*i),
        Value::Number(n) => Number::from_f64(*n).map_or(J::Null, J::Number),
        Value::Decimal(d) => J::String(d.to_string()),
        Value::Bool(b) => J::Bool(*b),
        Value::DateTime(dt) => J::String(dt.to_rfc3339()),
        Value::Reference(r) => json!({ "entity": r.entity_name.as_str(), "id": r.id.as_str() }),
    }
}
