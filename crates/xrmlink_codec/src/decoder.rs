//! Wire-to-canonical decoding.

use crate::descriptor::{FieldDescriptor, FieldType};
use crate::error::{CodecError, CodecResult};
use crate::value::{LookupValue, Record, Value};
use crate::wire::{WireRecord, WireValue};

/// Decode a wire value for the given field.
///
/// # Errors
///
/// Returns an error if the wire variant does not fit the field's type.
pub fn decode_field(descriptor: &FieldDescriptor, wire: &WireValue) -> CodecResult<Value> {
    if wire.is_clear() {
        return Ok(Value::Null);
    }

    match descriptor.field_type() {
        FieldType::Money => match wire {
            WireValue::Money(m) => Ok(Value::Decimal(m.value())),
            WireValue::Decimal(d) => Ok(Value::Decimal(*d)),
            other => Err(mismatch(descriptor, "money", other)),
        },
        FieldType::Choice => match wire {
            WireValue::OptionSetValue(code) => Ok(descriptor
                .option_set()
                .and_then(|o| o.label_for(*code))
                .map_or(Value::Integer(i64::from(*code)), |label| {
                    Value::Text(label.to_string())
                })),
            other => Err(mismatch(descriptor, "an option set value", other)),
        },
        FieldType::Reference => match wire {
            WireValue::EntityReference(r) => Ok(Value::Reference(LookupValue::new(
                r.logical_name.clone(),
                r.id.to_string(),
            ))),
            other => Err(mismatch(descriptor, "an entity reference", other)),
        },
        FieldType::Identifier => match wire {
            WireValue::Guid(id) => Ok(Value::Text(id.to_string())),
            other => Err(mismatch(descriptor, "a guid", other)),
        },
        FieldType::Scalar => Ok(passthrough(wire)),
    }
}

fn passthrough(wire: &WireValue) -> Value {
    match wire {
        WireValue::Null => Value::Null,
        WireValue::String(s) => Value::Text(s.clone()),
        WireValue::Integer(n) => Value::Integer(*n),
        WireValue::Double(n) => Value::Number(*n),
        WireValue::Decimal(d) => Value::Decimal(*d),
        WireValue::Boolean(b) => Value::Bool(*b),
        WireValue::DateTime(t) => Value::DateTime(*t),
        WireValue::Guid(id) => Value::Text(id.to_string()),
        WireValue::Money(m) => Value::Decimal(m.value()),
        WireValue::OptionSetValue(code) => Value::Integer(i64::from(*code)),
        WireValue::EntityReference(r) => {
            Value::Reference(LookupValue::new(r.logical_name.clone(), r.id.to_string()))
        }
    }
}

fn mismatch(descriptor: &FieldDescriptor, expected: &str, found: &WireValue) -> CodecError {
    CodecError::type_mismatch(descriptor.name(), expected, found.kind())
}

/// Result of decoding a whole wire record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedRecord {
    /// Successfully decoded fields, keyed by logical name.
    pub record: Record,
    /// Attributes with no matching descriptor. These are dropped.
    pub unknown: Vec<String>,
    /// Attributes that had a descriptor but failed to decode.
    pub failed: Vec<(String, CodecError)>,
}

impl DecodedRecord {
    /// Returns true if every attribute decoded.
    pub fn is_clean(&self) -> bool {
        self.unknown.is_empty() && self.failed.is_empty()
    }
}

/// Decode every attribute of a wire record.
///
/// `lookup` resolves an attribute name to its descriptor. Attributes it
/// does not know are listed in [`DecodedRecord::unknown`]; attributes that
/// fail to decode are listed in [`DecodedRecord::failed`]. Neither aborts
/// the decode.
pub fn decode_record<'a, F>(wire: &WireRecord, lookup: F) -> DecodedRecord
where
    F: Fn(&str) -> Option<&'a FieldDescriptor>,
{
    let mut decoded = DecodedRecord::default();
    for (name, value) in wire.iter() {
        let Some(descriptor) = lookup(name) else {
            decoded.unknown.push(name.clone());
            continue;
        };
        match decode_field(descriptor, value) {
            Ok(v) => {
                decoded.record.insert(descriptor.name(), v);
            }
            Err(e) => decoded.failed.push((name.clone(), e)),
        }
    }
    decoded
}
