//! Canonical-to-wire encoding.

use crate::descriptor::{FieldDescriptor, FieldType};
use crate::error::{CodecError, CodecResult};
use crate::value::{LookupValue, Value};
use crate::wire::{EntityReference, Money, WireValue};
use rust_decimal::Decimal;
use std::fmt;
use uuid::Uuid;

/// Outcome of encoding one field.
#[derive(Debug, Clone, PartialEq)]
pub enum Encoded {
    /// Put this value on the wire record.
    Set(WireValue),
    /// Leave the field off the wire record.
    Skip(SkipReason),
}

impl Encoded {
    /// Returns the wire value, if the field was not skipped.
    pub fn into_wire(self) -> Option<WireValue> {
        match self {
            Encoded::Set(v) => Some(v),
            Encoded::Skip(_) => None,
        }
    }

    /// Returns true if the field was skipped.
    pub fn is_skip(&self) -> bool {
        matches!(self, Encoded::Skip(_))
    }
}

/// Why a field was left off the wire record.
///
/// Skips are soft: the operation carries on with the remaining fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// No option carries this label.
    UnknownOption {
        /// The label that was supplied.
        label: String,
    },
    /// No option carries this code.
    UnknownCode {
        /// The code that was supplied.
        code: i64,
    },
    /// A lookup is missing its entity name or identifier.
    IncompleteReference,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::UnknownOption { label } => {
                write!(f, "option label '{label}' not found in option set")
            }
            SkipReason::UnknownCode { code } => {
                write!(f, "option code {code} not found in option set")
            }
            SkipReason::IncompleteReference => f.write_str("lookup field value not complete"),
        }
    }
}

/// Encode a canonical value for the given field.
///
/// `Null` always encodes to the clear marker; callers apply update policies
/// before getting here.
///
/// # Errors
///
/// Returns an error if the value's variant cannot represent the field's
/// type, or an identifier string does not parse.
pub fn encode_field(descriptor: &FieldDescriptor, value: &Value) -> CodecResult<Encoded> {
    if value.is_null() {
        return Ok(Encoded::Set(WireValue::Null));
    }

    match descriptor.field_type() {
        FieldType::Money => encode_money(descriptor, value).map(Encoded::Set),
        FieldType::Choice => encode_choice(descriptor, value),
        FieldType::Reference => encode_reference(descriptor, value),
        FieldType::Identifier => encode_identifier(descriptor, value).map(Encoded::Set),
        FieldType::Scalar => encode_scalar(descriptor, value).map(Encoded::Set),
    }
}

fn encode_money(descriptor: &FieldDescriptor, value: &Value) -> CodecResult<WireValue> {
    let amount = match value {
        Value::Decimal(d) => *d,
        Value::Integer(n) => Decimal::from(*n),
        Value::Number(n) => Decimal::try_from(*n).map_err(|_| CodecError::DecimalOutOfRange {
            field: descriptor.name().to_string(),
            value: n.to_string(),
        })?,
        other => {
            return Err(CodecError::type_mismatch(
                descriptor.name(),
                "a decimal amount",
                other.kind(),
            ))
        }
    };
    Ok(WireValue::Money(Money(amount)))
}

fn encode_choice(descriptor: &FieldDescriptor, value: &Value) -> CodecResult<Encoded> {
    let options = descriptor.option_set();
    match value {
        Value::Text(label) => Ok(options
            .and_then(|o| o.code_for(label))
            .map_or_else(
                || {
                    Encoded::Skip(SkipReason::UnknownOption {
                        label: label.clone(),
                    })
                },
                |code| Encoded::Set(WireValue::OptionSetValue(code)),
            )),
        // Raw codes are accepted so decoded records can be written back.
        Value::Integer(n) => {
            let code = i32::try_from(*n)
                .ok()
                .filter(|c| options.is_some_and(|o| o.contains_code(*c)));
            Ok(code.map_or(Encoded::Skip(SkipReason::UnknownCode { code: *n }), |c| {
                Encoded::Set(WireValue::OptionSetValue(c))
            }))
        }
        other => Err(CodecError::type_mismatch(
            descriptor.name(),
            "an option label",
            other.kind(),
        )),
    }
}

fn encode_reference(descriptor: &FieldDescriptor, value: &Value) -> CodecResult<Encoded> {
    let Value::Reference(lookup) = value else {
        return Err(CodecError::type_mismatch(
            descriptor.name(),
            "a lookup",
            value.kind(),
        ));
    };
    if !lookup.is_complete() {
        return Ok(Encoded::Skip(SkipReason::IncompleteReference));
    }
    let id = parse_id(descriptor, &lookup.id)?;
    Ok(Encoded::Set(WireValue::EntityReference(EntityReference::new(
        lookup.entity_name.clone(),
        id,
    ))))
}

fn encode_identifier(descriptor: &FieldDescriptor, value: &Value) -> CodecResult<WireValue> {
    match value {
        Value::Text(s) => parse_id(descriptor, s).map(WireValue::Guid),
        other => Err(CodecError::type_mismatch(
            descriptor.name(),
            "an identifier string",
            other.kind(),
        )),
    }
}

fn encode_scalar(descriptor: &FieldDescriptor, value: &Value) -> CodecResult<WireValue> {
    Ok(match value {
        Value::Null => WireValue::Null,
        Value::Text(s) => WireValue::String(s.clone()),
        Value::Integer(n) => WireValue::Integer(*n),
        Value::Number(n) => WireValue::Double(*n),
        Value::Decimal(d) => WireValue::Decimal(*d),
        Value::Bool(b) => WireValue::Boolean(*b),
        Value::DateTime(t) => WireValue::DateTime(*t),
        Value::Reference(LookupValue { .. }) => {
            return Err(CodecError::type_mismatch(
                descriptor.name(),
                format!("a {} value", descriptor.value_type()),
                "reference",
            ))
        }
    })
}

fn parse_id(descriptor: &FieldDescriptor, raw: &str) -> CodecResult<Uuid> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| CodecError::invalid_identifier(descriptor.name(), raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{OptionSet, ValueType};

    fn status() -> FieldDescriptor {
        FieldDescriptor::choice(
            "statuscode",
            "Status",
            OptionSet::from_pairs([("Active", 1), ("Inactive", 2)]),
        )
        .with_updatable(true)
    }

    #[test]
    fn null_encodes_to_clear_marker() {
        for descriptor in [
            status(),
            FieldDescriptor::money("creditlimit", "Credit Limit"),
            FieldDescriptor::reference("parentcustomerid", "Company Name"),
            FieldDescriptor::scalar("lastname", "Last Name", ValueType::Text),
        ] {
            assert_eq!(
                encode_field(&descriptor, &Value::Null).unwrap(),
                Encoded::Set(WireValue::Null)
            );
        }
    }

    #[test]
    fn money_wraps_decimal() {
        let field = FieldDescriptor::money("creditlimit", "Credit Limit");
        let amount = Decimal::new(150_075, 2);

        let encoded = encode_field(&field, &Value::Decimal(amount)).unwrap();
        assert_eq!(encoded, Encoded::Set(WireValue::Money(Money(amount))));

        let encoded = encode_field(&field, &Value::Integer(10)).unwrap();
        assert_eq!(encoded, Encoded::Set(WireValue::Money(Money(Decimal::from(10)))));

        let err = encode_field(&field, &Value::Bool(true)).unwrap_err();
        assert!(matches!(err, CodecError::TypeMismatch { .. }));
    }

    #[test]
    fn money_rejects_non_finite_numbers() {
        let field = FieldDescriptor::money("creditlimit", "Credit Limit");
        let err = encode_field(&field, &Value::Number(f64::INFINITY)).unwrap_err();
        assert!(matches!(err, CodecError::DecimalOutOfRange { .. }));
    }

    #[test]
    fn choice_label_yields_code() {
        let encoded = encode_field(&status(), &Value::Text("Inactive".into())).unwrap();
        assert_eq!(encoded, Encoded::Set(WireValue::OptionSetValue(2)));
    }

    #[test]
    fn choice_unknown_label_is_skipped() {
        let encoded = encode_field(&status(), &Value::Text("Unknown".into())).unwrap();
        assert_eq!(
            encoded,
            Encoded::Skip(SkipReason::UnknownOption {
                label: "Unknown".into()
            })
        );
        assert!(encoded.into_wire().is_none());
    }

    #[test]
    fn choice_accepts_known_codes_only() {
        assert_eq!(
            encode_field(&status(), &Value::Integer(1)).unwrap(),
            Encoded::Set(WireValue::OptionSetValue(1))
        );
        assert_eq!(
            encode_field(&status(), &Value::Integer(7)).unwrap(),
            Encoded::Skip(SkipReason::UnknownCode { code: 7 })
        );
    }

    #[test]
    fn incomplete_reference_is_skipped() {
        let field = FieldDescriptor::reference("parentcustomerid", "Company Name");
        for lookup in [
            LookupValue::new("", Uuid::new_v4().to_string()),
            LookupValue::new("account", ""),
        ] {
            let encoded = encode_field(&field, &Value::Reference(lookup)).unwrap();
            assert_eq!(encoded, Encoded::Skip(SkipReason::IncompleteReference));
        }
    }

    #[test]
    fn reference_with_bad_id_is_an_error() {
        let field = FieldDescriptor::reference("parentcustomerid", "Company Name");
        let lookup = LookupValue::new("account", "not-a-guid");
        let err = encode_field(&field, &Value::Reference(lookup)).unwrap_err();
        assert_eq!(
            err,
            CodecError::invalid_identifier("parentcustomerid", "not-a-guid")
        );
    }

    #[test]
    fn reference_encodes_entity_reference() {
        let field = FieldDescriptor::reference("parentcustomerid", "Company Name");
        let id = Uuid::new_v4();
        let lookup = LookupValue::new("account", id.to_string());
        let encoded = encode_field(&field, &Value::Reference(lookup)).unwrap();
        assert_eq!(
            encoded,
            Encoded::Set(WireValue::EntityReference(EntityReference::new("account", id)))
        );
    }

    #[test]
    fn scalars_pass_through() {
        let field = FieldDescriptor::scalar("numberofchildren", "No. of Children", ValueType::Integer);
        assert_eq!(
            encode_field(&field, &Value::Integer(3)).unwrap(),
            Encoded::Set(WireValue::Integer(3))
        );

        let field = FieldDescriptor::scalar("lastname", "Last Name", ValueType::Text);
        assert_eq!(
            encode_field(&field, &Value::Text(String::new())).unwrap(),
            Encoded::Set(WireValue::String(String::new()))
        );
    }

    #[test]
    fn scalar_rejects_lookup() {
        let field = FieldDescriptor::scalar("lastname", "Last Name", ValueType::Text);
        let lookup = Value::Reference(LookupValue::new("account", "x"));
        assert!(encode_field(&field, &lookup).is_err());
    }

    #[test]
    fn identifier_parses_uuid() {
        let field = FieldDescriptor::identifier("contactid", "Contact");
        let id = Uuid::new_v4();
        let upper = id.to_string().to_uppercase();
        assert_eq!(
            encode_field(&field, &Value::Text(upper)).unwrap(),
            Encoded::Set(WireValue::Guid(id))
        );
    }

    #[test]
    fn skip_reason_display() {
        let reason = SkipReason::UnknownOption {
            label: "Unknown".into(),
        };
        assert_eq!(reason.to_string(), "option label 'Unknown' not found in option set");
    }
}
