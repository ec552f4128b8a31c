//! # xrmlink Codec
//!
//! Field descriptors and the bidirectional value codec for xrmlink.
//!
//! The remote service carries values in its own wire shapes (money
//! wrappers, option codes, entity references). Callers work with plain
//! canonical values. A [`FieldDescriptor`] says how one field moves between
//! the two:
//!
//! - Money: [`Value::Decimal`] locally, [`WireValue::Money`] on the wire
//! - Choice: the option label locally, its integer code on the wire
//! - Reference: a [`LookupValue`] locally, an [`EntityReference`] on the wire
//! - Identifier: text locally, a guid on the wire
//! - Scalar: passed through unchanged
//!
//! ## Soft failures
//!
//! An unknown option label or an incomplete lookup does not fail the
//! encode. [`encode_field`] returns [`Encoded::Skip`] and the caller leaves
//! the field off the wire record.
//!
//! ## Usage
//!
//! ```
//! use xrmlink_codec::{encode_field, decode_field, Encoded, FieldDescriptor, OptionSet, Value, WireValue};
//!
//! let status = FieldDescriptor::choice(
//!     "statuscode",
//!     "Status",
//!     OptionSet::from_pairs([("Active", 1), ("Inactive", 2)]),
//! );
//!
//! let encoded = encode_field(&status, &Value::from("Active")).unwrap();
//! assert_eq!(encoded, Encoded::Set(WireValue::OptionSetValue(1)));
//!
//! let decoded = decode_field(&status, &WireValue::OptionSetValue(2)).unwrap();
//! assert_eq!(decoded, Value::from("Inactive"));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod decoder;
mod descriptor;
mod encoder;
mod error;
mod value;
mod wire;

pub use decoder::{decode_field, decode_record, DecodedRecord};
pub use descriptor::{FieldDescriptor, FieldType, OptionEntry, OptionSet, ValueType};
pub use encoder::{encode_field, Encoded, SkipReason};
pub use error::{CodecError, CodecResult};
pub use value::{LookupValue, Record, Value};
pub use wire::{EntityReference, Money, WireRecord, WireValue};

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    fn round_trip(descriptor: &FieldDescriptor, value: &Value) -> Value {
        let wire = encode_field(descriptor, value)
            .unwrap()
            .into_wire()
            .expect("value should not be skipped");
        decode_field(descriptor, &wire).unwrap()
    }

    proptest! {
        #[test]
        fn text_round_trips(s in ".*") {
            let field = FieldDescriptor::scalar("description", "Description", ValueType::Text);
            let value = Value::Text(s);
            prop_assert_eq!(round_trip(&field, &value), value);
        }

        #[test]
        fn integer_round_trips(n in any::<i64>()) {
            let field = FieldDescriptor::scalar("numberofchildren", "Children", ValueType::Integer);
            prop_assert_eq!(round_trip(&field, &Value::Integer(n)), Value::Integer(n));
        }

        #[test]
        fn finite_number_round_trips(n in proptest::num::f64::NORMAL | proptest::num::f64::ZERO) {
            let field = FieldDescriptor::scalar("exchangerate", "Exchange Rate", ValueType::Number);
            prop_assert_eq!(round_trip(&field, &Value::Number(n)), Value::Number(n));
        }

        #[test]
        fn bool_round_trips(b in any::<bool>()) {
            let field = FieldDescriptor::scalar("donotemail", "Do Not Email", ValueType::Bool);
            prop_assert_eq!(round_trip(&field, &Value::Bool(b)), Value::Bool(b));
        }

        #[test]
        fn datetime_round_trips(
            secs in -62_135_596_800i64..253_402_300_799,
            nanos in 0u32..1_000_000_000,
        ) {
            let field = FieldDescriptor::scalar("birthdate", "Birthday", ValueType::DateTime);
            let value = Value::DateTime(Utc.timestamp_opt(secs, nanos).unwrap());
            prop_assert_eq!(round_trip(&field, &value), value);
        }

        #[test]
        fn money_round_trips(units in any::<i64>(), scale in 0u32..=10) {
            let field = FieldDescriptor::money("creditlimit", "Credit Limit");
            let value = Value::Decimal(Decimal::new(units, scale));
            prop_assert_eq!(round_trip(&field, &value), value);
        }

        #[test]
        fn reference_round_trips(bytes in any::<[u8; 16]>(), entity in "[a-z]{1,16}") {
            let field = FieldDescriptor::reference("parentcustomerid", "Company Name");
            let value = Value::Reference(LookupValue::new(entity, Uuid::from_bytes(bytes).to_string()));
            prop_assert_eq!(round_trip(&field, &value), value);
        }

        #[test]
        fn identifier_round_trips_modulo_case(bytes in any::<[u8; 16]>()) {
            let field = FieldDescriptor::identifier("contactid", "Contact");
            let id = Uuid::from_bytes(bytes);
            let value = Value::Text(id.to_string().to_uppercase());
            prop_assert_eq!(round_trip(&field, &value), Value::Text(id.to_string()));
        }
    }
}
