//! Property-based test generators using proptest.
//!
//! Provides strategies for generating option lists, record identifiers and
//! canonical values.

use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;
use xrmlink_codec::{LookupValue, Value};
use xrmlink_service::{AttributeMetadata, AttributeTypeCode};

/// Strategy for generating option labels, possibly with one inner space.
pub fn option_label_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[A-Z][a-z]{0,8}( [A-Z][a-z]{0,8})?").expect("Invalid regex")
}

/// Strategy for generating option lists of up to `max` entries.
///
/// Labels are unique, and so are their member names once whitespace is
/// stripped. Codes are unique and in the range the remote service uses for
/// custom options.
pub fn option_list_strategy(max: usize) -> impl Strategy<Value = Vec<(String, i32)>> {
    prop::collection::btree_set(option_label_strategy(), 0..=max).prop_map(|labels| {
        let mut seen = std::collections::BTreeSet::new();
        labels
            .into_iter()
            .filter(|l| seen.insert(l.replace(' ', "").to_lowercase()))
            .enumerate()
            .map(|(i, label)| (label, 100_000_000 + i as i32))
            .collect()
    })
}

/// A picklist attribute offering the given options.
pub fn picklist_attribute(name: &str, options: &[(String, i32)]) -> AttributeMetadata {
    options.iter().fold(
        AttributeMetadata::new(name, AttributeTypeCode::Picklist),
        |attr, (label, code)| attr.with_option(label.clone(), *code),
    )
}

/// Strategy for generating record identifiers.
pub fn uuid_strategy() -> impl Strategy<Value = Uuid> {
    any::<u128>().prop_map(Uuid::from_u128)
}

/// Strategy for generating money amounts with two decimal places.
pub fn money_strategy() -> impl Strategy<Value = Decimal> {
    (-1_000_000_000i64..1_000_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy for generating lookups to the given entity.
pub fn lookup_strategy(entity_name: &'static str) -> impl Strategy<Value = LookupValue> {
    uuid_strategy().prop_map(move |id| LookupValue::new(entity_name, id.to_string()))
}

/// Strategy for generating scalar values: text, integers, finite numbers
/// and booleans.
pub fn scalar_value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        "[a-zA-Z0-9 ]{0,32}".prop_map(Value::Text),
        any::<i64>().prop_map(Value::Integer),
        any::<f64>()
            .prop_filter("Numbers must be finite", |n| n.is_finite())
            .prop_map(Value::Number),
        any::<bool>().prop_map(Value::Bool),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn option_lists_are_unique(options in option_list_strategy(12)) {
            let labels: std::collections::BTreeSet<_> = options.iter().map(|(l, _)| l).collect();
            let codes: std::collections::BTreeSet<_> = options.iter().map(|(_, c)| c).collect();
            prop_assert_eq!(labels.len(), options.len());
            prop_assert_eq!(codes.len(), options.len());
        }

        #[test]
        fn picklist_carries_every_option(options in option_list_strategy(8)) {
            let attr = picklist_attribute("statuscode", &options);
            prop_assert_eq!(attr.options.len(), options.len());
        }
    }
}
