//! Two-step resolution of choice values.
//!
//! A label is first matched against the option set. If that misses, the
//! value is tried as a member name of the field's enumeration type, and the
//! member's label is matched instead.

use crate::enum_types::EnumType;
use xrmlink_codec::OptionSet;

/// Code of the option with exactly this label.
pub fn resolve_by_label(options: &OptionSet, label: &str) -> Option<i32> {
    options.code_for(label)
}

/// Code of the option whose label belongs to the enumeration member named
/// `member` (case-insensitive).
pub fn resolve_by_enum_alias(options: &OptionSet, enum_type: &EnumType, member: &str) -> Option<i32> {
    let member = enum_type.member(member)?;
    options.code_for(&member.label)
}

/// Resolves a choice value to the label the option set knows it by.
pub fn resolve_label<'a>(
    options: &'a OptionSet,
    enum_type: Option<&EnumType>,
    value: &str,
) -> Option<&'a str> {
    let code = resolve_by_label(options, value)
        .or_else(|| enum_type.and_then(|t| resolve_by_enum_alias(options, t, value)))?;
    options.label_for(code)
}
