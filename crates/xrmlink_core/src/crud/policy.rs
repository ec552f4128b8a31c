//! Update-time null handling.

use xrmlink_codec::Value;

/// How update treats null and empty-string values.
///
/// Empty strings are normalized first, then the null rule applies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdatePolicy {
    /// Omit null values instead of clearing the remote field.
    pub treat_null_as_ignore: bool,

    /// Treat `""` as null.
    pub treat_empty_string_as_null: bool,
}

impl UpdatePolicy {
    /// Creates the default policy: nulls clear, empty strings are written.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether null values are omitted.
    #[must_use]
    pub const fn treat_null_as_ignore(mut self, value: bool) -> Self {
        self.treat_null_as_ignore = value;
        self
    }

    /// Sets whether empty strings count as null.
    #[must_use]
    pub const fn treat_empty_string_as_null(mut self, value: bool) -> Self {
        self.treat_empty_string_as_null = value;
        self
    }

    /// Applies the policy. `None` means leave the field off the update.
    pub fn apply(&self, value: &Value) -> Option<Value> {
        let value = if self.treat_empty_string_as_null && value.is_empty_text() {
            Value::Null
        } else {
            value.clone()
        };
        if value.is_null() && self.treat_null_as_ignore {
            None
        } else {
            Some(value)
        }
    }
}
