//! Error types for the codec crate.

use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while encoding or decoding a field value.
///
/// These are hard failures. Values the codec can tolerate (an unknown
/// option label, an incomplete lookup) are reported as a skip instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The value's variant does not fit the field's declared type.
    #[error("field '{field}' expects {expected}, got {found}")]
    TypeMismatch {
        /// Logical name of the field.
        field: String,
        /// What the field accepts.
        expected: String,
        /// The variant that was supplied.
        found: String,
    },

    /// A string could not be parsed as a record identifier.
    #[error("field '{field}': '{value}' is not a valid identifier")]
    InvalidIdentifier {
        /// Logical name of the field.
        field: String,
        /// The rejected input.
        value: String,
    },

    /// A number could not be represented as a decimal.
    #[error("field '{field}': {value} cannot be represented as a decimal")]
    DecimalOutOfRange {
        /// Logical name of the field.
        field: String,
        /// The rejected number, formatted.
        value: String,
    },
}

impl CodecError {
    /// Create a type mismatch error.
    pub fn type_mismatch(
        field: impl Into<String>,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Self::TypeMismatch {
            field: field.into(),
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Create an invalid identifier error.
    pub fn invalid_identifier(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidIdentifier {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Returns the logical name of the field that failed.
    pub fn field(&self) -> &str {
        match self {
            Self::TypeMismatch { field, .. }
            | Self::InvalidIdentifier { field, .. }
            | Self::DecimalOutOfRange { field, .. } => field,
        }
    }
}
