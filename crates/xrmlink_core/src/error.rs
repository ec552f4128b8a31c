//! Error types for xrmlink core.

use std::io;
use thiserror::Error;
use xrmlink_codec::CodecError;
use xrmlink_service::RemoteError;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in xrmlink core operations.
///
/// CRUD operations never return these directly; the executor turns them
/// into an error outcome carrying [`CoreError`]'s display text.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The remote service failed. Its own message is kept as-is.
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// A field value could not be encoded or decoded.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Store snapshot could not be written or read.
    #[error("snapshot error: {message}")]
    Snapshot {
        /// Description of the failure.
        message: String,
    },

    /// Connection not found.
    #[error("connection not found: {connection}")]
    ConnectionNotFound {
        /// The connection that was looked up.
        connection: String,
    },

    /// Entity definition not found.
    #[error("entity definition not found: {definition}")]
    DefinitionNotFound {
        /// The definition that was looked up.
        definition: String,
    },

    /// A definition has no usable field catalog.
    #[error("entity '{entity}' has no field catalog; save or regenerate its definition")]
    MissingCatalog {
        /// Logical name of the entity.
        entity: String,
    },

    /// Another connection already uses this name.
    #[error("Another connection already exists with this name, please choose another name.")]
    DuplicateConnectionName,

    /// The remote entity is already defined for this connection.
    #[error("This entity already exists for this connection.")]
    DuplicateEntity,

    /// An entity choice does not match the connection's entity list.
    #[error("Entity name must match name in list.")]
    UnknownEntityChoice,

    /// A connection cannot be removed while definitions use it.
    #[error("connection '{name}' is used by {definitions} entity definition(s)")]
    ConnectionInUse {
        /// Connection name.
        name: String,
        /// Number of definitions bound to it.
        definitions: usize,
    },

    /// Create was called without every required field.
    #[error("The following required fields are missing: {}.", .fields.join(", "))]
    MissingRequiredFields {
        /// Names of every missing field.
        fields: Vec<String>,
    },

    /// A record identifier was empty.
    #[error("Record identifier cannot be empty.")]
    EmptyIdentifier,

    /// A record identifier could not be parsed.
    #[error("'{value}' is not a valid record identifier.")]
    InvalidIdentifier {
        /// The rejected input.
        value: String,
    },

    /// The service answered a retrieve without a record.
    #[error("No record with that identifier could be found.")]
    RecordNotFound,

    /// Operation not permitted in current state.
    #[error("invalid operation: {message}")]
    InvalidOperation {
        /// Description of why the operation is invalid.
        message: String,
    },
}

impl CoreError {
    /// Creates a snapshot error.
    pub fn snapshot(message: impl Into<String>) -> Self {
        Self::Snapshot {
            message: message.into(),
        }
    }

    /// Creates a connection not found error.
    pub fn connection_not_found(connection: impl ToString) -> Self {
        Self::ConnectionNotFound {
            connection: connection.to_string(),
        }
    }

    /// Creates a definition not found error.
    pub fn definition_not_found(definition: impl ToString) -> Self {
        Self::DefinitionNotFound {
            definition: definition.to_string(),
        }
    }

    /// Creates a missing catalog error.
    pub fn missing_catalog(entity: impl Into<String>) -> Self {
        Self::MissingCatalog {
            entity: entity.into(),
        }
    }

    /// Creates a missing required fields error.
    pub fn missing_required(fields: Vec<String>) -> Self {
        Self::MissingRequiredFields { fields }
    }

    /// Creates an invalid operation error.
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation {
            message: message.into(),
        }
    }

    /// Returns true for configuration errors: an unresolved connection or
    /// definition, a missing catalog, or a duplicate binding.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            CoreError::ConnectionNotFound { .. }
                | CoreError::DefinitionNotFound { .. }
                | CoreError::MissingCatalog { .. }
                | CoreError::DuplicateConnectionName
                | CoreError::DuplicateEntity
                | CoreError::UnknownEntityChoice
        )
    }
}
