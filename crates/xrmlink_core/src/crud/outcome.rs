//! Operation outcomes and host-facing names.

use crate::error::CoreResult;
use crate::ids::DefinitionId;
use std::fmt;
use tracing::warn;

/// Name of the success path.
pub const PATH_SUCCESS: &str = "Success";

/// Name of the error path.
pub const PATH_ERROR: &str = "Error";

/// Label of the error path's payload.
pub const ERROR_MESSAGE_LABEL: &str = "Error Message";

/// The result of a CRUD operation: a payload or a message, never both.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// The operation succeeded.
    Success(T),
    /// The operation failed.
    Error {
        /// Human-readable message.
        message: String,
    },
}

impl<T> Outcome<T> {
    /// Name of the path this outcome takes.
    pub fn path_name(&self) -> &'static str {
        match self {
            Outcome::Success(_) => PATH_SUCCESS,
            Outcome::Error { .. } => PATH_ERROR,
        }
    }

    /// Returns true on success.
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    /// The payload, if successful.
    pub fn success(self) -> Option<T> {
        match self {
            Outcome::Success(v) => Some(v),
            Outcome::Error { .. } => None,
        }
    }

    /// The message, if failed.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Outcome::Success(_) => None,
            Outcome::Error { message } => Some(message),
        }
    }

    pub(crate) fn from_result(
        operation: Operation,
        definition: DefinitionId,
        result: CoreResult<T>,
    ) -> Self {
        match result {
            Ok(v) => Outcome::Success(v),
            Err(e) => {
                warn!(%operation, %definition, error = %e, "operation failed");
                Outcome::Error {
                    message: e.to_string(),
                }
            }
        }
    }
}

/// The five CRUD operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Create one record.
    Create,
    /// Update one record.
    Update,
    /// Retrieve one record.
    Retrieve,
    /// Retrieve every record.
    RetrieveAll,
    /// Delete one record.
    Delete,
}

impl Operation {
    /// Every operation.
    pub const ALL: [Operation; 5] = [
        Operation::Create,
        Operation::Update,
        Operation::Retrieve,
        Operation::RetrieveAll,
        Operation::Delete,
    ];

    /// Step name shown to the host, e.g. `Add Contact Entity`.
    pub fn step_name(self, entity_display_name: &str) -> String {
        match self {
            Operation::Create => format!("Add {entity_display_name} Entity"),
            Operation::Update => format!("Update {entity_display_name} Entity"),
            Operation::Retrieve => format!("Get {entity_display_name} Entity By Id"),
            Operation::RetrieveAll => format!("Get All {entity_display_name} Entities"),
            Operation::Delete => format!("Delete {entity_display_name} Entity"),
        }
    }

    /// Label of the success payload, if the operation has one.
    pub fn payload_label(self, entity_display_name: &str) -> Option<String> {
        match self {
            Operation::Create => Some(format!("Added {entity_display_name} Id")),
            Operation::Retrieve => Some(format!("{entity_display_name} Entity")),
            Operation::RetrieveAll => Some(format!("{entity_display_name} Entities")),
            Operation::Update | Operation::Delete => None,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Retrieve => "retrieve",
            Operation::RetrieveAll => "retrieve_all",
            Operation::Delete => "delete",
        };
        f.write_str(name)
    }
}
