//! Create, update, retrieve, retrieve-all and delete against stored
//! entity definitions.
//!
//! [`CrudExecutor`] turns caller records into wire records through each
//! definition's catalog, and wire records back into caller records. Every
//! operation ends in an [`Outcome`] that takes the success path or the
//! error path.

mod choice;
mod executor;
mod outcome;
mod policy;

pub use choice::{resolve_by_enum_alias, resolve_by_label, resolve_label};
pub use executor::CrudExecutor;
pub use outcome::{Operation, Outcome, ERROR_MESSAGE_LABEL, PATH_ERROR, PATH_SUCCESS};
pub use policy::UpdatePolicy;
