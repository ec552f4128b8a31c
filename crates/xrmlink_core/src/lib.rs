//! # xrmlink Core
//!
//! Metadata-driven CRUD over a remote CRM service.
//!
//! This crate provides:
//! - Connection management with cached service handles
//! - Schema synchronization from live entity metadata into field catalogs
//! - Generated enumeration types for choice fields
//! - A definition store with atomic, versioned snapshots
//! - The CRUD executor and its success/error outcomes
//!
//! ## Flow
//!
//! 1. Save a [`Connection`] with [`DefinitionStore::save_connection`]; its
//!    entity list is fetched from the service.
//! 2. Pick an entity with [`SchemaSynchronizer::save_definition`]; the
//!    remote schema becomes a [`FieldDescriptorCatalog`].
//! 3. Run operations with [`CrudExecutor`].
//!
//! Catalogs are refreshed only on explicit [`SchemaSynchronizer::regenerate`].

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod catalog;
mod config;
mod connection;
mod connector;
pub mod crud;
mod definition;
mod enum_types;
mod error;
mod ids;
mod store;
mod sync;

pub use catalog::FieldDescriptorCatalog;
pub use config::StoreConfig;
pub use connection::{entity_choice, Connection, ConnectionSettings, Credential};
pub use connector::{CachedConnector, ServiceConnector};
pub use crud::{CrudExecutor, Operation, Outcome, UpdatePolicy};
pub use definition::EntityDefinition;
pub use enum_types::{
    clean_label, connection_namespace, member_name, EnumMember, EnumType, EnumTypeName,
    EnumTypeRegistry, NAMESPACE_PREFIX,
};
pub use error::{CoreError, CoreResult};
pub use ids::{ConnectionId, DefinitionId};
pub use store::{DefinitionStore, RefreshReport, SNAPSHOT_FORMAT_VERSION};
pub use sync::{
    build_catalog, field_display_name, map_attribute_type, CatalogBuild, SchemaSynchronizer,
};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
