//! # xrmlink Service
//!
//! The contract xrmlink needs from the remote organization service, and an
//! in-memory implementation of it.
//!
//! This crate provides:
//! - Remote metadata types returned by describe and list calls
//! - The [`OrganizationService`] trait (describe, list, create, update,
//!   retrieve, retrieve all, delete)
//! - [`RemoteError`], which keeps the service's own messages intact
//! - [`InMemoryService`], loadable from a JSON fixture, for tests and tooling
//!
//! The real transport is supplied by the host. xrmlink never retries a
//! remote call and never enforces a timeout; both belong to the transport.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod memory;
mod metadata;
mod service;

pub use error::{RemoteError, RemoteResult};
pub use memory::{InMemoryService, ServiceCall, ServiceFixture};
pub use metadata::{
    AttributeMetadata, AttributeTypeCode, EntityMetadata, EntitySummary, OptionMetadata,
    RequiredLevel,
};
pub use service::OrganizationService;
