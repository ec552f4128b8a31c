//! # xrmlink Testkit
//!
//! Test utilities for xrmlink.
//!
//! This crate provides:
//! - Entity metadata fixtures and a ready-made test workspace
//! - Property-based test generators using proptest
//!
//! ## Usage
//!
//! ```rust,ignore
//! use xrmlink_testkit::prelude::*;
//!
//! #[test]
//! fn creates_a_contact() {
//!     with_workspace(|ws| {
//!         let id = ws.create_contact("Smith");
//!         assert!(ws.service.record_count("contact") == 1);
//!     });
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
}

pub use fixtures::*;
pub use generators::*;
