//! Common utilities shared by the tabbench crates.
//!
//! This crate provides the error type, dataset location handling on top of
//! object_store, and the tracing setup used by the binaries.

pub mod error;
pub mod location;
pub mod logging;

pub use error::{CommonError, ErrorContext, Result};
pub use location::{Location, RemoteScheme};
pub use logging::init_tracing;
