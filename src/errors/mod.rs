//! # Error Handling
//!
//! Error types for the gateway composer, built with `thiserror`.
//!
//! The taxonomy mirrors the composer's phases: configuration errors are
//! detected in a pure pre-flight pass before any external resource is
//! touched, provisioning errors only during the long-running external
//! steps, and reference errors whenever a rule or attachment points at a
//! resource the composing gateway does not own.

pub mod types;

pub use types::{
    ConfigurationError, Error, ProvisioningError, ReferenceError, Result,
};
