// src/config/mod.rs

//! Configuration loading and validation.
//!
//! - [`model`] mirrors the TOML layout (`[session]`, `[op.<key>]`).
//! - [`loader`] reads files from disk.
//! - [`validate`] turns a `RawConfigFile` into a checked `ConfigFile`.
//! - [`build`] registers the configured operations with a session.

pub mod build;
pub mod loader;
pub mod model;
pub mod validate;

pub use build::define_ops;
pub use loader::{DEFAULT_CONFIG_FILE, load_and_validate, load_from_path};
pub use model::{ConfigFile, OpConfig, RawConfigFile, SessionSection};
