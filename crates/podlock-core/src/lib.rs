//! Core data types for the podlock dependency lock tool.
//!
//! This crate defines the fundamental types of the lock pipeline: pod-style
//! versions and version requirements, dependency declarations, manifest
//! parsing, and the lockfile model with its deterministic writer.
//!
//! This crate is intentionally free of resolution logic and registry I/O.

/// Name of the manifest file a project root is identified by.
pub const MANIFEST_FILE: &str = "Podfile.toml";

/// Name of the lockfile written next to the manifest.
pub const LOCKFILE_FILE: &str = "Podfile.lock.toml";

/// Default registry directory, relative to the project root.
pub const DEFAULT_REGISTRY_DIR: &str = "specs";

pub mod dependency;
pub mod lockfile;
pub mod manifest;
pub mod requirement;
pub mod version;
