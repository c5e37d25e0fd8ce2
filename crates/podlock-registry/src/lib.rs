//! On-disk specs repository for podlock.
//!
//! A registry is a directory tree of `<name>/<version>/Spec.toml` files
//! describing every published package version: its dependency requirements
//! and the content that gets checksummed into lockfiles. How those files
//! arrive on disk (a git checkout, a vendored copy) is outside this
//! crate's concern; nothing here touches the network.

pub mod checksum;
pub mod registry;
pub mod spec;

pub use registry::{Registry, SpecSource};
pub use spec::Spec;
