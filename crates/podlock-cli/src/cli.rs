//! CLI argument definitions for podlock.
//!
//! Uses `clap` derive macros to define the full command surface. Each
//! command corresponds to a handler in the [`super::commands`] module.

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "podlock",
    version,
    about = "A dependency lock resolver and verifier for pod-style packages",
    long_about = "podlock resolves declared dependency requirements against an on-disk \
                  specs registry, verifies content checksums, and writes a deterministic \
                  lockfile for reproducible installs."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve dependencies and write the lockfile
    Lock {
        /// Fail instead of writing when the lockfile is missing or out of date
        #[arg(long)]
        frozen: bool,
    },

    /// Verify locked checksums against the registry
    Verify,

    /// Check the lockfile for staleness and consistency
    Check,

    /// Print the resolved dependency tree
    Tree {
        /// Maximum depth
        #[arg(long)]
        depth: Option<u32>,
        /// Show inverted tree (dependents)
        #[arg(long)]
        inverted: bool,
        /// Explain why a package is included
        #[arg(long)]
        why: Option<String>,
        /// Show packages held below the newest registry version
        #[arg(long)]
        restrictions: bool,
    },

    /// Show direct dependencies with newer registry versions
    Outdated {
        /// Include major version bumps
        #[arg(long)]
        major: bool,
    },

    /// Add a dependency and re-resolve
    Add {
        /// Package name
        name: String,
        /// Requirement string, e.g. "~> 10.29"
        #[arg(long)]
        version: Option<String>,
        /// External source directory holding <name>.spec.toml
        #[arg(long)]
        path: Option<String>,
        /// Add to a specific target
        #[arg(long)]
        target: Option<String>,
    },

    /// Remove a dependency and re-resolve
    #[command(alias = "rm")]
    Remove {
        /// Package name
        name: String,
        /// Remove from a specific target only
        #[arg(long)]
        target: Option<String>,
    },

    /// Re-resolve with lockfile pins released
    Update {
        /// Only update these packages (all if omitted)
        packages: Vec<String>,
        /// Show what would be updated without changing files
        #[arg(long)]
        dry_run: bool,
    },
}

pub fn parse() -> Cli {
    Cli::parse()
}
