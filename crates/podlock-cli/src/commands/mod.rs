//! Command dispatch and handler modules.

mod add;
mod check;
mod lock;
mod outdated;
mod remove;
mod tree;
mod update;
mod verify;

use std::path::PathBuf;

use miette::Result;

use crate::cli::{Cli, Command};
use podlock_core::MANIFEST_FILE;
use podlock_util::errors::PodlockError;

/// Route a parsed CLI invocation to the appropriate command handler.
pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Lock { frozen } => lock::exec(frozen, cli.verbose),
        Command::Verify => verify::exec(),
        Command::Check => check::exec(),
        Command::Tree {
            depth,
            inverted,
            why,
            restrictions,
        } => tree::exec(depth, inverted, why, restrictions),
        Command::Outdated { major } => outdated::exec(major),
        Command::Add {
            name,
            version,
            path,
            target,
        } => add::exec(&name, version, path, target, cli.verbose),
        Command::Remove { name, target } => remove::exec(&name, target, cli.verbose),
        Command::Update { packages, dry_run } => update::exec(packages, dry_run),
    }
}

/// Locate the project root: the nearest ancestor of the current directory
/// containing a Podfile.toml.
pub fn project_root() -> Result<PathBuf> {
    let cwd = std::env::current_dir().map_err(PodlockError::Io)?;
    podlock_util::fs::find_ancestor_with(&cwd, MANIFEST_FILE).ok_or_else(|| {
        PodlockError::Manifest {
            message: format!("No {MANIFEST_FILE} found in this or any parent directory"),
        }
        .into()
    })
}
