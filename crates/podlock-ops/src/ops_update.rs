//! Operation: re-resolve dependencies with lockfile pins released.

use std::collections::BTreeMap;
use std::path::Path;

use podlock_core::lockfile::Lockfile;
use podlock_core::manifest::Manifest;
use podlock_core::{LOCKFILE_FILE, MANIFEST_FILE};
use podlock_resolver::resolver;
use podlock_util::errors::PodlockError;
use podlock_util::progress::{spinner, status};

use crate::ops_lock::{resolution_to_lockfile_packages, root_dependencies};

/// Options for `podlock update`.
#[derive(Default)]
pub struct UpdateOptions {
    /// Only release the pins of these packages (all pins if empty).
    pub packages: Vec<String>,
    /// Show what would change without writing the lockfile.
    pub dry_run: bool,
}

/// Re-resolve and rewrite the lockfile, ignoring existing pins for all or
/// named packages.
pub fn update(project_root: &Path, opts: &UpdateOptions) -> miette::Result<()> {
    let manifest = Manifest::from_path(&project_root.join(MANIFEST_FILE))?;
    let digest = manifest.declaration_digest()?;
    let source = resolver::build_spec_source(&manifest, project_root)?;

    let lockfile_path = project_root.join(LOCKFILE_FILE);
    let existing_lock = if lockfile_path.is_file() {
        Some(Lockfile::from_path(&lockfile_path)?)
    } else {
        None
    };

    if let Some(ref lock) = existing_lock {
        for name in &opts.packages {
            if lock.locked_package(name).is_none() {
                return Err(PodlockError::Generic {
                    message: format!("package {name} is not in the lockfile"),
                }
                .into());
            }
        }
    }

    let sp = spinner("Resolving dependencies...");
    let result = if opts.packages.is_empty() {
        // Update everything: resolve as if no lockfile existed
        resolver::resolve(&manifest, &source, None, &[])?
    } else {
        resolver::resolve(&manifest, &source, existing_lock.as_ref(), &opts.packages)?
    };
    sp.finish_and_clear();

    let changes = diff_versions(existing_lock.as_ref(), &result);
    if changes.is_empty() {
        status("Updated", "all packages already at the best versions");
        return Ok(());
    }

    for change in &changes {
        println!("{change}");
    }

    if opts.dry_run {
        status("Update", &format!("{} change(s), not written (dry run)", changes.len()));
        return Ok(());
    }

    let lockfile = Lockfile::generate(
        root_dependencies(&manifest)?,
        resolution_to_lockfile_packages(&result),
        digest,
    );
    lockfile.write_to(&lockfile_path)?;
    status("Updated", &format!("{} change(s) in {LOCKFILE_FILE}", changes.len()));

    Ok(())
}

/// Render the version changes between the old lockfile and a new
/// resolution, sorted by package name.
fn diff_versions(
    old: Option<&Lockfile>,
    result: &resolver::ResolutionResult,
) -> Vec<String> {
    let old_versions: BTreeMap<&str, &str> = old
        .map(|lock| {
            lock.package
                .iter()
                .map(|p| (p.name.as_str(), p.version.as_str()))
                .collect()
        })
        .unwrap_or_default();

    let mut changes = Vec::new();
    for pkg in &result.packages {
        match old_versions.get(pkg.name.as_str()) {
            None => changes.push(format!("+ {} {}", pkg.name, pkg.version)),
            Some(old_version) if *old_version != pkg.version.as_str() => {
                changes.push(format!("{} {} -> {}", pkg.name, old_version, pkg.version));
            }
            Some(_) => {}
        }
    }
    for (name, version) in &old_versions {
        if !result.packages.iter().any(|p| p.name == *name) {
            changes.push(format!("- {name} {version}"));
        }
    }
    changes.sort_by(|a, b| {
        a.trim_start_matches(['+', '-', ' '])
            .cmp(b.trim_start_matches(['+', '-', ' ']))
    });
    changes
}
