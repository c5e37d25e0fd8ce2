//! Operation: resolve all dependencies and write Podfile.lock.toml.

use std::path::Path;

use podlock_core::lockfile::{
    LockedDependencyRef, LockedPackage, LockedRootDependency, Lockfile,
};
use podlock_core::manifest::Manifest;
use podlock_core::{LOCKFILE_FILE, MANIFEST_FILE};
use podlock_resolver::resolver::{self, ResolutionResult};
use podlock_util::errors::PodlockError;
use podlock_util::progress::{spinner, status};

/// Resolve all dependencies and (re)write `Podfile.lock.toml`.
///
/// An existing lockfile's versions are kept where they still satisfy every
/// requirement. With `frozen`, nothing is written: the existing lockfile
/// must be present, current, and identical to what resolution would
/// produce, or the operation fails.
pub fn lock(project_root: &Path, frozen: bool, verbose: bool) -> miette::Result<()> {
    let manifest_path = project_root.join(MANIFEST_FILE);
    let manifest = Manifest::from_path(&manifest_path)?;
    let digest = manifest.declaration_digest()?;
    let source = resolver::build_spec_source(&manifest, project_root)?;

    let lockfile_path = project_root.join(LOCKFILE_FILE);
    let existing_lock = if lockfile_path.is_file() {
        Some(Lockfile::from_path(&lockfile_path)?)
    } else if frozen {
        return Err(PodlockError::Lockfile {
            message: format!("{LOCKFILE_FILE} is missing and --frozen was given"),
        }
        .into());
    } else {
        None
    };

    if frozen {
        if let Some(ref lock) = existing_lock {
            if lock.is_stale(&digest) {
                return Err(PodlockError::Lockfile {
                    message: format!(
                        "{MANIFEST_FILE} has changed since {LOCKFILE_FILE} was written"
                    ),
                }
                .into());
            }
        }
    }

    let sp = spinner("Resolving dependencies...");
    let result = resolver::resolve(&manifest, &source, existing_lock.as_ref(), &[])?;
    sp.finish_and_clear();

    if !result.restrictions.is_empty() && verbose {
        eprintln!("{}", result.restrictions);
    }

    let lockfile = Lockfile::generate(
        root_dependencies(&manifest)?,
        resolution_to_lockfile_packages(&result),
        digest,
    );

    if frozen {
        let expected = std::fs::read_to_string(&lockfile_path).map_err(PodlockError::Io)?;
        let actual = lockfile
            .to_string_pretty()
            .map_err(|e| PodlockError::Lockfile {
                message: format!("Failed to serialize lockfile: {e}"),
            })?;
        if expected != actual {
            return Err(PodlockError::Lockfile {
                message: format!(
                    "{LOCKFILE_FILE} is out of date with the registry and --frozen was given"
                ),
            }
            .into());
        }
        status("Verified", &format!("{LOCKFILE_FILE} is up to date"));
        return Ok(());
    }

    lockfile.write_to(&lockfile_path)?;
    status(
        "Locked",
        &format!("{} packages in {LOCKFILE_FILE}", result.packages.len()),
    );

    Ok(())
}

/// Convert resolution results into lockfile package entries.
pub fn resolution_to_lockfile_packages(result: &ResolutionResult) -> Vec<LockedPackage> {
    result
        .packages
        .iter()
        .map(|p| LockedPackage {
            name: p.name.clone(),
            version: p.version.to_string(),
            checksum: Some(p.checksum.clone()),
            path: p.path.clone(),
            dependencies: p
                .dependencies
                .iter()
                .map(|d| LockedDependencyRef {
                    name: d.name.clone(),
                    requirement: d.requirement.clone(),
                })
                .collect(),
        })
        .collect()
}

/// The manifest's declared dependencies as lockfile root entries.
pub fn root_dependencies(manifest: &Manifest) -> miette::Result<Vec<LockedRootDependency>> {
    Ok(manifest
        .declared()?
        .into_iter()
        .map(|d| LockedRootDependency {
            name: d.name,
            requirement: d.requirements.to_string(),
            path: d.path.map(|p| p.to_string_lossy().into_owned()),
        })
        .collect())
}
