//! Operation: check the lockfile for staleness and internal consistency.

use std::path::Path;

use podlock_core::lockfile::Lockfile;
use podlock_core::manifest::Manifest;
use podlock_core::requirement::RequirementSet;
use podlock_core::version::Version;
use podlock_core::{LOCKFILE_FILE, MANIFEST_FILE};
use podlock_util::errors::PodlockError;
use podlock_util::progress::status;

/// Check that the lockfile still matches the manifest and that the locked
/// graph is internally consistent: every recorded requirement of every
/// locked package must be satisfied by the locked version of its target.
pub fn check(project_root: &Path) -> miette::Result<()> {
    let manifest = Manifest::from_path(&project_root.join(MANIFEST_FILE))?;
    let lockfile = Lockfile::from_path(&project_root.join(LOCKFILE_FILE))?;

    let digest = manifest.declaration_digest()?;
    if lockfile.is_stale(&digest) {
        return Err(PodlockError::Lockfile {
            message: format!(
                "{MANIFEST_FILE} has changed since {LOCKFILE_FILE} was written \
                 (declaration checksum mismatch). Run `podlock lock`."
            ),
        }
        .into());
    }

    let mut problems: Vec<String> = Vec::new();

    // Declared dependencies must be locked and satisfied.
    for dep in manifest.declared()? {
        match locked_version(&lockfile, &dep.name)? {
            None => problems.push(format!("{} is declared but not locked", dep.name)),
            Some(version) => {
                if !dep.requirements.matches(&version) {
                    problems.push(format!(
                        "{} {} does not satisfy Podfile requirement {}",
                        dep.name, version, dep.requirements
                    ));
                }
            }
        }
    }

    // Every recorded sub-dependency requirement must be satisfied.
    for pkg in &lockfile.package {
        for dep in &pkg.dependencies {
            let requirements =
                RequirementSet::parse(&dep.requirement).map_err(|e| PodlockError::Lockfile {
                    message: format!("recorded requirement of {}: {e}", pkg.name),
                })?;
            match locked_version(&lockfile, &dep.name)? {
                None => problems.push(format!(
                    "{} requires {} which is not locked",
                    pkg.name, dep.name
                )),
                Some(version) => {
                    if !requirements.matches(&version) {
                        problems.push(format!(
                            "{} {} does not satisfy {} requirement {}",
                            dep.name, version, pkg.name, requirements
                        ));
                    }
                }
            }
        }
    }

    if problems.is_empty() {
        status(
            "Checked",
            &format!("{LOCKFILE_FILE} is current ({} packages)", lockfile.package.len()),
        );
        Ok(())
    } else {
        let details = problems.join("\n  ");
        Err(PodlockError::Lockfile {
            message: format!("lockfile is inconsistent:\n  {details}"),
        }
        .into())
    }
}

fn locked_version(lockfile: &Lockfile, name: &str) -> miette::Result<Option<Version>> {
    match lockfile.locked_version(name) {
        None => Ok(None),
        Some(raw) => Version::parse(raw)
            .map(Some)
            .map_err(|e| {
                PodlockError::Lockfile {
                    message: format!("locked version of {name}: {e}"),
                }
                .into()
            }),
    }
}
