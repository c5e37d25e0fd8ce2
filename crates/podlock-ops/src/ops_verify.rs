//! Operation: verify locked checksums against current registry content.

use std::path::Path;

use podlock_core::lockfile::Lockfile;
use podlock_core::manifest::Manifest;
use podlock_core::version::Version;
use podlock_core::{LOCKFILE_FILE, MANIFEST_FILE};
use podlock_registry::registry::path_spec;
use podlock_registry::{checksum, Registry};
use podlock_util::errors::PodlockError;
use podlock_util::progress::{progress_bar, status};

/// Recompute every locked package's spec checksum and compare it to the
/// recorded value.
///
/// Reports all mismatches at once rather than failing on the first one.
pub fn verify(project_root: &Path) -> miette::Result<()> {
    let manifest = Manifest::from_path(&project_root.join(MANIFEST_FILE))?;
    let lockfile = Lockfile::from_path(&project_root.join(LOCKFILE_FILE))?;
    let registry = Registry::open(manifest.registry_dir(project_root))?;

    let mut mismatches: Vec<String> = Vec::new();
    let mut verified = 0u32;
    let mut skipped = 0u32;

    let pb = progress_bar(lockfile.package.len() as u64, "Verifying");
    for pkg in &lockfile.package {
        pb.inc(1);

        let expected = match &pkg.checksum {
            Some(c) if !c.is_empty() => c,
            _ => {
                skipped += 1;
                continue;
            }
        };

        let spec = match &pkg.path {
            Some(path) => path_spec(&project_root.join(path), &pkg.name),
            None => {
                let version =
                    Version::parse(&pkg.version).map_err(|e| PodlockError::Lockfile {
                        message: format!("locked version of {}: {e}", pkg.name),
                    })?;
                registry.spec(&pkg.name, &version)
            }
        };

        let spec = match spec {
            Ok(spec) => spec,
            Err(_) => {
                mismatches.push(format!(
                    "{} {}\n  spec is no longer available",
                    pkg.name, pkg.version
                ));
                continue;
            }
        };

        match checksum::verify(&pkg.name, expected, spec.content.as_bytes()) {
            Ok(()) => verified += 1,
            Err(e) => mismatches.push(e.to_string()),
        }
    }
    pb.finish_and_clear();

    if mismatches.is_empty() {
        status(
            "Verified",
            &format!("{verified} checksums ({skipped} skipped, no recorded checksum)"),
        );
        Ok(())
    } else {
        let count = mismatches.len();
        let details = mismatches.join("\n");
        Err(PodlockError::Generic {
            message: format!(
                "{count} checksum mismatch(es) detected:\n{details}\n\n\
                 The registry content diverged from the lockfile. \
                 Re-run `podlock lock` if this is intentional."
            ),
        }
        .into())
    }
}
