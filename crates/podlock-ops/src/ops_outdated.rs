//! Operation: check for outdated direct dependencies.

use std::path::Path;

use podlock_core::lockfile::Lockfile;
use podlock_core::manifest::Manifest;
use podlock_core::{LOCKFILE_FILE, MANIFEST_FILE};
use podlock_resolver::resolver;
use podlock_util::progress::{status, status_info};

/// Options for `podlock outdated`.
#[derive(Default)]
pub struct OutdatedOptions {
    /// Include major version bumps.
    pub major: bool,
}

/// A single outdated dependency entry.
struct OutdatedEntry {
    name: String,
    current: String,
    latest: String,
    is_major: bool,
}

/// Compare each direct dependency's resolved version against the newest
/// registry version and print a report.
pub fn outdated(project_root: &Path, opts: &OutdatedOptions) -> miette::Result<()> {
    let manifest = Manifest::from_path(&project_root.join(MANIFEST_FILE))?;
    let source = resolver::build_spec_source(&manifest, project_root)?;

    let lockfile_path = project_root.join(LOCKFILE_FILE);
    let existing_lock = if lockfile_path.is_file() {
        Lockfile::from_path(&lockfile_path).ok()
    } else {
        None
    };

    let result = resolver::resolve(&manifest, &source, existing_lock.as_ref(), &[])?;

    let mut entries: Vec<OutdatedEntry> = Vec::new();
    for dep in manifest.declared()? {
        if dep.path.is_some() {
            continue;
        }
        let Some(current) = result.packages.iter().find(|p| p.name == dep.name) else {
            continue;
        };
        let Some(latest) = source.registry().latest(&dep.name)? else {
            continue;
        };
        if latest <= current.version {
            continue;
        }
        let is_major = latest.major() > current.version.major();
        if is_major && !opts.major {
            continue;
        }
        entries.push(OutdatedEntry {
            name: dep.name.clone(),
            current: current.version.to_string(),
            latest: latest.to_string(),
            is_major,
        });
    }

    if entries.is_empty() {
        status("Outdated", "all direct dependencies are up to date");
        return Ok(());
    }

    status_info("Outdated", &format!("{} dependencies", entries.len()));
    for entry in &entries {
        let marker = if entry.is_major { " (major)" } else { "" };
        println!("{} {} -> {}{marker}", entry.name, entry.current, entry.latest);
    }

    Ok(())
}
