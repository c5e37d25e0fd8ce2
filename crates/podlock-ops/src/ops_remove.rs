//! Operation: remove a dependency from Podfile.toml.

use std::path::Path;

use toml_edit::{DocumentMut, Item};

use podlock_util::errors::PodlockError;

/// Options for `podlock remove`.
pub struct RemoveOptions {
    /// The package name.
    pub name: String,
    /// Remove from a specific target section only.
    pub target: Option<String>,
}

/// Remove a dependency from `Podfile.toml` using format-preserving edits.
///
/// Without a target, the package is removed from the shared table and
/// every target table it appears in. Removing a package that is not
/// declared anywhere is an error.
pub fn remove_dependency(manifest_path: &Path, opts: &RemoveOptions) -> miette::Result<()> {
    let content = std::fs::read_to_string(manifest_path).map_err(|e| {
        PodlockError::Manifest {
            message: format!("Failed to read {}: {e}", manifest_path.display()),
        }
    })?;

    let mut doc: DocumentMut = content.parse().map_err(|e| PodlockError::Manifest {
        message: format!("Failed to parse Podfile.toml: {e}"),
    })?;

    let mut removed = false;

    match &opts.target {
        Some(target) => {
            if let Some(deps) = target_table(&mut doc, target) {
                removed = deps.remove(&opts.name).is_some();
            }
        }
        None => {
            if let Some(Item::Table(deps)) = doc.get_mut("dependencies") {
                removed |= deps.remove(&opts.name).is_some();
            }
            let targets: Vec<String> = doc
                .get("target")
                .and_then(Item::as_table)
                .map(|t| t.iter().map(|(k, _)| k.to_string()).collect())
                .unwrap_or_default();
            for target in targets {
                if let Some(deps) = target_table(&mut doc, &target) {
                    removed |= deps.remove(&opts.name).is_some();
                }
            }
        }
    }

    if !removed {
        return Err(PodlockError::Manifest {
            message: format!("dependency {} is not declared", opts.name),
        }
        .into());
    }

    std::fs::write(manifest_path, doc.to_string())
        .map_err(|e| PodlockError::Io(e).into())
}

fn target_table<'a>(doc: &'a mut DocumentMut, target: &str) -> Option<&'a mut toml_edit::Table> {
    doc.get_mut("target")?
        .get_mut(target)?
        .get_mut("dependencies")?
        .as_table_mut()
}
