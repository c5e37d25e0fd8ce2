use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::dependency::{DeclaredDependency, Dependency};
use crate::DEFAULT_REGISTRY_DIR;

/// The parsed representation of a `Podfile.toml` file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub project: ProjectMetadata,

    #[serde(default)]
    pub registry: Option<RegistryConfig>,

    #[serde(default)]
    pub dependencies: BTreeMap<String, Dependency>,

    #[serde(default)]
    pub target: BTreeMap<String, TargetDependencies>,
}

/// Project identity from the `[project]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectMetadata {
    pub name: String,
    #[serde(default)]
    pub platform: Option<String>,
}

/// Registry location from the `[registry]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    pub path: String,
}

/// Per-target dependencies from `[target.<name>.dependencies]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetDependencies {
    #[serde(default)]
    pub dependencies: BTreeMap<String, Dependency>,
}

impl Manifest {
    /// Load and parse a `Podfile.toml` file from the given path.
    pub fn from_path(path: &Path) -> miette::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            podlock_util::errors::PodlockError::Manifest {
                message: format!("Failed to read {}: {e}", path.display()),
            }
        })?;
        Self::from_str(&content)
    }

    /// Parse a `Podfile.toml` from a string.
    ///
    /// Declared dependencies are validated eagerly so malformed requirement
    /// strings surface at load time, not mid-resolution.
    pub fn from_str(content: &str) -> miette::Result<Self> {
        let manifest: Self = toml::from_str(content).map_err(|e| {
            podlock_util::errors::PodlockError::Manifest {
                message: format!("Failed to parse Podfile.toml: {e}"),
            }
        })?;
        manifest.declared()?;
        Ok(manifest)
    }

    /// The registry directory, resolved against the project root.
    pub fn registry_dir(&self, project_root: &Path) -> PathBuf {
        let configured = self
            .registry
            .as_ref()
            .map(|r| r.path.as_str())
            .unwrap_or(DEFAULT_REGISTRY_DIR);
        let path = Path::new(configured);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            project_root.join(path)
        }
    }

    /// All top-level dependencies, merged across the shared table and every
    /// target table. A package declared in several places keeps one entry
    /// whose requirements are the conjunction of all of them; declaring the
    /// same package with two different external-source paths is an error.
    pub fn declared(&self) -> miette::Result<Vec<DeclaredDependency>> {
        let mut merged: BTreeMap<String, DeclaredDependency> = BTreeMap::new();

        let tables = std::iter::once(&self.dependencies)
            .chain(self.target.values().map(|t| &t.dependencies));

        for table in tables {
            for (name, dep) in table {
                let entry = DeclaredDependency::from_entry(name, dep).map_err(|e| {
                    podlock_util::errors::PodlockError::Manifest {
                        message: format!("dependency {name}: {e}"),
                    }
                })?;
                match merged.get_mut(name) {
                    None => {
                        merged.insert(name.clone(), entry);
                    }
                    Some(existing) => {
                        if existing.path != entry.path {
                            return Err(podlock_util::errors::PodlockError::Manifest {
                                message: format!(
                                    "dependency {name} is declared with two different paths"
                                ),
                            }
                            .into());
                        }
                        existing.requirements.extend_from(&entry.requirements);
                    }
                }
            }
        }

        Ok(merged.into_values().collect())
    }

    /// Digest of the declaration input, recorded in the lockfile and
    /// recomputed on each load to detect drift.
    ///
    /// Only the resolved declaration set matters: formatting, comments, and
    /// table ordering in Podfile.toml do not invalidate a lockfile.
    pub fn declaration_digest(&self) -> miette::Result<String> {
        let declared = self.declared()?;
        let mut canonical = String::new();
        for dep in &declared {
            canonical.push_str(&dep.name);
            canonical.push('|');
            canonical.push_str(&dep.requirements.to_string());
            if let Some(path) = &dep.path {
                canonical.push('|');
                canonical.push_str(&path.to_string_lossy());
            }
            canonical.push('\n');
        }
        Ok(podlock_util::hash::sha256_bytes(canonical.as_bytes()))
    }
}
