use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use podlock_util::errors::PodlockError;

/// The tool version stamped into every lockfile written by this build.
pub const TOOL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Header comment emitted at the top of every lockfile.
const LOCKFILE_HEADER: &str = "# This file is generated by podlock. Do not edit it manually.\n";

/// Deterministic lockfile recording exact resolved dependency versions.
///
/// Field order matters: it is the serialization order of the file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lockfile {
    /// Version of the tool that wrote the file.
    pub version: String,

    /// Digest of the manifest declarations the file was resolved from.
    #[serde(rename = "podfile-checksum")]
    pub podfile_checksum: String,

    /// The declared top-level dependencies, as resolved.
    pub root: RootSection,

    #[serde(default)]
    pub package: Vec<LockedPackage>,
}

/// Top-level declared dependencies recorded in the lockfile.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RootSection {
    #[serde(default)]
    pub dependencies: Vec<LockedRootDependency>,
}

/// One declared dependency as it was when the lockfile was written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockedRootDependency {
    pub name: String,
    pub requirement: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// A single locked package with its resolved version and checksum.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockedPackage {
    pub name: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
    /// External-source directory the spec was loaded from, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<LockedDependencyRef>,
}

/// A reference to a sub-dependency within a locked package, recorded with
/// the requirement the package imposes rather than the resolved version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockedDependencyRef {
    pub name: String,
    pub requirement: String,
}

impl fmt::Display for LockedDependencyRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.requirement)
    }
}

impl Lockfile {
    /// Build a lockfile from resolution output, in stable order: packages
    /// alphabetical by name, each package's sub-dependencies alphabetical,
    /// root dependencies alphabetical. Identical inputs serialize to
    /// byte-identical files.
    pub fn generate(
        mut root: Vec<LockedRootDependency>,
        mut packages: Vec<LockedPackage>,
        podfile_checksum: String,
    ) -> Self {
        root.sort_by(|a, b| a.name.cmp(&b.name));
        packages.sort_by(|a, b| a.name.cmp(&b.name));
        for pkg in &mut packages {
            pkg.dependencies.sort_by(|a, b| a.name.cmp(&b.name));
        }
        Self {
            version: TOOL_VERSION.to_string(),
            podfile_checksum,
            root: RootSection { dependencies: root },
            package: packages,
        }
    }

    /// Load and parse a `Podfile.lock.toml` file from the given path.
    ///
    /// A lockfile stamped by a newer podlock than this one is refused
    /// rather than misread.
    pub fn from_path(path: &Path) -> miette::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| PodlockError::Lockfile {
            message: format!("Failed to read {}: {e}", path.display()),
        })?;
        let lockfile: Self = toml::from_str(&content).map_err(|e| PodlockError::Lockfile {
            message: format!("Failed to parse {}: {e}", path.display()),
        })?;

        let written_by =
            semver::Version::parse(&lockfile.version).map_err(|e| PodlockError::Lockfile {
                message: format!("Invalid tool version tag `{}`: {e}", lockfile.version),
            })?;
        let current = semver::Version::parse(TOOL_VERSION).expect("crate version is semver");
        let incompatible = written_by.major > current.major
            || (written_by.major == 0 && current.major == 0 && written_by.minor > current.minor);
        if incompatible {
            return Err(PodlockError::Lockfile {
                message: format!(
                    "Lockfile was written by podlock {written_by}, newer than this {current}. \
                     Upgrade podlock to use it."
                ),
            }
            .into());
        }

        Ok(lockfile)
    }

    /// Serialize to the lockfile's on-disk form, header included.
    pub fn to_string_pretty(&self) -> Result<String, toml::ser::Error> {
        Ok(format!("{LOCKFILE_HEADER}{}", toml::to_string_pretty(self)?))
    }

    /// Write the lockfile atomically.
    pub fn write_to(&self, path: &Path) -> miette::Result<()> {
        let content = self.to_string_pretty().map_err(|e| PodlockError::Lockfile {
            message: format!("Failed to serialize lockfile: {e}"),
        })?;
        podlock_util::fs::write_atomic(path, content.as_bytes())
            .map_err(|e| PodlockError::Io(e).into())
    }

    /// Whether the manifest declarations have drifted since this lockfile
    /// was written.
    pub fn is_stale(&self, declaration_digest: &str) -> bool {
        self.podfile_checksum != declaration_digest
    }

    pub fn locked_package(&self, name: &str) -> Option<&LockedPackage> {
        self.package.iter().find(|p| p.name == name)
    }

    pub fn locked_version(&self, name: &str) -> Option<&str> {
        self.locked_package(name).map(|p| p.version.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Lockfile {
        Lockfile::generate(
            vec![
                LockedRootDependency {
                    name: "FlutterMacOS".to_string(),
                    requirement: "*".to_string(),
                    path: Some("Flutter/ephemeral".to_string()),
                },
                LockedRootDependency {
                    name: "FirebaseCore".to_string(),
                    requirement: "~> 10.29".to_string(),
                    path: None,
                },
            ],
            vec![
                LockedPackage {
                    name: "GoogleUtilities".to_string(),
                    version: "7.13.3".to_string(),
                    checksum: Some("abc123".to_string()),
                    path: None,
                    dependencies: vec![],
                },
                LockedPackage {
                    name: "FirebaseCore".to_string(),
                    version: "10.29.0".to_string(),
                    checksum: Some("def456".to_string()),
                    path: None,
                    dependencies: vec![
                        LockedDependencyRef {
                            name: "GoogleUtilities".to_string(),
                            requirement: "~> 7.12".to_string(),
                        },
                        LockedDependencyRef {
                            name: "FirebaseCoreInternal".to_string(),
                            requirement: "~> 10.0".to_string(),
                        },
                    ],
                },
            ],
            "digest".to_string(),
        )
    }

    #[test]
    fn generate_sorts_everything() {
        let lock = sample();
        assert_eq!(lock.root.dependencies[0].name, "FirebaseCore");
        assert_eq!(lock.package[0].name, "FirebaseCore");
        assert_eq!(lock.package[0].dependencies[0].name, "FirebaseCoreInternal");
    }

    #[test]
    fn serialization_is_deterministic() {
        let a = sample().to_string_pretty().unwrap();
        let b = sample().to_string_pretty().unwrap();
        assert_eq!(a, b);
        assert!(a.starts_with("# This file is generated by podlock."));
    }

    #[test]
    fn write_read_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("Podfile.lock.toml");
        let lock = sample();
        lock.write_to(&path).unwrap();

        let loaded = Lockfile::from_path(&path).unwrap();
        assert_eq!(loaded.version, TOOL_VERSION);
        assert_eq!(loaded.locked_version("FirebaseCore"), Some("10.29.0"));
        assert_eq!(loaded.locked_version("Missing"), None);

        // Re-writing the unchanged lockfile is byte-identical
        let before = std::fs::read(&path).unwrap();
        loaded.write_to(&path).unwrap();
        assert_eq!(before, std::fs::read(&path).unwrap());
    }

    #[test]
    fn staleness_detection() {
        let lock = sample();
        assert!(!lock.is_stale("digest"));
        assert!(lock.is_stale("other-digest"));
    }

    #[test]
    fn refuses_newer_tool_version() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("Podfile.lock.toml");
        let mut lock = sample();
        lock.version = "99.0.0".to_string();
        let content = toml::to_string_pretty(&lock).unwrap();
        std::fs::write(&path, content).unwrap();
        assert!(Lockfile::from_path(&path).is_err());
    }

    #[test]
    fn rejects_bad_version_tag() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("Podfile.lock.toml");
        let mut lock = sample();
        lock.version = "not-a-version".to_string();
        std::fs::write(&path, toml::to_string_pretty(&lock).unwrap()).unwrap();
        assert!(Lockfile::from_path(&path).is_err());
    }
}
