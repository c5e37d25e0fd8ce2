//! Registry directory layout and spec lookup.
//!
//! Layout: `<root>/<name>/<version>/Spec.toml`, one directory per
//! published version. External-source packages live outside the registry
//! in a project-local directory holding `<name>.spec.toml`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use podlock_core::version::Version;
use podlock_util::errors::PodlockError;

use crate::spec::Spec;

/// An opened on-disk specs repository.
#[derive(Debug, Clone)]
pub struct Registry {
    root: PathBuf,
}

impl Registry {
    /// Open a registry rooted at the given directory.
    pub fn open(root: impl Into<PathBuf>) -> miette::Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(PodlockError::Configuration {
                message: format!("Registry directory {} does not exist", root.display()),
            }
            .into());
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn package_dir(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// All published versions of a package, ascending. Empty if the
    /// registry does not carry the package at all.
    ///
    /// Two version directories that normalize to the same version
    /// (`1.0` and `1.0.0`) are a duplicate declaration and rejected.
    pub fn versions(&self, name: &str) -> miette::Result<Vec<Version>> {
        let dir = self.package_dir(name);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut versions = Vec::new();
        let entries = std::fs::read_dir(&dir).map_err(PodlockError::Io)?;
        for entry in entries {
            let entry = entry.map_err(PodlockError::Io)?;
            if !entry.path().is_dir() {
                continue;
            }
            let dir_name = entry.file_name();
            let dir_name = dir_name.to_string_lossy();
            let version = Version::parse(&dir_name).map_err(|e| PodlockError::Spec {
                package: name.to_string(),
                message: format!("version directory `{dir_name}`: {e}"),
            })?;
            versions.push(version);
        }

        versions.sort();
        for pair in versions.windows(2) {
            if pair[0] == pair[1] {
                return Err(PodlockError::Spec {
                    package: name.to_string(),
                    message: format!(
                        "duplicate version declaration: `{}` and `{}` are the same version",
                        pair[0], pair[1]
                    ),
                }
                .into());
            }
        }

        Ok(versions)
    }

    /// The newest stable version of a package, if any; pre-releases are
    /// only reported when nothing stable is published.
    pub fn latest(&self, name: &str) -> miette::Result<Option<Version>> {
        let versions = self.versions(name)?;
        let latest_stable = versions.iter().rfind(|v| !v.is_pre_release()).cloned();
        Ok(latest_stable.or_else(|| versions.last().cloned()))
    }

    /// Load the spec for one published version.
    pub fn spec(&self, name: &str, version: &Version) -> miette::Result<Spec> {
        let path = self
            .package_dir(name)
            .join(version.as_str())
            .join("Spec.toml");
        let content = std::fs::read_to_string(&path).map_err(|e| PodlockError::Spec {
            package: name.to_string(),
            message: format!("Failed to read {}: {e}", path.display()),
        })?;
        Spec::parse(&content, Some((name, version)))
    }
}

/// Load an external-source spec from `<base_dir>/<name>.spec.toml`.
pub fn path_spec(base_dir: &Path, name: &str) -> miette::Result<Spec> {
    let path = base_dir.join(format!("{name}.spec.toml"));
    let content = std::fs::read_to_string(&path).map_err(|e| PodlockError::Spec {
        package: name.to_string(),
        message: format!("Failed to read {}: {e}", path.display()),
    })?;
    let spec = Spec::parse(&content, None)?;
    if spec.name != name {
        return Err(PodlockError::Spec {
            package: name.to_string(),
            message: format!("spec declares name `{}`", spec.name),
        }
        .into());
    }
    Ok(spec)
}

/// The resolver's view of available specs: the registry plus any
/// external-source packages, which shadow the registry and expose exactly
/// one version each.
#[derive(Debug)]
pub struct SpecSource {
    registry: Registry,
    external: BTreeMap<String, Spec>,
}

impl SpecSource {
    pub fn new(registry: Registry) -> Self {
        Self {
            registry,
            external: BTreeMap::new(),
        }
    }

    /// Register an external-source spec, shadowing the registry for its name.
    pub fn add_external(&mut self, spec: Spec) {
        self.external.insert(spec.name.clone(), spec);
    }

    pub fn is_external(&self, name: &str) -> bool {
        self.external.contains_key(name)
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Candidate versions for a package, ascending.
    pub fn versions(&self, name: &str) -> miette::Result<Vec<Version>> {
        if let Some(spec) = self.external.get(name) {
            return Ok(vec![spec.version.clone()]);
        }
        self.registry.versions(name)
    }

    /// The spec of one candidate version.
    pub fn spec(&self, name: &str, version: &Version) -> miette::Result<Spec> {
        if let Some(spec) = self.external.get(name) {
            if &spec.version == version {
                return Ok(spec.clone());
            }
            return Err(PodlockError::Spec {
                package: name.to_string(),
                message: format!(
                    "external source provides {} only, not {version}",
                    spec.version
                ),
            }
            .into());
        }
        self.registry.spec(name, version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn publish(root: &Path, name: &str, version: &str, deps: &[(&str, &str)]) {
        let dir = root.join(name).join(version);
        std::fs::create_dir_all(&dir).unwrap();
        let mut content = format!("name = \"{name}\"\nversion = \"{version}\"\n");
        if !deps.is_empty() {
            content.push_str("\n[dependencies]\n");
            for (dep, req) in deps {
                content.push_str(&format!("{dep} = \"{req}\"\n"));
            }
        }
        std::fs::write(dir.join("Spec.toml"), content).unwrap();
    }

    #[test]
    fn versions_sorted_ascending() {
        let tmp = tempfile::tempdir().unwrap();
        publish(tmp.path(), "GoogleUtilities", "7.10.0", &[]);
        publish(tmp.path(), "GoogleUtilities", "7.9.0", &[]);
        publish(tmp.path(), "GoogleUtilities", "7.13.3", &[]);

        let registry = Registry::open(tmp.path()).unwrap();
        let versions = registry.versions("GoogleUtilities").unwrap();
        let rendered: Vec<String> = versions.iter().map(|v| v.to_string()).collect();
        assert_eq!(rendered, ["7.9.0", "7.10.0", "7.13.3"]);
    }

    #[test]
    fn unknown_package_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let registry = Registry::open(tmp.path()).unwrap();
        assert!(registry.versions("Nope").unwrap().is_empty());
    }

    #[test]
    fn duplicate_normalized_versions_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        publish(tmp.path(), "Dup", "1.0", &[]);
        publish(tmp.path(), "Dup", "1.0.0", &[]);

        let registry = Registry::open(tmp.path()).unwrap();
        assert!(registry.versions("Dup").is_err());
    }

    #[test]
    fn malformed_version_directory_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(tmp.path().join("Bad/not-a-version")).unwrap();

        let registry = Registry::open(tmp.path()).unwrap();
        assert!(registry.versions("Bad").is_err());
    }

    #[test]
    fn spec_lookup() {
        let tmp = tempfile::tempdir().unwrap();
        publish(
            tmp.path(),
            "FirebaseCore",
            "10.29.0",
            &[("GoogleUtilities", "~> 7.12")],
        );

        let registry = Registry::open(tmp.path()).unwrap();
        let version = Version::parse("10.29.0").unwrap();
        let spec = registry.spec("FirebaseCore", &version).unwrap();
        assert_eq!(spec.dependencies.len(), 1);
        assert_eq!(spec.dependencies[0].name, "GoogleUtilities");
    }

    #[test]
    fn latest_prefers_stable() {
        let tmp = tempfile::tempdir().unwrap();
        publish(tmp.path(), "Lib", "1.0.0", &[]);
        publish(tmp.path(), "Lib", "2.0.0-beta.1", &[]);

        let registry = Registry::open(tmp.path()).unwrap();
        assert_eq!(registry.latest("Lib").unwrap().unwrap().as_str(), "1.0.0");
    }

    #[test]
    fn missing_registry_dir_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(Registry::open(tmp.path().join("absent")).is_err());
    }

    #[test]
    fn external_specs_shadow_registry() {
        let tmp = tempfile::tempdir().unwrap();
        publish(tmp.path(), "FlutterMacOS", "0.9.0", &[]);
        let registry = Registry::open(tmp.path()).unwrap();

        let local = tmp.path().join("Flutter/ephemeral");
        std::fs::create_dir_all(&local).unwrap();
        std::fs::write(
            local.join("FlutterMacOS.spec.toml"),
            "name = \"FlutterMacOS\"\nversion = \"1.0.0\"\n",
        )
        .unwrap();

        let mut source = SpecSource::new(registry);
        source.add_external(path_spec(&local, "FlutterMacOS").unwrap());

        let versions = source.versions("FlutterMacOS").unwrap();
        assert_eq!(versions.len(), 1);
        assert_eq!(versions[0].as_str(), "1.0.0");
        assert!(source.is_external("FlutterMacOS"));
    }
}
