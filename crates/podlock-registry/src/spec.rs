//! Parsing of per-version `Spec.toml` files.

use std::collections::BTreeMap;

use serde::Deserialize;

use podlock_core::requirement::RequirementSet;
use podlock_core::version::Version;
use podlock_util::errors::PodlockError;

/// Raw serde shape of a `Spec.toml` file.
#[derive(Debug, Deserialize)]
struct RawSpec {
    name: String,
    version: String,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    dependencies: BTreeMap<String, String>,
}

/// One published package version, as read from the registry.
#[derive(Debug, Clone)]
pub struct Spec {
    pub name: String,
    pub version: Version,
    pub summary: Option<String>,
    pub dependencies: Vec<SpecDependency>,
    /// The raw spec file text; this is the content that gets checksummed.
    pub content: String,
}

/// A dependency requirement a spec imposes on another package.
#[derive(Debug, Clone)]
pub struct SpecDependency {
    pub name: String,
    pub requirements: RequirementSet,
}

impl Spec {
    /// Parse a spec file, optionally cross-checking the declared name and
    /// version against the directory coordinates it was found under.
    pub fn parse(
        content: &str,
        expected: Option<(&str, &Version)>,
    ) -> miette::Result<Self> {
        let raw: RawSpec = toml::from_str(content).map_err(|e| PodlockError::Spec {
            package: expected.map(|(n, _)| n.to_string()).unwrap_or_default(),
            message: format!("Failed to parse Spec.toml: {e}"),
        })?;

        let version = Version::parse(&raw.version).map_err(|e| PodlockError::Spec {
            package: raw.name.clone(),
            message: e.to_string(),
        })?;

        if let Some((name, dir_version)) = expected {
            if raw.name != name {
                return Err(PodlockError::Spec {
                    package: name.to_string(),
                    message: format!("spec declares name `{}`", raw.name),
                }
                .into());
            }
            if &version != dir_version {
                return Err(PodlockError::Spec {
                    package: name.to_string(),
                    message: format!(
                        "spec declares version {version}, directory says {dir_version}"
                    ),
                }
                .into());
            }
        }

        let mut dependencies = Vec::with_capacity(raw.dependencies.len());
        for (dep_name, requirement) in &raw.dependencies {
            let requirements =
                RequirementSet::parse(requirement).map_err(|e| PodlockError::Spec {
                    package: raw.name.clone(),
                    message: format!("dependency {dep_name}: {e}"),
                })?;
            dependencies.push(SpecDependency {
                name: dep_name.clone(),
                requirements,
            });
        }

        Ok(Self {
            name: raw.name,
            version,
            summary: raw.summary,
            dependencies,
            content: content.to_string(),
        })
    }

    /// The spec's content checksum as recorded in lockfiles.
    pub fn checksum(&self) -> String {
        crate::checksum::compute(self.content.as_bytes())
    }
}
