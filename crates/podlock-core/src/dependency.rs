use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::requirement::{RequirementError, RequirementSet};

/// A dependency declaration in Podfile.toml.
///
/// Supports both shorthand (`FirebaseCore = "~> 10.29"`) and detailed forms
/// (`FlutterMacOS = { path = "Flutter/ephemeral" }`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Dependency {
    Req(String),
    Detailed(DetailedDependency),
}

/// A dependency with an explicit requirement and/or an external source path.
///
/// A `path` dependency's spec is loaded from that directory instead of the
/// registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailedDependency {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
}

/// A parsed, validated top-level dependency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredDependency {
    pub name: String,
    pub requirements: RequirementSet,
    pub path: Option<PathBuf>,
}

impl DeclaredDependency {
    /// Parse a manifest table entry into a validated declaration.
    pub fn from_entry(name: &str, dep: &Dependency) -> Result<Self, RequirementError> {
        let (requirements, path) = match dep {
            Dependency::Req(spec) => (RequirementSet::parse(spec)?, None),
            Dependency::Detailed(d) => {
                let reqs = match &d.version {
                    Some(spec) => RequirementSet::parse(spec)?,
                    None => RequirementSet::new(),
                };
                (reqs, d.path.as_ref().map(PathBuf::from))
            }
        };
        Ok(Self {
            name: name.to_string(),
            requirements,
            path,
        })
    }
}

impl fmt::Display for DeclaredDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "{} (from `{}`)", self.name, path.display()),
            None => write!(f, "{} ({})", self.name, self.requirements),
        }
    }
}
