//! Core resolution algorithm: constraint propagation to a fixpoint with
//! highest-satisfying version selection and lockfile pinning.
//!
//! Each round re-derives the full requirement set (declared dependencies
//! plus everything the currently selected specs impose), then re-selects
//! one version per package name: the lockfile pin if it still satisfies
//! every requirement, otherwise the highest satisfying registry version.
//! Selection changes feed the next round; a round with no changes is the
//! fixpoint. The iteration count is bounded, and exceeding the bound is a
//! configuration error rather than an endless loop.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use podlock_core::lockfile::Lockfile;
use podlock_core::manifest::Manifest;
use podlock_core::requirement::RequirementSet;
use podlock_core::version::Version;
use podlock_registry::{Spec, SpecSource};
use podlock_util::errors::PodlockError;

use crate::graph::{DepEdge, DependencyGraph, ResolvedNode};
use crate::restriction::{RestrictionReport, VersionRestriction};

/// The output of dependency resolution.
#[derive(Debug)]
pub struct ResolutionResult {
    pub graph: DependencyGraph,
    pub restrictions: RestrictionReport,
    /// All resolved packages, sorted by name, for lockfile generation.
    pub packages: Vec<ResolvedPackage>,
}

/// A single resolved package.
#[derive(Debug, Clone)]
pub struct ResolvedPackage {
    pub name: String,
    pub version: Version,
    pub checksum: String,
    /// External-source directory the spec came from, as declared.
    pub path: Option<String>,
    pub dependencies: Vec<ResolvedDependencyRef>,
}

/// A dependency of a resolved package, with the requirement it imposes.
#[derive(Debug, Clone)]
pub struct ResolvedDependencyRef {
    pub name: String,
    pub requirement: String,
}

/// One requirement on a package together with who imposed it.
struct Origin {
    by: String,
    requirements: RequirementSet,
}

/// Resolve all dependencies declared in a manifest.
///
/// `lockfile` versions act as preference pins; packages named in `unpin`
/// ignore their pin (pass `lockfile: None` to drop every pin).
pub fn resolve(
    manifest: &Manifest,
    source: &SpecSource,
    lockfile: Option<&Lockfile>,
    unpin: &[String],
) -> miette::Result<ResolutionResult> {
    let declared = manifest.declared()?;

    let pins = build_pins(lockfile, unpin)?;
    let mut spec_cache: HashMap<String, Spec> = HashMap::new();
    let mut versions_cache: HashMap<String, Vec<Version>> = HashMap::new();
    let mut selected: BTreeMap<String, Version> = BTreeMap::new();
    let mut requirements: BTreeMap<String, Vec<Origin>> = BTreeMap::new();
    let mut iterations = 0usize;

    loop {
        iterations += 1;

        // Gather requirements from the root and from every spec reachable
        // through the current selections.
        requirements.clear();
        let mut queue: VecDeque<String> = VecDeque::new();
        let mut visited: HashSet<String> = HashSet::new();

        for dep in &declared {
            requirements
                .entry(dep.name.clone())
                .or_default()
                .push(Origin {
                    by: "Podfile".to_string(),
                    requirements: dep.requirements.clone(),
                });
            queue.push_back(dep.name.clone());
        }

        while let Some(name) = queue.pop_front() {
            if !visited.insert(name.clone()) {
                continue;
            }
            let Some(version) = selected.get(&name) else {
                continue;
            };
            let spec = cached_spec(&mut spec_cache, source, &name, version)?;
            for dep in &spec.dependencies {
                requirements
                    .entry(dep.name.clone())
                    .or_default()
                    .push(Origin {
                        by: format!("{name} {version}"),
                        requirements: dep.requirements.clone(),
                    });
                queue.push_back(dep.name.clone());
            }
        }

        // Select one version per required package.
        let mut next: BTreeMap<String, Version> = BTreeMap::new();
        let mut candidates_seen = 0usize;
        for (name, origins) in &requirements {
            if !versions_cache.contains_key(name) {
                versions_cache.insert(name.clone(), source.versions(name)?);
            }
            let candidates = &versions_cache[name];
            candidates_seen += candidates.len();
            if candidates.is_empty() {
                return Err(PodlockError::UnknownPackage {
                    package: name.clone(),
                    requested_by: origins
                        .first()
                        .map(|o| o.by.clone())
                        .unwrap_or_else(|| "Podfile".to_string()),
                }
                .into());
            }

            let satisfies =
                |v: &Version| origins.iter().all(|o| o.requirements.matches(v));

            // Pre-releases are only candidates when some requirement
            // explicitly references one.
            let allow_pre = origins
                .iter()
                .any(|o| o.requirements.iter().any(|r| r.version.is_pre_release()));

            let pinned = pins
                .get(name)
                .filter(|pin| candidates.contains(pin) && satisfies(pin))
                .cloned();

            let choice = pinned.or_else(|| {
                candidates
                    .iter()
                    .rev()
                    .filter(|v| allow_pre || !v.is_pre_release())
                    .find(|v| satisfies(v))
                    .cloned()
            });

            match choice {
                Some(version) => {
                    next.insert(name.clone(), version);
                }
                None => {
                    return Err(PodlockError::Unsatisfiable {
                        package: name.clone(),
                        requirements: render_origins(origins),
                    }
                    .into());
                }
            }
        }

        if next == selected {
            break;
        }
        selected = next;

        let bound = 16 + candidates_seen;
        if iterations > bound {
            return Err(PodlockError::Configuration {
                message: format!(
                    "resolution did not converge after {iterations} rounds"
                ),
            }
            .into());
        }
        tracing::debug!("resolution round {iterations}: {} packages", selected.len());
    }

    finalize(manifest, source, &selected, &requirements, &pins, &mut spec_cache)
}

/// Build the resolver's spec source for a project: open the configured
/// registry and load every declared external-source spec.
pub fn build_spec_source(
    manifest: &Manifest,
    project_root: &std::path::Path,
) -> miette::Result<SpecSource> {
    let registry = podlock_registry::Registry::open(manifest.registry_dir(project_root))?;
    let mut source = SpecSource::new(registry);
    for dep in manifest.declared()? {
        if let Some(path) = &dep.path {
            let base = if path.is_absolute() {
                path.clone()
            } else {
                project_root.join(path)
            };
            source.add_external(podlock_registry::registry::path_spec(&base, &dep.name)?);
        }
    }
    Ok(source)
}

fn build_pins(
    lockfile: Option<&Lockfile>,
    unpin: &[String],
) -> miette::Result<BTreeMap<String, Version>> {
    let mut pins = BTreeMap::new();
    if let Some(lock) = lockfile {
        for pkg in &lock.package {
            if unpin.iter().any(|u| u == &pkg.name) {
                continue;
            }
            let version =
                Version::parse(&pkg.version).map_err(|e| PodlockError::Lockfile {
                    message: format!("locked version of {}: {e}", pkg.name),
                })?;
            pins.insert(pkg.name.clone(), version);
        }
    }
    Ok(pins)
}

fn cached_spec<'a>(
    cache: &'a mut HashMap<String, Spec>,
    source: &SpecSource,
    name: &str,
    version: &Version,
) -> miette::Result<&'a Spec> {
    let key = format!("{name} {version}");
    if !cache.contains_key(&key) {
        let spec = source.spec(name, version)?;
        cache.insert(key.clone(), spec);
    }
    Ok(&cache[&key])
}

fn render_origins(origins: &[Origin]) -> String {
    origins
        .iter()
        .map(|o| format!("  {} requires {}", o.by, o.requirements))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Build the graph, flat package list, and restriction report from the
/// final selections.
fn finalize(
    manifest: &Manifest,
    source: &SpecSource,
    selected: &BTreeMap<String, Version>,
    requirements: &BTreeMap<String, Vec<Origin>>,
    pins: &BTreeMap<String, Version>,
    spec_cache: &mut HashMap<String, Spec>,
) -> miette::Result<ResolutionResult> {
    let declared = manifest.declared()?;
    let external_paths: BTreeMap<&str, String> = declared
        .iter()
        .filter_map(|d| {
            d.path
                .as_ref()
                .map(|p| (d.name.as_str(), p.to_string_lossy().into_owned()))
        })
        .collect();

    let mut graph = DependencyGraph::new();
    let root = graph.add_node(ResolvedNode {
        name: manifest.project.name.clone(),
        version: None,
    });
    graph.set_root(root);

    for (name, version) in selected {
        graph.add_node(ResolvedNode {
            name: name.clone(),
            version: Some(version.clone()),
        });
    }

    for dep in &declared {
        if let Some(idx) = graph.find(&dep.name) {
            graph.add_edge(
                root,
                idx,
                DepEdge {
                    requirement: dep.requirements.to_string(),
                },
            );
        }
    }

    let mut packages = Vec::with_capacity(selected.len());
    for (name, version) in selected {
        let spec = cached_spec(spec_cache, source, name, version)?.clone();
        let from_idx = graph.find(name).expect("selected packages are nodes");

        let mut refs = Vec::with_capacity(spec.dependencies.len());
        for dep in &spec.dependencies {
            refs.push(ResolvedDependencyRef {
                name: dep.name.clone(),
                requirement: dep.requirements.to_string(),
            });
            if let Some(to_idx) = graph.find(&dep.name) {
                graph.add_edge(
                    from_idx,
                    to_idx,
                    DepEdge {
                        requirement: dep.requirements.to_string(),
                    },
                );
            }
        }

        packages.push(ResolvedPackage {
            name: name.clone(),
            version: version.clone(),
            checksum: spec.checksum(),
            path: external_paths.get(name.as_str()).cloned(),
            dependencies: refs,
        });
    }

    if let Some(on_cycle) = graph.find_cycle() {
        return Err(PodlockError::Configuration {
            message: format!("dependency cycle detected involving {on_cycle}"),
        }
        .into());
    }

    let mut restrictions = RestrictionReport::new();
    for (name, version) in selected {
        if source.is_external(name) {
            continue;
        }
        let Some(latest) = source.registry().latest(name)? else {
            continue;
        };
        if &latest <= version {
            continue;
        }
        let restricted_by = requirements
            .get(name)
            .and_then(|origins| {
                origins
                    .iter()
                    .find(|o| !o.requirements.matches(&latest))
                    .map(|o| format!("{} requires {}", o.by, o.requirements))
            })
            .or_else(|| {
                pins.contains_key(name)
                    .then(|| "pinned by Podfile.lock".to_string())
            })
            .unwrap_or_else(|| "unknown restriction".to_string());
        restrictions.add(VersionRestriction {
            package: name.clone(),
            selected: version.to_string(),
            latest: latest.to_string(),
            restricted_by,
        });
    }

    Ok(ResolutionResult {
        graph,
        restrictions,
        packages,
    })
}
