//! Operation: add a dependency to Podfile.toml.

use std::path::Path;

use podlock_core::requirement::RequirementSet;
use toml_edit::{DocumentMut, InlineTable, Item, Table, Value};

use podlock_util::errors::PodlockError;

/// Options for `podlock add`.
pub struct AddOptions {
    /// The package name.
    pub name: String,
    /// A requirement string such as `~> 10.29` (any version if omitted).
    pub requirement: Option<String>,
    /// External source directory holding `<name>.spec.toml`.
    pub path: Option<String>,
    /// Add to a specific target section.
    pub target: Option<String>,
}

/// Add a dependency to `Podfile.toml` using format-preserving edits.
pub fn add_dependency(manifest_path: &Path, opts: &AddOptions) -> miette::Result<()> {
    let content = std::fs::read_to_string(manifest_path).map_err(|e| {
        PodlockError::Manifest {
            message: format!("Failed to read {}: {e}", manifest_path.display()),
        }
    })?;

    let mut doc: DocumentMut = content.parse().map_err(|e| PodlockError::Manifest {
        message: format!("Failed to parse Podfile.toml: {e}"),
    })?;

    if let Some(ref requirement) = opts.requirement {
        RequirementSet::parse(requirement).map_err(|e| PodlockError::Manifest {
            message: format!("dependency {}: {e}", opts.name),
        })?;
    }

    let value = render_entry(opts);

    if let Some(ref target) = opts.target {
        ensure_table(&mut doc, &["target", target, "dependencies"]);
        doc["target"][target]["dependencies"][&opts.name] = value;
    } else {
        ensure_table(&mut doc, &["dependencies"]);
        doc["dependencies"][&opts.name] = value;
    }

    std::fs::write(manifest_path, doc.to_string())
        .map_err(|e| PodlockError::Io(e).into())
}

/// Render the table entry: a plain requirement string, or an inline table
/// when an external source path is involved.
fn render_entry(opts: &AddOptions) -> Item {
    match (&opts.requirement, &opts.path) {
        (Some(req), None) => Item::Value(Value::from(req.clone())),
        (requirement, Some(path)) => {
            let mut table = InlineTable::new();
            if let Some(req) = requirement {
                table.insert("version", Value::from(req.clone()));
            }
            table.insert("path", Value::from(path.clone()));
            Item::Value(Value::InlineTable(table))
        }
        (None, None) => Item::Value(Value::from(">= 0")),
    }
}

/// Ensure a nested table path exists in the document.
fn ensure_table(doc: &mut DocumentMut, keys: &[&str]) {
    let mut current = doc.as_table_mut() as &mut Table;
    for &key in keys {
        if !current.contains_key(key) {
            current.insert(key, Item::Table(Table::new()));
        }
        current = match current.get_mut(key) {
            Some(Item::Table(t)) => t,
            _ => return,
        };
    }
}
