//! Operation: display the resolved dependency tree.

use std::path::Path;

use podlock_core::lockfile::Lockfile;
use podlock_core::manifest::Manifest;
use podlock_core::{LOCKFILE_FILE, MANIFEST_FILE};
use podlock_resolver::resolver;

/// Options for `podlock tree`.
#[derive(Default)]
pub struct TreeOptions {
    /// Maximum tree depth to display.
    pub depth: Option<usize>,
    /// Show the path from the project to a specific package.
    pub why: Option<String>,
    /// Show the inverted tree (dependents instead of dependencies).
    pub inverted: bool,
    /// Show packages held below the newest registry version.
    pub restrictions: bool,
}

/// Display the dependency tree for the project.
pub fn tree(project_root: &Path, opts: &TreeOptions) -> miette::Result<()> {
    let manifest = Manifest::from_path(&project_root.join(MANIFEST_FILE))?;
    let source = resolver::build_spec_source(&manifest, project_root)?;

    let lockfile_path = project_root.join(LOCKFILE_FILE);
    let existing_lock = if lockfile_path.is_file() {
        Lockfile::from_path(&lockfile_path).ok()
    } else {
        None
    };

    let result = resolver::resolve(&manifest, &source, existing_lock.as_ref(), &[])?;

    if let Some(ref target) = opts.why {
        if let Some(path) = result.graph.find_path(target) {
            println!("Path to {target}:");
            for (i, node) in path.iter().enumerate() {
                let indent = "  ".repeat(i);
                println!("{indent}{node}");
            }
        } else {
            println!("Package '{target}' not found in the graph.");
        }
        return Ok(());
    }

    if opts.restrictions {
        println!("{}", result.restrictions);
        return Ok(());
    }

    if opts.inverted {
        let inverted_output = result.graph.print_full_inverted_tree();
        if inverted_output.is_empty() {
            println!("No dependencies.");
        } else {
            print!("{inverted_output}");
        }
        return Ok(());
    }

    print!("{}", result.graph.print_tree(opts.depth));

    Ok(())
}
