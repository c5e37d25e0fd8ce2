//! Handler for `podlock add`.

use miette::Result;

use podlock_core::MANIFEST_FILE;
use podlock_ops::ops_add::{self, AddOptions};

pub fn exec(
    name: &str,
    version: Option<String>,
    path: Option<String>,
    target: Option<String>,
    verbose: bool,
) -> Result<()> {
    let project_root = super::project_root()?;

    ops_add::add_dependency(
        &project_root.join(MANIFEST_FILE),
        &AddOptions {
            name: name.to_string(),
            requirement: version,
            path,
            target,
        },
    )?;

    podlock_ops::ops_lock::lock(&project_root, false, verbose)
}
