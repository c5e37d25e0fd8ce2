//! Handler for `podlock remove`.

use miette::Result;

use podlock_core::MANIFEST_FILE;
use podlock_ops::ops_remove::{self, RemoveOptions};

pub fn exec(name: &str, target: Option<String>, verbose: bool) -> Result<()> {
    let project_root = super::project_root()?;

    ops_remove::remove_dependency(
        &project_root.join(MANIFEST_FILE),
        &RemoveOptions {
            name: name.to_string(),
            target,
        },
    )?;

    podlock_ops::ops_lock::lock(&project_root, false, verbose)
}
