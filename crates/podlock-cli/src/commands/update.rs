//! Handler for `podlock update`.

use miette::Result;

use podlock_ops::ops_update::{self, UpdateOptions};

pub fn exec(packages: Vec<String>, dry_run: bool) -> Result<()> {
    let project_root = super::project_root()?;
    ops_update::update(&project_root, &UpdateOptions { packages, dry_run })
}
