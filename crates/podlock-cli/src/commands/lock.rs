//! Handler for `podlock lock`.

use miette::Result;

pub fn exec(frozen: bool, verbose: bool) -> Result<()> {
    let project_root = super::project_root()?;
    podlock_ops::ops_lock::lock(&project_root, frozen, verbose)
}
