//! Handler for `podlock check`.

use miette::Result;

pub fn exec() -> Result<()> {
    let project_root = super::project_root()?;
    podlock_ops::ops_check::check(&project_root)
}
