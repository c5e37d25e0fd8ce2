//! Handler for `podlock outdated`.

use miette::Result;

use podlock_ops::ops_outdated::{self, OutdatedOptions};

pub fn exec(major: bool) -> Result<()> {
    let project_root = super::project_root()?;
    ops_outdated::outdated(&project_root, &OutdatedOptions { major })
}
