//! Handler for `podlock verify`.

use miette::Result;

pub fn exec() -> Result<()> {
    let project_root = super::project_root()?;
    podlock_ops::ops_verify::verify(&project_root)
}
