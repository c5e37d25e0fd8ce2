//! Handler for `podlock tree`.

use miette::Result;

use podlock_ops::ops_tree::{self, TreeOptions};

pub fn exec(
    depth: Option<u32>,
    inverted: bool,
    why: Option<String>,
    restrictions: bool,
) -> Result<()> {
    let project_root = super::project_root()?;

    let opts = TreeOptions {
        depth: depth.map(|d| d as usize),
        why,
        inverted,
        restrictions,
    };

    ops_tree::tree(&project_root, &opts)
}
