use std::path::Path;

use assert_cmd::Command;

#[allow(deprecated)]
pub fn podlock_cmd(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("podlock").unwrap();
    cmd.current_dir(dir);
    cmd
}

/// Publish a spec into the project's `specs/` registry directory.
pub fn publish(project_root: &Path, name: &str, version: &str, deps: &[(&str, &str)]) {
    let dir = project_root.join("specs").join(name).join(version);
    std::fs::create_dir_all(&dir).unwrap();
    let mut content = format!("name = \"{name}\"\nversion = \"{version}\"\n");
    if !deps.is_empty() {
        content.push_str("\n[dependencies]\n");
        for (dep, req) in deps {
            content.push_str(&format!("{dep} = \"{req}\"\n"));
        }
    }
    std::fs::write(dir.join("Spec.toml"), content).unwrap();
}

/// Write a `Podfile.toml` with the given `[dependencies]` table body.
pub fn write_manifest(project_root: &Path, deps: &str) {
    std::fs::write(
        project_root.join("Podfile.toml"),
        format!("[project]\nname = \"Runner\"\nplatform = \"macos\"\n\n[dependencies]\n{deps}"),
    )
    .unwrap();
}
