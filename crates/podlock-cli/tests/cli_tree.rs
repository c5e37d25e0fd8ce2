mod common;

use common::{podlock_cmd, publish, write_manifest};
use predicates::prelude::*;
use tempfile::TempDir;

fn firebase_project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    publish(
        tmp.path(),
        "FirebaseCore",
        "10.29.0",
        &[("FirebaseCoreInternal", "~> 10.0"), ("GoogleUtilities", "~> 7.12")],
    );
    publish(tmp.path(), "FirebaseCoreInternal", "10.29.0", &[("GoogleUtilities", "~> 7.8")]);
    publish(tmp.path(), "GoogleUtilities", "7.13.3", &[]);
    write_manifest(tmp.path(), "FirebaseCore = \"~> 10.29\"\n");
    tmp
}

#[test]
fn tree_prints_nested_dependencies() {
    let tmp = firebase_project();

    podlock_cmd(tmp.path())
        .arg("tree")
        .assert()
        .success()
        .stdout(predicate::str::contains("Runner"))
        .stdout(predicate::str::contains("FirebaseCore (10.29.0)"))
        .stdout(predicate::str::contains("GoogleUtilities (7.13.3)"));
}

#[test]
fn tree_depth_limits_output() {
    let tmp = firebase_project();

    podlock_cmd(tmp.path())
        .args(["tree", "--depth", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("FirebaseCore (10.29.0)"))
        .stdout(predicate::str::contains("GoogleUtilities").not());
}

#[test]
fn tree_why_shows_inclusion_path() {
    let tmp = firebase_project();

    podlock_cmd(tmp.path())
        .args(["tree", "--why", "GoogleUtilities"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Path to GoogleUtilities"))
        .stdout(predicate::str::contains("FirebaseCore (10.29.0)"));
}

#[test]
fn tree_why_unknown_package() {
    let tmp = firebase_project();

    podlock_cmd(tmp.path())
        .args(["tree", "--why", "Ghost"])
        .assert()
        .success()
        .stdout(predicate::str::contains("not found"));
}

#[test]
fn tree_inverted_shows_dependents() {
    let tmp = firebase_project();

    podlock_cmd(tmp.path())
        .args(["tree", "--inverted"])
        .assert()
        .success()
        .stdout(predicate::str::contains("GoogleUtilities (7.13.3)"))
        .stdout(predicate::str::contains("requires ~> 7.12"));
}

#[test]
fn tree_restrictions_reports_held_packages() {
    let tmp = firebase_project();
    // A newer GoogleUtilities exists but FirebaseCore holds it below 8.0
    publish(tmp.path(), "GoogleUtilities", "8.0.0", &[]);

    podlock_cmd(tmp.path())
        .args(["tree", "--restrictions"])
        .assert()
        .success()
        .stdout(predicate::str::contains("GoogleUtilities"))
        .stdout(predicate::str::contains("8.0.0"));
}
