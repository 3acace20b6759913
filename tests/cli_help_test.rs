// Default-invocation behavior: running shademate bare must guide the user
// into the demo instead of erroring out.

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn bare_run_shows_guidance() {
    let mut cmd = Command::cargo_bin("shademate").unwrap();

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("SHADEMATE"))
        .stdout(predicate::str::contains("recommend --gender"))
        .stdout(predicate::str::contains("between 15 and 100"));
}

#[test]
fn help_lists_all_subcommands() {
    let mut cmd = Command::cargo_bin("shademate").unwrap();

    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("recommend"))
        .stdout(predicate::str::contains("catalog"))
        .stdout(predicate::str::contains("init"));
}

#[test]
fn recommend_requires_its_inputs() {
    let mut cmd = Command::cargo_bin("shademate").unwrap();

    cmd.arg("recommend");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("--gender"))
        .stderr(predicate::str::contains("--photo"));
}
