//! Help and argument errors

use crate::prelude::*;

#[test]
fn help_lists_commands() {
    let temp = Project::empty();

    temp.dg()
        .args(&["--help"])
        .passes()
        .stdout_has("exec")
        .stdout_has("stats")
        .stdout_has("device")
        .stdout_has("daemon");
}

#[test]
fn exec_requires_an_operation() {
    let temp = Project::empty();

    temp.dg().args(&["exec"]).fails().stderr_has("<OPERATION>");
}

#[test]
fn unknown_subcommand_fails() {
    let temp = Project::empty();

    temp.dg()
        .args(&["teleport"])
        .fails()
        .stderr_has("unrecognized subcommand");
}

#[test]
fn bad_input_value_is_rejected() {
    let temp = Project::empty();

    temp.dg()
        .args(&["exec", "add", "one", "2"])
        .fails()
        .stderr_has("invalid input value");
}
