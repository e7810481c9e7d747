use assert_cmd::Command;

#[test]
fn cli_help_smoke() {
    let mut cmd = Command::cargo_bin("kira-hdxqc").unwrap();
    cmd.arg("--help");
    cmd.assert().success();
}

#[test]
fn cli_version_smoke() {
    let mut cmd = Command::cargo_bin("kira-hdxqc").unwrap();
    cmd.arg("--version");
    cmd.assert().success();
}
