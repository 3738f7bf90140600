use assert_cmd::Command;

const BIN: &str = "presensictl";

#[test]
fn test_empty_args() {
    let mut cmd = Command::cargo_bin(BIN).unwrap();
    cmd.assert().failure();
}

#[test]
fn test_help() {
    let mut cmd = Command::cargo_bin(BIN).unwrap();
    cmd.arg("-h").assert().success();
}

#[test]
fn test_version_subcmd() {
    let mut cmd = Command::cargo_bin(BIN).unwrap();
    cmd.arg("version").assert().success();
}

#[test]
fn test_completion() {
    let mut cmd = Command::cargo_bin(BIN).unwrap();
    cmd.args(["completion", "bash"]).assert().success();
}

#[test]
fn test_check_inside_fence() {
    let mut cmd = Command::cargo_bin(BIN).unwrap();
    cmd.args([
        "-c",
        "examples/config.hcl",
        "check",
        "-a",
        "10",
        "-6.200100",
        "106.816666",
    ])
    .assert()
    .success()
    .stdout(predicates::str::contains("inside the school area"));
}

#[test]
fn test_check_invalid_subcmd() {
    let mut cmd = Command::cargo_bin(BIN).unwrap();
    cmd.arg("blah").assert().failure();
}

#[test]
fn test_acquire_replay() {
    let mut cmd = Command::cargo_bin(BIN).unwrap();
    cmd.args([
        "-c",
        "examples/config.hcl",
        "acquire",
        "examples/replay.csv",
    ])
    .assert()
    .success()
    .stdout(predicates::str::contains("fix:"));
}

#[test]
fn test_submit_izin_needs_reason() {
    let mut cmd = Command::cargo_bin(BIN).unwrap();
    cmd.args([
        "-c",
        "examples/config.hcl",
        "submit",
        "-k",
        "izin",
        "examples/replay.csv",
    ])
    .assert()
    .failure();
}

#[test]
fn test_submit_checkin() {
    let mut cmd = Command::cargo_bin(BIN).unwrap();
    cmd.args([
        "-c",
        "examples/config.hcl",
        "submit",
        "examples/replay.csv",
    ])
    .assert()
    .success()
    .stdout(predicates::str::contains("\"teacher_name\": \"Guru Demo\""));
}
