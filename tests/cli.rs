use assert_cmd::Command;

#[test]
fn help_lists_the_recognized_options() {
    let mut cmd = Command::cargo_bin("yoloharvest").unwrap();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicates::str::contains("--db-host"))
        .stdout(predicates::str::contains("--api-base-url"))
        .stdout(predicates::str::contains("--workspace"));
}

#[test]
fn version_outputs_tool_name() {
    let mut cmd = Command::cargo_bin("yoloharvest").unwrap();
    cmd.arg("-V");
    cmd.assert()
        .success()
        .stdout(predicates::str::contains("yoloharvest"));
}

#[test]
fn missing_configuration_is_an_error() {
    let mut cmd = Command::cargo_bin("yoloharvest").unwrap();
    // No flags and no environment: the required store/service options are
    // absent and the CLI must refuse to start the pipeline.
    cmd.env_clear();
    cmd.assert()
        .failure()
        .stderr(predicates::str::contains("required"));
}
