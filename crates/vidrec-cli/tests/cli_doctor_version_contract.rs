mod common;

use assert_cmd::prelude::*;
use predicates::prelude::*;

#[test]
fn vidrec_version_json_contract() {
    let mut cmd = std::process::Command::new(env!("CARGO_BIN_EXE_vidrec"));
    common::hermetic(&mut cmd);
    cmd.arg("version");
    let out = cmd.assert().success().get_output().stdout.clone();
    let v: serde_json::Value = serde_json::from_slice(&out).expect("stdout is json");
    assert_eq!(v["kind"].as_str(), Some("version"));
    assert_eq!(v["name"].as_str(), Some("vidrec"));
    assert_eq!(v["version"].as_str(), Some(env!("CARGO_PKG_VERSION")));
}

#[test]
fn vidrec_doctor_reports_key_presence_not_value() {
    let mut cmd = std::process::Command::new(env!("CARGO_BIN_EXE_vidrec"));
    common::hermetic(&mut cmd);
    cmd.env("api_key", "sekret-value;");
    cmd.arg("doctor");
    let out = cmd
        .assert()
        .success()
        .stdout(predicate::str::contains("sekret").not())
        .get_output()
        .stdout
        .clone();
    let v: serde_json::Value = serde_json::from_slice(&out).expect("stdout is json");
    assert_eq!(v["kind"].as_str(), Some("doctor"));
    assert_eq!(v["youtube_api_key_configured"].as_bool(), Some(true));
    assert_eq!(
        v["youtube_endpoint"].as_str(),
        Some("https://www.googleapis.com/youtube/v3/search")
    );
}

#[test]
fn vidrec_doctor_fails_without_key() {
    let mut cmd = std::process::Command::new(env!("CARGO_BIN_EXE_vidrec"));
    common::hermetic(&mut cmd);
    cmd.args(["doctor", "--output", "text"]);
    cmd.assert()
        .failure()
        .stdout(predicate::str::contains("youtube api key: missing"));
}

#[test]
fn vidrec_env_file_supplies_key() {
    let dir = tempfile::tempdir().expect("tempdir");
    let env_path = dir.path().join("keys.env");
    std::fs::write(&env_path, "YOUTUBE_API_KEY=from-file\n").expect("write env");

    let mut cmd = std::process::Command::new(env!("CARGO_BIN_EXE_vidrec"));
    common::hermetic(&mut cmd);
    cmd.env("VIDREC_ENV_FILE", &env_path);
    cmd.arg("doctor");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"youtube_api_key_configured\":true"))
        .stdout(predicate::str::contains("from-file").not());
}
