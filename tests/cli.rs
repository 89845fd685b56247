// ABOUTME: Integration tests for the netlify-upload binary.
// ABOUTME: Validates --help output and failures reported before any network call.

use assert_cmd::Command;
use predicates::prelude::*;

const INPUTS: [&str; 4] = [
    "INPUT_NETLIFY-TOKEN",
    "INPUT_SITE-NAME",
    "INPUT_SOURCE-FILE",
    "INPUT_DESTINATION-PATH",
];

fn netlify_upload_cmd() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("netlify-upload"));
    for name in INPUTS {
        cmd.env_remove(name);
    }
    cmd
}

#[test]
fn help_shows_flags() {
    netlify_upload_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--config"))
        .stdout(predicate::str::contains("--output"))
        .stdout(predicate::str::contains("--verbose"));
}

#[test]
fn missing_token_fails_with_actions_error() {
    let temp_dir = tempfile::tempdir().unwrap();

    netlify_upload_cmd()
        .current_dir(temp_dir.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains(
            "::error::Input netlify-token is required but was not given",
        ));
}

#[test]
fn token_is_masked_before_later_errors() {
    let temp_dir = tempfile::tempdir().unwrap();

    netlify_upload_cmd()
        .current_dir(temp_dir.path())
        .env("INPUT_NETLIFY-TOKEN", "tok-secret-42")
        .env("INPUT_SITE-NAME", "demo")
        .env("INPUT_SOURCE-FILE", "a.txt\nb.txt")
        .env("INPUT_DESTINATION-PATH", "/a.txt")
        .assert()
        .failure()
        .stdout(predicate::str::contains("::add-mask::tok-secret-42"))
        .stdout(predicate::str::contains(
            "::error::Got 2 source file(s) but 1 destination path(s)",
        ));
}

#[test]
fn illegal_destination_fails_in_json_mode() {
    let temp_dir = tempfile::tempdir().unwrap();
    std::fs::write(temp_dir.path().join("a.txt"), "hello").unwrap();

    netlify_upload_cmd()
        .current_dir(temp_dir.path())
        .args(["--output", "json"])
        .env("INPUT_NETLIFY-TOKEN", "tok")
        .env("INPUT_SITE-NAME", "demo")
        .env("INPUT_SOURCE-FILE", "a.txt")
        .env("INPUT_DESTINATION-PATH", "/a#b.txt")
        .assert()
        .failure()
        .stdout(predicate::str::contains(r#""level":"error""#))
        .stdout(predicate::str::contains("illegal characters"));
}

#[test]
fn missing_source_file_fails() {
    let temp_dir = tempfile::tempdir().unwrap();

    netlify_upload_cmd()
        .current_dir(temp_dir.path())
        .env("INPUT_NETLIFY-TOKEN", "tok")
        .env("INPUT_SITE-NAME", "demo")
        .env("INPUT_SOURCE-FILE", "does-not-exist.txt")
        .env("INPUT_DESTINATION-PATH", "/x.txt")
        .assert()
        .failure()
        .stdout(predicate::str::contains("::error::Error opening source file does-not-exist.txt"));
}

#[test]
fn invalid_settings_file_fails() {
    let temp_dir = tempfile::tempdir().unwrap();
    let settings = temp_dir.path().join("custom.yml");
    std::fs::write(&settings, "upload_concurrency: 0").unwrap();

    netlify_upload_cmd()
        .current_dir(temp_dir.path())
        .arg("--config")
        .arg(&settings)
        .assert()
        .failure()
        .stdout(predicate::str::contains("::error::Invalid settings"));
}
