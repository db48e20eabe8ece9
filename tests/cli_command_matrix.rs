use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// Anything other than `--list` must exit 0 without output and without
/// touching the API (TOWER_HOST points nowhere).
fn run_silent(home: &TempDir, args: &[&str]) {
    let mut cmd = cargo_bin_cmd!("scm-inventory");
    cmd.env("HOME", home.path())
        .env("TOWER_HOST", "http://127.0.0.1:9")
        .env_remove("SCM_INVENTORY_LOG")
        .args(args)
        .assert()
        .success()
        .stdout("")
        .stderr("");
}

#[test]
fn every_non_list_invocation_is_silent() {
    let home = TempDir::new().expect("temp home");

    run_silent(&home, &[]);
    run_silent(&home, &["--pretty"]);
    run_silent(&home, &["--project", "Demo"]);
    run_silent(&home, &["--inventory-file", "hosts.yml"]);
    run_silent(&home, &["--config", "/nonexistent/config.toml"]);

    // flags the tool does not implement
    run_silent(&home, &["--host", "web01.example.com"]);
    run_silent(&home, &["list"]);
    run_silent(&home, &["-l"]);
    run_silent(&home, &["--list", "extra-positional"]);
}
