//! End-to-end tests for the `raya-box` binary.

use std::path::Path;
use std::process::{Command, Output};

fn raya_box(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_raya-box"))
        .current_dir(dir)
        .arg("--color")
        .arg("never")
        .args(args)
        .output()
        .expect("failed to run raya-box")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_box_number() {
    let temp = tempfile::tempdir().unwrap();
    let output = raya_box(temp.path(), &["box", "Number", "42"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let out = stdout(&output);
    assert!(out.contains("type:       Number"), "{}", out);
    assert!(out.contains("valueOf():  42"), "{}", out);
    assert!(out.contains("String():   \"42\""), "{}", out);
    assert!(out.contains("instance:   true"), "{}", out);
}

#[test]
fn test_box_with_delegated_call() {
    let temp = tempfile::tempdir().unwrap();
    let output = raya_box(
        temp.path(),
        &["box", "Number", "3.14159", "--call", "toFixed", "2"],
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("toFixed(2): \"3.14\""));
}

#[test]
fn test_failing_delegated_call_exits_nonzero() {
    let temp = tempfile::tempdir().unwrap();
    let output = raya_box(
        temp.path(),
        &["box", "Number", "1", "--call", "toFixed", "101"],
    );
    assert!(!output.status.success());
    assert!(stderr(&output).contains("RangeError: toFixed() digits argument must be between 0 and 100"));
}

#[test]
fn test_bare_call_respects_config() {
    let temp = tempfile::tempdir().unwrap();
    std::fs::write(
        temp.path().join("raya-box.toml"),
        "[factory]\nauto_box_literals = false\n",
    )
    .unwrap();

    let output = raya_box(temp.path(), &["box", "String", "hello", "--bare"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("construct:  call"), "{}", out);
    assert!(out.contains("instance:   false"), "{}", out);

    let output = raya_box(temp.path(), &["box", "String", "hello"]);
    assert!(stdout(&output).contains("instance:   true"));
}

#[test]
fn test_inspect_json() {
    let temp = tempfile::tempdir().unwrap();
    let output = raya_box(temp.path(), &["inspect", "Number", "--json"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["name"], "Number");
    assert_eq!(json["unwrap_this"], true);
    let keys: Vec<&str> = json["proto"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|entry| entry["key"].as_str())
        .collect();
    assert!(keys.contains(&"toFixed"));
    assert!(keys.contains(&"constructor"));
}

#[test]
fn test_inspect_text() {
    let temp = tempfile::tempdir().unwrap();
    let output = raya_box(temp.path(), &["inspect", "Boolean"]);
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.starts_with("Boolean\n"), "{}", out);
    assert!(out.contains("toString"));
    assert!(out.contains("method"));
}

#[test]
fn test_unknown_builtin() {
    let temp = tempfile::tempdir().unwrap();
    let output = raya_box(temp.path(), &["inspect", "Date"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Unknown builtin 'Date'"));
}

#[test]
fn test_invalid_config_is_reported() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("bad.toml");
    std::fs::write(&path, "[report]\ncolor = \"plaid\"\n").unwrap();

    let output = raya_box(temp.path(), &["--config", path.to_str().unwrap(), "info"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Invalid report color 'plaid'"));
}

#[test]
fn test_info_shows_defaults() {
    let temp = tempfile::tempdir().unwrap();
    let output = raya_box(temp.path(), &["info"]);
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains(concat!("raya-box v", env!("CARGO_PKG_VERSION"))));
    assert!(out.contains("Boolean, Number, Object, String"));
    assert!(out.contains("auto_box_literals = true"));
    assert!(!out.contains("Active configuration"));
}
