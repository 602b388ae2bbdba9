// Regression tests for the `mbx` binary: exit codes, stdout and miette diagnostics on stderr.

mod common;

use std::fs;

use assert_cmd::Command;
use common::write_tree;
use predicates::{prelude::PredicateBooleanExt, str::contains};

fn mbx() -> Command {
    Command::cargo_bin("mbx").unwrap()
}

#[test]
fn build_translates_a_tree() {
    let dir = tempfile::tempdir().unwrap();
    write_tree(dir.path(), &[("src/app.mbx", "let a = <br/>\n")]);

    mbx()
        .current_dir(dir.path())
        .arg("build")
        .assert()
        .success()
        .stdout(contains("1 translated, 0 failed"));
    assert_eq!(
        fs::read_to_string(dir.path().join("src/app.mbt")).unwrap(),
        "let a = h(\"br\", [], [])\n"
    );
}

#[test]
fn build_reports_miette_diagnostics_on_error() {
    let dir = tempfile::tempdir().unwrap();
    write_tree(
        dir.path(),
        &[("ok.mbx", "let a = <br/>\n"), ("bad.mbx", "<a>text</b>\n")],
    );

    mbx()
        .arg("build")
        .arg(dir.path())
        .assert()
        .failure()
        .stdout(contains("1 translated, 1 failed"))
        .stderr(contains("mbx::unmatched_element").and(contains("bad.mbx:1:8")));
    assert!(!dir.path().join("bad.mbt").exists());
}

#[test]
fn build_check_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    write_tree(dir.path(), &[("app.mbx", "let a = <br/>\n")]);

    mbx()
        .arg("build")
        .arg("--check")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(contains("1 checked, 0 failed"));
    assert!(!dir.path().join("app.mbt").exists());
}

#[test]
fn build_uses_config_from_root() {
    let dir = tempfile::tempdir().unwrap();
    write_tree(
        dir.path(),
        &[
            ("mbx.yaml", "builders:\n  element: BUILD\n"),
            ("app.mbx", "let a = <br/>\n"),
        ],
    );

    mbx().arg("build").arg(dir.path()).assert().success();
    assert_eq!(
        fs::read_to_string(dir.path().join("app.mbt")).unwrap(),
        "let a = BUILD(\"br\", [], [])\n"
    );
}

#[test]
fn invalid_config_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    write_tree(dir.path(), &[("mbx.yaml", "max_depth: 0\n")]);

    mbx()
        .arg("build")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(contains("mbx::config"));
}

#[test]
fn translate_prints_to_stdout() {
    let dir = tempfile::tempdir().unwrap();
    write_tree(dir.path(), &[("view.mbx", "<div>{name}</div>\n")]);

    mbx()
        .arg("translate")
        .arg(dir.path().join("view.mbx"))
        .assert()
        .success()
        .stdout("h(\"div\", [], [text(name)])\n");
    assert!(!dir.path().join("view.mbt").exists());
}

#[test]
fn translate_explicit_config() {
    let dir = tempfile::tempdir().unwrap();
    write_tree(
        dir.path(),
        &[
            ("custom.yaml", "builders:\n  text: TEXT\n"),
            ("view.mbx", "<p>hi</p>\n"),
        ],
    );

    mbx()
        .arg("translate")
        .arg(dir.path().join("view.mbx"))
        .arg("--config")
        .arg(dir.path().join("custom.yaml"))
        .assert()
        .success()
        .stdout(contains("TEXT(\"hi\")"));
}

#[test]
fn translate_diff_marks_changed_lines() {
    let dir = tempfile::tempdir().unwrap();
    write_tree(dir.path(), &[("view.mbx", "let a = 1\nlet b = <br/>\n")]);

    mbx()
        .arg("translate")
        .arg("--diff")
        .arg(dir.path().join("view.mbx"))
        .assert()
        .success()
        .stdout(contains("-let b = <br/>").and(contains("+let b = h(\"br\", [], [])")));
}

#[test]
fn missing_file_is_an_io_error() {
    mbx()
        .arg("translate")
        .arg("does/not/exist.mbx")
        .assert()
        .failure()
        .stderr(contains("mbx::io"));
}

#[test]
fn cst_json_output() {
    let dir = tempfile::tempdir().unwrap();
    write_tree(dir.path(), &[("view.mbx", "<br/>")]);

    mbx()
        .arg("cst")
        .arg("--json")
        .arg(dir.path().join("view.mbx"))
        .assert()
        .success()
        .stdout(contains("\"kind\": \"Program\"").and(contains("\"kind\": \"TagName\"")));
}
