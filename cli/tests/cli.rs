use std::env::consts::{DLL_PREFIX, DLL_SUFFIX};
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;

fn post_url() -> Command {
    let mut cmd = Command::cargo_bin("post-url").unwrap();
    for var in [
        "POST_URL_LIBRARY",
        "POST_URL_TARGET",
        "POST_URL_COOKIE",
        "POST_URL_PROXY",
        "POST_URL_ENTRY_SYMBOL",
        "POST_URL_FREE_SYMBOL",
        "POST_URL_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn help_lists_binding_options() {
    post_url()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--library"))
        .stdout(predicate::str::contains("--free-symbol"))
        .stdout(predicate::str::contains("--envelope"));
}

#[test]
fn missing_library_exits_with_load_error() {
    let dir = tempfile::tempdir().unwrap();
    post_url()
        .current_dir(dir.path())
        .assert()
        .code(2)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("failed to load library ./get_login.dll"));
}

#[test]
fn non_library_file_exits_with_load_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("get_login.dll");
    std::fs::write(&path, b"MZ but not really").unwrap();

    post_url()
        .arg("--library")
        .arg(&path)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("failed to load library"));
}

#[test]
fn library_path_can_come_from_the_environment() {
    post_url()
        .env("POST_URL_LIBRARY", "/nonexistent/libget_login.so")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("/nonexistent/libget_login.so"));
}

#[cfg(target_os = "linux")]
#[test]
fn missing_symbol_exits_with_symbol_error() {
    post_url()
        .args(["--library", "libc.so.6"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("symbol 'PostUrlWithProxy' not found"));
}

fn mock_library_in(dir: &Path) -> Option<PathBuf> {
    let prefix = format!("{DLL_PREFIX}post_url_mock");
    std::fs::read_dir(dir)
        .ok()?
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            let name = entry.file_name().to_string_lossy().into_owned();
            name.starts_with(&prefix) && name.ends_with(DLL_SUFFIX)
        })
        .max_by_key(|entry| entry.metadata().and_then(|m| m.modified()).ok())
        .map(|entry| entry.path())
}

/// The mock cdylib is built as a dev-dependency, beside or under the binary.
fn mock_library() -> PathBuf {
    let bin = assert_cmd::cargo::cargo_bin("post-url");
    let target = bin.parent().unwrap();
    mock_library_in(target)
        .or_else(|| mock_library_in(&target.join("deps")))
        .unwrap_or_else(|| panic!("post_url_mock library not found under {}", target.display()))
}

#[test]
fn real_library_prints_response_and_status() {
    let library = mock_library();
    let mut free_symbols = vec!["FreeCString"];
    if cfg!(unix) {
        free_symbols.push("free");
    }

    for free_symbol in free_symbols {
        post_url()
            .arg("--library")
            .arg(&library)
            .args(["--free-symbol", free_symbol, "--envelope"])
            .assert()
            .code(0)
            .stdout(predicate::str::starts_with("Response: {"))
            .stdout(predicate::str::contains("\"success\":true"))
            .stdout(predicate::str::ends_with("Status: 200 OK\n"));
    }
}

#[test]
fn real_library_failure_envelope_exits_with_remote_code() {
    post_url()
        .arg("--library")
        .arg(mock_library())
        .args(["--free-symbol", "FreeCString", "--proxy", "your.proxy:8080", "--envelope"])
        .assert()
        .code(8)
        .stdout(predicate::str::starts_with("Response: {"))
        .stderr(predicate::str::contains("4004 (proxy configuration error)"));
}

#[test]
fn invalid_log_filter_is_rejected() {
    post_url()
        .args(["--log-level", "post_url=loudest"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--log-level"));
}
