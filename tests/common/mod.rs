//! Shared test helpers for integration tests

#![allow(dead_code)]

use assert_cmd::Command;
use tempfile::TempDir;

/// A git-pw command isolated from the user's config and environment
pub fn git_pw(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("git-pw").unwrap();
    cmd.current_dir(home.path())
        .env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join(".config"))
        .env_remove("GIT_PW_CONFIG")
        .env_remove("GIT_PW_SERVER")
        .env_remove("GIT_PW_PROJECT")
        .env_remove("GIT_PW_TOKEN")
        .env_remove("GIT_PW_USERNAME")
        .env_remove("GIT_PW_PASSWORD")
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1");
    cmd
}

/// Write a config file into the temp dir and return its path
pub fn write_config(home: &TempDir, content: &str) -> std::path::PathBuf {
    let path = home.path().join("config.toml");
    std::fs::write(&path, content).unwrap();
    path
}
