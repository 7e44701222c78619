//! CLI utility functions
//!
//! Helpers that shell out to git.

use std::path::Path;
use std::process::Command;

use anyhow::{bail, Context, Result};
use tracing::debug;

/// Arguments for `git am`, without the leading `git`
pub fn git_am_args(mbox: &Path, extra: &[String], signoff: bool) -> Vec<String> {
    let mut args = vec!["am".to_string()];
    if signoff {
        args.push("-s".to_string());
    }
    args.extend(extra.iter().cloned());
    args.push(mbox.display().to_string());
    args
}

/// Apply an mbox to the current repository with `git am`
pub fn git_am(mbox: &Path, extra: &[String], signoff: bool) -> Result<()> {
    let args = git_am_args(mbox, extra, signoff);
    debug!("Running: git {}", args.join(" "));

    let status = Command::new("git")
        .args(&args)
        .status()
        .context("Failed to run git")?;

    if !status.success() {
        bail!("git am failed ({}); resolve with 'git am --continue' or 'git am --abort'", status);
    }

    Ok(())
}
