//! `git-pw patch download` command
//!
//! Downloads a patch without applying it.
//!
//! # Usage
//! ```bash
//! git-pw patch download 1234             # mbox to a temporary file
//! git-pw patch download 1234 --diff      # plain diff to a temporary file
//! git-pw patch download 1234 fix.patch   # mbox to fix.patch
//! git-pw patch download 1234 - --diff    # plain diff to stdout
//! ```

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::{debug, info};

use super::show::fetch_patch;
use crate::api::PatchworkApi;

#[derive(Args, Debug)]
pub struct DownloadArgs {
    /// Patch ID
    pub patch_id: u64,

    /// Output path, or `-` for stdout (chosen automatically when omitted)
    pub output: Option<PathBuf>,

    /// Download the patch in diff format
    #[arg(long, conflicts_with = "mbox")]
    pub diff: bool,

    /// Download the patch in mbox format (default)
    #[arg(long)]
    pub mbox: bool,
}

/// mbox URL rewritten to the raw diff endpoint
fn raw_url(mbox_url: &str) -> String {
    match mbox_url.trim_end_matches('/').strip_suffix("/mbox") {
        Some(base) => format!("{}/raw/", base),
        None => mbox_url.replace("mbox", "raw"),
    }
}

/// Download a patch, returning the file written to (if any)
pub fn download_patch(
    api: &dyn PatchworkApi,
    args: &DownloadArgs,
    stdout: &mut dyn Write,
) -> Result<Option<PathBuf>> {
    let patch = fetch_patch(api, args.patch_id)?;

    let Some(output) = &args.output else {
        let url = if args.diff {
            raw_url(&patch.mbox)
        } else {
            patch.mbox.clone()
        };
        return api.download(&url, &[]).map(Some);
    };

    let content = if args.diff {
        patch.diff.clone().unwrap_or_default()
    } else {
        api.get(&patch.mbox)?
    };

    if output.as_os_str() == "-" {
        stdout.write_all(content.as_bytes())?;
        stdout.flush()?;
        return Ok(None);
    }

    std::fs::write(output, content)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    Ok(Some(output.clone()))
}

pub fn run(args: DownloadArgs, api: &dyn PatchworkApi) -> Result<()> {
    debug!(
        "Downloading patch: id={}, format={}",
        args.patch_id,
        if args.diff { "diff" } else { "mbox" }
    );

    let mut stdout = std::io::stdout().lock();
    if let Some(path) = download_patch(api, &args, &mut stdout)? {
        info!("Downloaded patch to {}", path.display());
    }

    Ok(())
}
