//! `git-pw patch apply` command
//!
//! Applies a patch locally with `git am`. Extra arguments are passed to
//! `git am` unchanged.
//!
//! # Usage
//! ```bash
//! git-pw patch apply 1234
//! git-pw patch apply 1234 --series 77
//! git-pw patch apply 1234 --no-deps -- -3
//! ```

use anyhow::Result;
use clap::Args;
use tracing::debug;

use super::show::fetch_patch;
use super::utils::git_am;
use crate::api::PatchworkApi;
use crate::config::Config;

#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// Patch ID
    pub patch_id: u64,

    /// Series to include dependencies from (defaults to the latest)
    #[arg(long, value_name = "SERIES")]
    pub series: Option<u64>,

    /// Include dependencies when applying (default)
    #[arg(long, overrides_with = "no_deps")]
    pub deps: bool,

    /// Apply the patch on its own, without dependencies
    #[arg(long, overrides_with = "deps")]
    pub no_deps: bool,

    /// Arguments passed to `git am`
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

impl ApplyArgs {
    pub fn with_deps(&self) -> bool {
        !self.no_deps
    }
}

/// `series` parameter for the mbox download
///
/// `*` asks the server for the dependencies from the most recent series.
pub fn series_param(deps: bool, series: Option<u64>) -> Option<String> {
    if !deps {
        return None;
    }

    Some(series.map_or_else(|| "*".to_string(), |id| id.to_string()))
}

pub fn run(args: ApplyArgs, api: &dyn PatchworkApi, config: &Config) -> Result<()> {
    debug!(
        "Applying patch: id={}, series={:?}, deps={}, args={}",
        args.patch_id,
        args.series,
        args.with_deps(),
        args.args.join(" ")
    );

    let patch = fetch_patch(api, args.patch_id)?;

    let params: Vec<(String, String)> = series_param(args.with_deps(), args.series)
        .map(|series| ("series".to_string(), series))
        .into_iter()
        .collect();

    let mbox = api.download(&patch.mbox, &params)?;

    git_am(&mbox, &args.args, config.apply.signoff)
}
