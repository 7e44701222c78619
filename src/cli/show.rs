//! `git-pw patch show` command
//!
//! Shows Patchwork metadata for a patch.
//!
//! # Usage
//! ```bash
//! git-pw patch show 1234
//! git-pw patch show 1234 --format json
//! ```

use anyhow::Result;
use clap::Args;
use serde_json::Value;
use tracing::debug;

use super::output::{self, OutputFormat};
use crate::api::{decode, Patch, PatchworkApi};

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Patch ID
    pub patch_id: u64,

    /// Output format
    #[arg(short, long, value_enum, default_value_t)]
    pub format: OutputFormat,
}

/// Fetch a single patch
pub fn fetch_patch(api: &dyn PatchworkApi, patch_id: u64) -> Result<Patch> {
    decode(api.detail("patches", patch_id)?)
}

/// Print a patch record in the requested format
pub fn print_patch(record: &Value, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", output::to_json(record)?),
        OutputFormat::Table => {
            let patch: Patch = decode(record.clone())?;
            println!("{}", output::patch_detail_table(&patch));
        }
    }
    Ok(())
}

pub fn run(args: ShowArgs, api: &dyn PatchworkApi) -> Result<()> {
    debug!("Showing patch: id={}", args.patch_id);

    let record = api.detail("patches", args.patch_id)?;
    print_patch(&record, args.format)
}
