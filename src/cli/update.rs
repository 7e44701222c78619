//! `git-pw patch update` command
//!
//! Updates one or more patches. Some operations need maintainer
//! permissions on the instance.
//!
//! # Usage
//! ```bash
//! git-pw patch update 1234 --state accepted --commit-ref 1a2b3c4
//! git-pw patch update 1234 1235 --delegate carol@example.com
//! git-pw patch update 1234 --archived true
//! ```

use anyhow::Result;
use clap::Args;
use serde_json::Value;
use tracing::debug;

use super::output::OutputFormat;
use super::show::print_patch;
use crate::api::PatchworkApi;
use crate::core::FilterResolver;

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Patch IDs
    #[arg(required = true)]
    pub patch_ids: Vec<u64>,

    /// Set the patch commit reference hash
    #[arg(long, value_name = "COMMIT_REF")]
    pub commit_ref: Option<String>,

    /// Set the patch state (slugified, instance dependent)
    #[arg(long, value_name = "STATE")]
    pub state: Option<String>,

    /// Set the patch delegate (username or email address)
    #[arg(long, value_name = "DELEGATE")]
    pub delegate: Option<String>,

    /// Set the patch archived state
    #[arg(long, value_name = "ARCHIVED")]
    pub archived: Option<bool>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t)]
    pub format: OutputFormat,
}

/// Form data for the update, leaving out fields that were not given
pub fn update_data(args: &UpdateArgs, delegate: Option<String>) -> Vec<(String, String)> {
    [
        ("commit_ref", args.commit_ref.clone()),
        ("state", args.state.clone()),
        ("archived", args.archived.map(|a| a.to_string())),
        ("delegate", delegate),
    ]
    .into_iter()
    .filter_map(|(key, value)| value.map(|v| (key.to_string(), v)))
    .collect()
}

/// Resolve the delegate, then update every patch in turn
///
/// The delegate is resolved before the first update so an unknown or
/// ambiguous delegate leaves every patch untouched.
pub fn update_patches(
    api: &dyn PatchworkApi,
    args: &UpdateArgs,
    mut on_updated: impl FnMut(&Value) -> Result<()>,
) -> Result<()> {
    let delegate = match &args.delegate {
        Some(term) => Some(FilterResolver::new(api).resolve_delegate(term)?),
        None => None,
    };
    let data = update_data(args, delegate);

    for &patch_id in &args.patch_ids {
        debug!(
            "Updating patch: id={}, commit_ref={:?}, state={:?}, archived={:?}",
            patch_id, args.commit_ref, args.state, args.archived
        );

        let record = api.update("patches", patch_id, &data)?;
        on_updated(&record)?;
    }

    Ok(())
}

pub fn run(args: UpdateArgs, api: &dyn PatchworkApi) -> Result<()> {
    update_patches(api, &args, |record| print_patch(record, args.format))
}
