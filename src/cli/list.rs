//! `git-pw patch list` command
//!
//! Lists patches on the Patchwork instance.
//!
//! # Usage
//! ```bash
//! git-pw patch list
//! git-pw patch list --state accepted --state rejected
//! git-pw patch list --submitter alice@example.com --delegate carol "net:"
//! git-pw patch list --archived --limit 50 --page 2 --sort=-id
//! ```

use anyhow::Result;
use chrono::Utc;
use clap::Args;
use serde_json::Value;
use tracing::debug;

use super::output::{self, OutputFormat};
use crate::api::{decode_all, Patch, PatchworkApi};
use crate::config::Config;
use crate::core::filter::default_states;
use crate::core::{FilterRequest, FilterResolver, SortField};

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Show only patches whose name contains this string
    pub name: Option<String>,

    /// Show only patches in these states (slugified, instance dependent)
    #[arg(long, value_name = "STATE", default_values_t = default_states())]
    pub state: Vec<String>,

    /// Show only patches by these submitters (email or name)
    #[arg(long, value_name = "SUBMITTER")]
    pub submitter: Vec<String>,

    /// Show only patches delegated to these users (email or username)
    #[arg(long, value_name = "DELEGATE")]
    pub delegate: Vec<String>,

    /// Include archived patches
    #[arg(long)]
    pub archived: bool,

    /// Maximum number of patches to show
    #[arg(long, value_name = "LIMIT")]
    pub limit: Option<u32>,

    /// Page to retrieve patches from (page size is LIMIT)
    #[arg(long, value_name = "PAGE")]
    pub page: Option<u32>,

    /// Sort output on given field
    #[arg(long, value_name = "FIELD", value_enum, default_value_t, allow_hyphen_values = true)]
    pub sort: SortField,

    /// Output format
    #[arg(short, long, value_enum, default_value_t)]
    pub format: OutputFormat,
}

impl ListArgs {
    pub fn filter_request(&self) -> FilterRequest {
        FilterRequest {
            states: self.state.clone(),
            submitters: self.submitter.clone(),
            delegates: self.delegate.clone(),
            name: self.name.clone(),
            page: self.page,
            limit: self.limit,
            sort: self.sort,
            archived: self.archived,
        }
    }
}

/// Resolve filters and fetch the matching patches
///
/// Nothing is listed when a filter cannot be resolved.
pub fn list_patches(api: &dyn PatchworkApi, request: &FilterRequest) -> Result<Vec<Value>> {
    let query = FilterResolver::new(api).resolve(request)?;
    api.index("patches", query.as_pairs())
}

pub fn run(args: ListArgs, api: &dyn PatchworkApi, config: &Config) -> Result<()> {
    debug!(
        "List patches: states={}, submitters={}, delegates={}, archived={}",
        args.state.join(","),
        args.submitter.join(","),
        args.delegate.join(","),
        args.archived
    );

    let records = list_patches(api, &args.filter_request())?;

    match args.format {
        OutputFormat::Json => println!("{}", output::to_json(&records)?),
        OutputFormat::Table => {
            let patches: Vec<Patch> = decode_all(records)?;
            let table = output::patch_table(&patches, Utc::now());
            output::echo_via_pager(&table, config.pager(std::env::var("PAGER").ok()))?;
        }
    }

    Ok(())
}
