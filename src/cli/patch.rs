//! `git-pw patch` subcommands

use anyhow::Result;
use clap::{Args, Subcommand};

use super::{apply, download, list, show, update};
use crate::api::PatchworkApi;
use crate::config::Config;

#[derive(Args, Debug)]
pub struct PatchArgs {
    #[command(subcommand)]
    pub command: PatchCommands,
}

#[derive(Subcommand, Debug)]
pub enum PatchCommands {
    /// Apply a patch locally with `git am`
    Apply(apply::ApplyArgs),

    /// Download a patch in diff or mbox format
    Download(download::DownloadArgs),

    /// List patches
    List(list::ListArgs),

    /// Show information about a patch
    Show(show::ShowArgs),

    /// Update one or more patches
    Update(update::UpdateArgs),
}

/// Execute a patch subcommand against a server
pub fn execute(args: PatchArgs, api: &dyn PatchworkApi, config: &Config) -> Result<()> {
    match args.command {
        PatchCommands::Apply(args) => apply::run(args, api, config),
        PatchCommands::Download(args) => download::run(args, api),
        PatchCommands::List(args) => list::run(args, api, config),
        PatchCommands::Show(args) => show::run(args, api),
        PatchCommands::Update(args) => update::run(args, api),
    }
}
