//! CLI module - Command definitions and handlers

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use crate::api::PatchworkClient;
use crate::config::{Config, ServerOverrides};

pub mod apply;
pub mod config;
pub mod download;
pub mod list;
pub mod output;
pub mod patch;
pub mod show;
pub mod update;
pub mod utils;

/// git-pw - Patchwork from the command line
///
/// List, inspect, download, apply and update patches on a Patchwork
/// instance.
#[derive(Parser, Debug)]
#[command(name = "git-pw")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file path
    #[arg(short, long, global = true, env = "GIT_PW_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub server: ServerArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Connection settings that override the config file
#[derive(Args, Debug, Default)]
pub struct ServerArgs {
    /// Patchwork API URL, e.g. https://patchwork.example.com/api/1.1
    #[arg(long, global = true, env = "GIT_PW_SERVER")]
    pub server: Option<String>,

    /// Patchwork project
    #[arg(long, global = true, env = "GIT_PW_PROJECT")]
    pub project: Option<String>,

    /// API token
    #[arg(long, global = true, env = "GIT_PW_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Username (when not using a token)
    #[arg(long, global = true, env = "GIT_PW_USERNAME")]
    pub username: Option<String>,

    /// Password (when not using a token)
    #[arg(long, global = true, env = "GIT_PW_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

impl From<ServerArgs> for ServerOverrides {
    fn from(args: ServerArgs) -> Self {
        Self {
            url: args.server,
            project: args.project,
            token: args.token,
            username: args.username,
            password: args.password,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Interact with patches
    Patch(patch::PatchArgs),

    /// Get or set configuration
    Config(config::ConfigArgs),
}

/// Run a parsed command line
pub fn run(cli: Cli) -> Result<()> {
    let Cli {
        config: config_path,
        server,
        command,
        ..
    } = cli;

    match command {
        Commands::Config(args) => config::run(args, config_path.as_deref()),
        Commands::Patch(args) => {
            let mut config = Config::load(config_path.as_deref())?;
            config.apply_overrides(server.into());
            let client = PatchworkClient::from_config(&config.server)?;
            patch::execute(args, &client, &config)
        }
    }
}
