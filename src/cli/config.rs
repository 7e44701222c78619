//! `git-pw config` command
//!
//! Get or set configuration values.
//!
//! # Usage
//! ```bash
//! git-pw config                                   # Show config file
//! git-pw config server.url                        # Get a value
//! git-pw config server.url https://pw.example.com/api/1.1
//! git-pw config --global server.token abc123      # Set in user config
//! git-pw config --path                            # Show config locations
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use toml_edit::{DocumentMut, Item, Value};

use crate::config::{Config, LOCAL_CONFIG_FILE};

#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Config key (e.g., server.url, apply.signoff)
    pub key: Option<String>,

    /// Value to set
    pub value: Option<String>,

    /// List all config values
    #[arg(long)]
    pub list: bool,

    /// Show config file path
    #[arg(long)]
    pub path: bool,

    /// Use the user config instead of the repository's .git-pw.toml
    #[arg(short, long)]
    pub global: bool,
}

fn config_path(global: bool, explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }

    if global {
        return Config::global_config_path()
            .context("Could not determine the user config directory");
    }

    Ok(Config::find_local_config().unwrap_or_else(|| PathBuf::from(LOCAL_CONFIG_FILE)))
}

pub fn run(args: ConfigArgs, explicit: Option<&Path>) -> Result<()> {
    let path = config_path(args.global, explicit)?;

    if args.path {
        if let Some(global) = Config::global_config_path() {
            println!("Global: {}", global.display());
        }
        println!("Local:  {}", config_path(false, None)?.display());
        println!();
        if path.exists() {
            println!("{} Active: {}", "✓".green(), path.display());
        } else {
            println!("{} No config file found at {}", "⚠".yellow(), path.display());
        }
        return Ok(());
    }

    match (&args.key, &args.value) {
        (Some(key), Some(value)) => {
            set_config_value(&path, key, value)?;
            println!(
                "{} Set {} = {} (in {})",
                "✓".green(),
                key.cyan(),
                value,
                path.display()
            );
        }
        (Some(key), None) if !args.list => match get_config_value(&path, key)? {
            Some(v) => println!("{}", v),
            None => println!("{}", "(not set)".dimmed()),
        },
        _ => {
            if path.exists() {
                println!("{}", fs::read_to_string(&path)?);
            } else {
                println!("No config file at {}", path.display());
                println!();
                println!("Create one with:");
                println!("  git-pw config server.url https://patchwork.example.com/api/1.1");
                println!("  git-pw config server.project my-project");
            }
        }
    }

    Ok(())
}

/// Set a nested config value using dot notation (e.g., "server.url")
pub fn set_config_value(path: &Path, key: &str, val: &str) -> Result<()> {
    let content = if path.exists() {
        fs::read_to_string(path)?
    } else {
        String::new()
    };

    let mut doc: DocumentMut = content
        .parse()
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    let parts: Vec<&str> = key.split('.').collect();
    match parts.as_slice() {
        [name] => doc[*name] = Item::Value(parse_toml_value(val)),
        [section, name] => {
            if doc.get(section).is_none() {
                doc[*section] = toml_edit::table();
            }
            doc[*section][*name] = Item::Value(parse_toml_value(val));
        }
        _ => bail!("Key too deep: {}. Max depth is section.key", key),
    }

    // Refuse to write something the loader would reject
    toml::from_str::<Config>(&doc.to_string())
        .with_context(|| format!("Invalid value for {}: {}", key, val))?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, doc.to_string())?;
    Ok(())
}

/// Get a config value by dot notation key
pub fn get_config_value(path: &Path, key: &str) -> Result<Option<String>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)?;
    let doc: toml::Value = content
        .parse()
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    let val = match key.split('.').collect::<Vec<_>>().as_slice() {
        [name] => doc.get(name),
        [section, name] => doc.get(section).and_then(|t| t.get(name)),
        _ => None,
    };

    Ok(val.map(|v| match v {
        toml::Value::String(s) => s.clone(),
        other => other.to_string(),
    }))
}

/// Parse string value to appropriate TOML type
fn parse_toml_value(s: &str) -> Value {
    match s {
        "true" => return Value::from(true),
        "false" => return Value::from(false),
        _ => {}
    }

    if let Ok(i) = s.parse::<i64>() {
        return Value::from(i);
    }

    // Versions such as "1.1" stay strings
    Value::from(s)
}
