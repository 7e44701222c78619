//! git-pw - Patchwork from the command line
//!
//! Lists, inspects, downloads, applies and updates patches tracked by a
//! Patchwork instance over its REST API.
//!
//! # Architecture
//!
//! - **api**: the [`PatchworkApi`] operations and a blocking HTTP client
//! - **core**: filter resolution; turns submitter/delegate names into
//!   query parameters, looking up numeric IDs on servers older than API 1.1
//! - **cli**: `patch` and `config` subcommands
//! - **config**: TOML configuration with command-line overrides

pub mod api;
pub mod cli;
pub mod config;
pub mod core;

pub use api::{ApiVersion, PatchworkApi, PatchworkClient};
pub use config::Config;
pub use crate::core::{FilterRequest, FilterResolver, ResolveError, ResolvedQuery};
