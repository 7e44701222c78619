//! Patchwork REST API module
//!
//! The [`PatchworkApi`] trait is everything the commands need from the
//! server. [`PatchworkClient`] implements it over blocking HTTP.

mod client;
mod types;
mod version;

#[cfg(test)]
pub(crate) mod stub;

use std::path::PathBuf;

use anyhow::Result;
use serde_json::Value;

pub use client::{Auth, PatchworkClient};
pub use types::*;
pub use version::ApiVersion;

/// Ordered query or form parameters; repeated keys are allowed
pub type Params = [(String, String)];

/// Operations the CLI performs against a Patchwork server
pub trait PatchworkApi {
    /// Negotiated API version
    fn version(&self) -> ApiVersion;

    /// List records of a resource (`patches`, `people`, `users`, ...)
    fn index(&self, resource: &str, params: &Params) -> Result<Vec<Value>>;

    /// Fetch a single record
    fn detail(&self, resource: &str, id: u64) -> Result<Value>;

    /// Partially update a record, returning the updated record
    fn update(&self, resource: &str, id: u64, data: &Params) -> Result<Value>;

    /// Download a file to a local temporary path
    fn download(&self, url: &str, params: &Params) -> Result<PathBuf>;

    /// Fetch a URL as text
    fn get(&self, url: &str) -> Result<String>;
}
