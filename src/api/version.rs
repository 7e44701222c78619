//! Negotiated Patchwork API version

use std::fmt;
use std::str::FromStr;

use anyhow::{bail, Context, Result};

/// API version as a comparable `(major, minor)` pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ApiVersion {
    pub major: u32,
    pub minor: u32,
}

impl ApiVersion {
    /// Oldest API, used when nothing else says otherwise
    pub const V1_0: ApiVersion = ApiVersion::new(1, 0);

    /// First API accepting free-text submitter/delegate filters
    pub const V1_1: ApiVersion = ApiVersion::new(1, 1);

    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Extract the version from a server URL ending in `/api/X.Y`
    pub fn from_server_url(url: &str) -> Option<Self> {
        let trimmed = url.trim_end_matches('/');
        let (prefix, last) = trimmed.rsplit_once('/')?;
        if !prefix.ends_with("/api") {
            return None;
        }
        last.parse().ok()
    }

    /// Whether the server filters submitters/delegates by name or email
    pub fn supports_text_filters(&self) -> bool {
        *self >= Self::V1_1
    }
}

impl Default for ApiVersion {
    fn default() -> Self {
        Self::V1_0
    }
}

impl FromStr for ApiVersion {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let (major, minor) = s
            .split_once('.')
            .with_context(|| format!("Invalid API version '{}': expected MAJOR.MINOR", s))?;
        let major = major
            .parse()
            .with_context(|| format!("Invalid API major version: {}", s))?;
        let minor = minor
            .parse()
            .with_context(|| format!("Invalid API minor version: {}", s))?;
        if major == 0 {
            bail!("Invalid API version '{}': major version must be at least 1", s);
        }
        Ok(Self::new(major, minor))
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}
