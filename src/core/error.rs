use std::fmt;

use thiserror::Error;

/// Which identity filter a lookup resolves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityKind {
    Submitter,
    Delegate,
}

impl IdentityKind {
    /// Resource searched to turn a name or email into an ID
    pub fn resource(&self) -> &'static str {
        match self {
            IdentityKind::Submitter => "people",
            IdentityKind::Delegate => "users",
        }
    }

    /// Query parameter carrying the filter value
    pub fn param(&self) -> &'static str {
        match self {
            IdentityKind::Submitter => "submitter",
            IdentityKind::Delegate => "delegate",
        }
    }
}

impl fmt::Display for IdentityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.param())
    }
}

/// Failure to turn filters into a query
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("No matching {kind} found: {term}")]
    IdentityNotFound { kind: IdentityKind, term: String },

    #[error("More than one {kind} found: {term} ({matches} matches)")]
    IdentityAmbiguous {
        kind: IdentityKind,
        term: String,
        matches: usize,
    },

    #[error(transparent)]
    Transport(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ResolveError>;
