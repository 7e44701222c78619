//! Patch filter resolution
//!
//! Turns the filters given on the command line into the ordered query
//! parameters the server accepts.
//!
//! # Version gating
//!
//! ```text
//! API >= 1.1   submitter=alice@example.com   (Passthrough)
//! API <  1.1   GET /people/?q=alice@example.com -> [{id: 7}]
//!              submitter=7                     (LookupById)
//! ```
//!
//! A lookup must match exactly one record. No match or several matches
//! fail the whole command before the listing or update call is made.

use std::fmt;

use clap::ValueEnum;
use tracing::{debug, warn};

use super::error::{IdentityKind, ResolveError, Result};
use crate::api::{decode, ApiVersion, Identity, PatchworkApi};

/// States listed when `--state` is not given
pub const DEFAULT_STATES: &[&str] = &["under-review", "new"];

/// [`DEFAULT_STATES`] as owned values for argument parsing
pub fn default_states() -> Vec<String> {
    DEFAULT_STATES.iter().map(|s| s.to_string()).collect()
}

/// Field the server sorts patches on
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortField {
    #[value(name = "id")]
    Id,
    #[value(name = "-id")]
    IdDesc,
    #[value(name = "name")]
    Name,
    #[value(name = "-name")]
    NameDesc,
    #[value(name = "date")]
    Date,
    #[default]
    #[value(name = "-date")]
    DateDesc,
}

impl SortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::IdDesc => "-id",
            SortField::Name => "name",
            SortField::NameDesc => "-name",
            SortField::Date => "date",
            SortField::DateDesc => "-date",
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Filters for a patch listing, as given on the command line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterRequest {
    pub states: Vec<String>,
    pub submitters: Vec<String>,
    pub delegates: Vec<String>,
    pub name: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub sort: SortField,
    pub archived: bool,
}

/// Ordered query parameters; keys may repeat
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedQuery(Vec<(String, String)>);

impl ResolvedQuery {
    fn push(&mut self, key: &str, value: impl ToString) {
        self.0.push((key.to_string(), value.to_string()));
    }

    pub fn as_pairs(&self) -> &[(String, String)] {
        &self.0
    }

    /// Values of every pair with the given key, in order
    pub fn values<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.0
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Strategy for turning a submitter or delegate into a filter value
pub trait IdentityFilter {
    fn resolve(&self, kind: IdentityKind, term: &str) -> Result<String>;
}

/// Server filters by name or email directly
pub struct Passthrough;

impl IdentityFilter for Passthrough {
    fn resolve(&self, _kind: IdentityKind, term: &str) -> Result<String> {
        Ok(term.to_string())
    }
}

/// Server only filters by ID; search for the one record matching the term
pub struct LookupById<'a> {
    api: &'a dyn PatchworkApi,
}

impl<'a> LookupById<'a> {
    pub fn new(api: &'a dyn PatchworkApi) -> Self {
        Self { api }
    }
}

impl IdentityFilter for LookupById<'_> {
    fn resolve(&self, kind: IdentityKind, term: &str) -> Result<String> {
        debug!("Looking up {} '{}' in /{}/", kind, term, kind.resource());

        let params = [("q".to_string(), term.to_string())];
        let mut records = self.api.index(kind.resource(), &params)?;

        match records.len() {
            0 => Err(ResolveError::IdentityNotFound {
                kind,
                term: term.to_string(),
            }),
            1 => {
                let identity: Identity = decode(records.remove(0))?;
                Ok(identity.id.to_string())
            }
            matches => Err(ResolveError::IdentityAmbiguous {
                kind,
                term: term.to_string(),
                matches,
            }),
        }
    }
}

/// Builds patch queries for one command against one server
pub struct FilterResolver<'a> {
    api: &'a dyn PatchworkApi,
    identities: Box<dyn IdentityFilter + 'a>,
}

impl<'a> FilterResolver<'a> {
    /// Pick the identity strategy from the server's API version
    pub fn new(api: &'a dyn PatchworkApi) -> Self {
        let identities: Box<dyn IdentityFilter + 'a> = if api.version().supports_text_filters() {
            Box::new(Passthrough)
        } else {
            Box::new(LookupById::new(api))
        };

        Self { api, identities }
    }

    /// Build the query for a patch listing
    pub fn resolve(&self, request: &FilterRequest) -> Result<ResolvedQuery> {
        debug!(
            "Resolving filters: states={}, submitters={}, delegates={}, archived={}",
            request.states.join(","),
            request.submitters.join(","),
            request.delegates.join(","),
            request.archived
        );

        self.warn_multiple_filters(IdentityKind::Submitter, &request.submitters);
        self.warn_multiple_filters(IdentityKind::Delegate, &request.delegates);

        let mut query = ResolvedQuery::default();

        for state in &request.states {
            query.push("state", state);
        }

        for (kind, terms) in [
            (IdentityKind::Submitter, &request.submitters),
            (IdentityKind::Delegate, &request.delegates),
        ] {
            for term in terms {
                let value = self.identities.resolve(kind, term)?;
                query.push(kind.param(), value);
            }
        }

        if let Some(name) = &request.name {
            query.push("q", name);
        }

        query.push("archived", request.archived);

        if let Some(page) = request.page {
            query.push("page", page);
        }
        if let Some(limit) = request.limit {
            query.push("per_page", limit);
        }
        query.push("order", request.sort);

        Ok(query)
    }

    /// Resolve the single delegate of a patch update
    pub fn resolve_delegate(&self, term: &str) -> Result<String> {
        self.identities.resolve(IdentityKind::Delegate, term)
    }

    fn warn_multiple_filters(&self, kind: IdentityKind, terms: &[String]) {
        let version = self.api.version();
        if repeated_filter_unsupported(version, terms.len()) {
            warn!(
                "The `--{}` filter was given {} times. Filtering by multiple {}s \
                 may not be supported by API version {}; use version {} or later \
                 if the server provides it.",
                kind,
                terms.len(),
                kind,
                version,
                ApiVersion::V1_1
            );
        }
    }
}

/// Whether the server may ignore all but one value of a repeated
/// submitter/delegate filter
fn repeated_filter_unsupported(version: ApiVersion, count: usize) -> bool {
    count > 1 && !version.supports_text_filters()
}
