//! In-memory `PatchworkApi` that records every call

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use serde_json::Value;

use super::{ApiVersion, Params, PatchworkApi};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    Index(String, Vec<(String, String)>),
    Detail(String, u64),
    Update(String, u64, Vec<(String, String)>),
    Download(String, Vec<(String, String)>),
    Get(String),
}

#[derive(Default)]
pub(crate) struct StubApi {
    version: ApiVersion,
    /// Records returned for `index(resource, [("q", term)])`
    lookups: HashMap<(String, String), Vec<Value>>,
    /// Records returned for any other `index(resource, ..)`
    listings: HashMap<String, Vec<Value>>,
    details: HashMap<(String, u64), Value>,
    pages: HashMap<String, String>,
    calls: RefCell<Vec<Call>>,
}

impl StubApi {
    pub fn new(version: ApiVersion) -> Self {
        Self {
            version,
            ..Self::default()
        }
    }

    pub fn with_lookup(mut self, resource: &str, term: &str, records: Vec<Value>) -> Self {
        self.lookups
            .insert((resource.to_string(), term.to_string()), records);
        self
    }

    pub fn with_listing(mut self, resource: &str, records: Vec<Value>) -> Self {
        self.listings.insert(resource.to_string(), records);
        self
    }

    pub fn with_detail(mut self, resource: &str, id: u64, record: Value) -> Self {
        self.details.insert((resource.to_string(), id), record);
        self
    }

    pub fn with_page(mut self, url: &str, body: &str) -> Self {
        self.pages.insert(url.to_string(), body.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    /// Number of `index` calls made against a resource
    pub fn index_calls(&self, resource: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| matches!(c, Call::Index(r, _) if r == resource))
            .count()
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }
}

impl PatchworkApi for StubApi {
    fn version(&self) -> ApiVersion {
        self.version
    }

    fn index(&self, resource: &str, params: &Params) -> Result<Vec<Value>> {
        self.record(Call::Index(resource.to_string(), params.to_vec()));

        if let [(key, term)] = params {
            if key == "q" {
                if let Some(records) = self.lookups.get(&(resource.to_string(), term.clone())) {
                    return Ok(records.clone());
                }
            }
        }

        Ok(self.listings.get(resource).cloned().unwrap_or_default())
    }

    fn detail(&self, resource: &str, id: u64) -> Result<Value> {
        self.record(Call::Detail(resource.to_string(), id));
        self.details
            .get(&(resource.to_string(), id))
            .cloned()
            .ok_or_else(|| anyhow!("Resource not found: {} {}", resource, id))
    }

    fn update(&self, resource: &str, id: u64, data: &Params) -> Result<Value> {
        self.record(Call::Update(resource.to_string(), id, data.to_vec()));
        self.details
            .get(&(resource.to_string(), id))
            .cloned()
            .ok_or_else(|| anyhow!("Resource not found: {} {}", resource, id))
    }

    fn download(&self, url: &str, params: &Params) -> Result<PathBuf> {
        self.record(Call::Download(url.to_string(), params.to_vec()));
        Ok(PathBuf::from("/tmp/git-pw-stub/download.mbox"))
    }

    fn get(&self, url: &str) -> Result<String> {
        self.record(Call::Get(url.to_string()));
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| anyhow!("Resource not found: {}", url))
    }
}
