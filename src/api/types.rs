//! Patchwork API types
//!
//! Only the fields the CLI reads are modelled; unknown fields are ignored.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============== People ==============

/// Patch submitter (from `/people/` or embedded in a patch)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Person {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: String,
}

impl Person {
    /// `name (email)` as shown in listings
    pub fn display(&self) -> String {
        format!("{} ({})", self.name.as_deref().unwrap_or(""), self.email)
    }
}

/// Registered user, e.g. a delegate
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Any record that carries a numeric ID
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Identity {
    pub id: u64,
}

// ============== Patches ==============

/// Project a patch belongs to
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectRef {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: String,
}

/// Series summary embedded in a patch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesRef {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
}

/// Patch record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patch {
    pub id: u64,
    #[serde(default)]
    pub msgid: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub web_url: Option<String>,
    #[serde(default)]
    pub mbox: String,
    #[serde(default)]
    pub diff: Option<String>,
    #[serde(default)]
    pub submitter: Person,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub project: ProjectRef,
    #[serde(default)]
    pub delegate: Option<User>,
    #[serde(default)]
    pub commit_ref: Option<String>,
    #[serde(default)]
    pub series: Vec<SeriesRef>,
}

impl Patch {
    /// Delegate username, empty when unassigned
    pub fn delegate_name(&self) -> &str {
        self.delegate
            .as_ref()
            .map(|d| d.username.as_str())
            .unwrap_or("")
    }
}

// ============== Errors ==============

/// Error body returned by the server (Django REST framework style)
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    pub detail: String,
}

// ============== Helpers ==============

/// Decode a raw record into a typed model
pub fn decode<T: DeserializeOwned>(record: Value) -> Result<T> {
    serde_json::from_value(record).context("Unexpected record format from server")
}

/// Decode a list of raw records
pub fn decode_all<T: DeserializeOwned>(records: Vec<Value>) -> Result<Vec<T>> {
    records.into_iter().map(decode).collect()
}
