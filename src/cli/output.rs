//! Output rendering shared by the patch commands

use std::io::Write;
use std::process::{Command, Stdio};

use anyhow::Result;
use chrono::{DateTime, NaiveDateTime, Utc};
use clap::ValueEnum;
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};
use tracing::debug;

use crate::api::Patch;

/// Longest patch name shown in listings
const NAME_WIDTH: usize = 70;

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// Raw JSON records as returned by the server
    Json,
}

#[derive(Tabled)]
struct PatchRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Submitter")]
    submitter: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Archived")]
    archived: &'static str,
    #[tabled(rename = "Delegate")]
    delegate: String,
}

#[derive(Tabled)]
struct PropertyRow {
    #[tabled(rename = "Property")]
    property: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

/// Table of patches for `patch list`
pub fn patch_table(patches: &[Patch], now: DateTime<Utc>) -> String {
    let rows = patches.iter().map(|patch| PatchRow {
        id: patch.id,
        date: patch
            .date
            .as_deref()
            .map(|d| humanize(d, now))
            .unwrap_or_default(),
        name: trim(&patch.name, NAME_WIDTH),
        submitter: patch.submitter.display(),
        state: patch.state.clone().unwrap_or_default(),
        archived: if patch.archived { "yes" } else { "no" },
        delegate: patch.delegate_name().to_string(),
    });

    Table::new(rows).with(Style::psql()).to_string()
}

/// Property/value table for a single patch
pub fn patch_detail_table(patch: &Patch) -> String {
    let text = |value: &Option<String>| value.clone().unwrap_or_default();

    let mut rows = vec![
        PropertyRow {
            property: "ID",
            value: patch.id.to_string(),
        },
        PropertyRow {
            property: "Message ID",
            value: text(&patch.msgid),
        },
        PropertyRow {
            property: "Date",
            value: text(&patch.date),
        },
        PropertyRow {
            property: "Name",
            value: patch.name.clone(),
        },
        PropertyRow {
            property: "URL",
            value: text(&patch.web_url),
        },
        PropertyRow {
            property: "Submitter",
            value: patch.submitter.display(),
        },
        PropertyRow {
            property: "State",
            value: text(&patch.state),
        },
        PropertyRow {
            property: "Archived",
            value: patch.archived.to_string(),
        },
        PropertyRow {
            property: "Project",
            value: patch.project.name.clone(),
        },
        PropertyRow {
            property: "Delegate",
            value: patch.delegate_name().to_string(),
        },
        PropertyRow {
            property: "Commit Ref",
            value: text(&patch.commit_ref),
        },
    ];

    // Label only the first series row
    for (i, series) in patch.series.iter().enumerate() {
        rows.push(PropertyRow {
            property: if i == 0 { "Series" } else { "" },
            value: format!(
                "{:<4} {}",
                series.id,
                series.name.as_deref().filter(|n| !n.is_empty()).unwrap_or("-")
            ),
        });
    }

    Table::new(rows).with(Style::psql()).to_string()
}

/// Pretty-printed JSON
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Shorten `value` to `width` characters, ending in `...` when cut
pub fn trim(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }

    let kept: String = value.chars().take(width.saturating_sub(3)).collect();
    format!("{}...", kept)
}

/// Relative time such as "3 days ago"; unparseable dates are returned as-is
pub fn humanize(date: &str, now: DateTime<Utc>) -> String {
    let parsed = DateTime::parse_from_rfc3339(date)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            NaiveDateTime::parse_from_str(date, "%Y-%m-%dT%H:%M:%S%.f").map(|dt| dt.and_utc())
        });

    match parsed {
        Ok(timestamp) => {
            let duration = now.signed_duration_since(timestamp);
            let formatter = timeago::Formatter::new();
            formatter.convert(duration.to_std().unwrap_or_default())
        }
        Err(_) => date.to_string(),
    }
}

/// Print through the pager when stdout is a terminal
pub fn echo_via_pager(text: &str, pager: Option<String>) -> Result<()> {
    let pager = match pager {
        Some(pager) if console::Term::stdout().is_term() => pager,
        _ => {
            println!("{}", text);
            return Ok(());
        }
    };

    let mut parts = pager.split_whitespace();
    let Some(program) = parts.next() else {
        println!("{}", text);
        return Ok(());
    };

    match Command::new(program).args(parts).stdin(Stdio::piped()).spawn() {
        Ok(mut child) => {
            if let Some(mut stdin) = child.stdin.take() {
                // Quitting the pager early closes the pipe
                let _ = writeln!(stdin, "{}", text);
            }
            child.wait()?;
        }
        Err(e) => {
            debug!("Pager '{}' unavailable: {}", pager, e);
            println!("{}", text);
        }
    }

    Ok(())
}
