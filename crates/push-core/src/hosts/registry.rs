//! Host registry loading.
//!
//! The registry tool prints a JSON object keyed by hostname:
//!
//! ```json
//! { "h1.example.com": { "tags": ["web"], "targets": ["noc-1"] } }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use crate::exec::{CommandRunner, Invocation};
use crate::ui;

/// Synthetic tag listing every registered host.
pub const ALL_TAG: &str = "all";

#[derive(Debug, Deserialize)]
struct HostEntry {
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    targets: Option<Vec<String>>,
}

/// Tag and server tables. Read-only once loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostTable {
    /// Tag name to hostnames, in hostname order
    tags: BTreeMap<String, Vec<String>>,
    /// Hostname to deploy targets
    servers: BTreeMap<String, Vec<String>>,
}

impl HostTable {
    /// A table with no hosts; only literal names can be deployed to.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse the registry's JSON document.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let entries: BTreeMap<String, HostEntry> =
            serde_json::from_str(json).context("Host registry returned invalid JSON")?;

        let mut table = Self::default();
        for (hostname, entry) in entries {
            for tag in entry.tags {
                table.add_to_tag(&tag, &hostname);
            }
            table.add_to_tag(ALL_TAG, &hostname);
            table
                .servers
                .insert(hostname, entry.targets.unwrap_or_default());
        }
        Ok(table)
    }

    /// Ask the registry tool for the host list.
    ///
    /// Best effort: a missing tool or unusable output leaves an empty table
    /// and a warning, never an error.
    pub fn load(registry_tool: Option<&Path>, runner: &dyn CommandRunner) -> Self {
        let Some(tool) = registry_tool else {
            ui::warn("Could not find host registry tool. Only literal host names can be used.");
            return Self::empty();
        };

        let invocation = Invocation::new(tool).arg("hosts").captured();
        let loaded = runner
            .run_checked(&invocation)
            .and_then(|output| Self::from_json(&output.stdout));
        match loaded {
            Ok(table) => {
                tracing::debug!(
                    hosts = table.servers.len(),
                    tags = table.tags.len(),
                    "loaded host registry"
                );
                table
            }
            Err(e) => {
                ui::warn(format!("Could not decode host list: {e:#}"));
                Self::empty()
            }
        }
    }

    fn add_to_tag(&mut self, tag: &str, hostname: &str) {
        let hosts = self.tags.entry(tag.to_string()).or_default();
        if !hosts.iter().any(|h| h == hostname) {
            hosts.push(hostname.to_string());
        }
    }

    /// Hosts carrying `tag`, if it is a known tag.
    pub fn hosts_for_tag(&self, tag: &str) -> Option<&[String]> {
        self.tags.get(tag).map(Vec::as_slice)
    }

    pub fn is_server(&self, hostname: &str) -> bool {
        self.servers.contains_key(hostname)
    }

    /// Deploy targets recorded for a host.
    pub fn targets(&self, hostname: &str) -> Option<&[String]> {
        self.servers.get(hostname).map(Vec::as_slice)
    }

    pub fn servers(&self) -> impl Iterator<Item = &str> {
        self.servers.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }
}
