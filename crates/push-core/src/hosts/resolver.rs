//! Resolve an operator-supplied name to hostnames.

use crate::confirm::Confirmer;
use crate::ui;

use super::HostTable;

/// Hosts a name resolved to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    pub hosts: Vec<String>,
    /// The name, when it matched nothing and the operator declined it
    pub ignored: Option<String>,
}

pub struct HostResolver<'a> {
    table: &'a HostTable,
    confirmer: &'a dyn Confirmer,
}

impl<'a> HostResolver<'a> {
    pub fn new(table: &'a HostTable, confirmer: &'a dyn Confirmer) -> Self {
        Self { table, confirmer }
    }

    /// Resolve `name` to the hosts it refers to.
    ///
    /// 1. A tag contributes every host carrying it.
    /// 2. A registered hostname contributes itself.
    /// 3. If neither matched, the operator may confirm using `name` literally.
    ///    Declining yields no hosts, a warning, and the name in
    ///    [`Resolution::ignored`].
    ///
    /// Duplicates are kept; deploying twice to a host is idempotent.
    pub fn resolve(&self, name: &str) -> anyhow::Result<Resolution> {
        let mut hosts = Vec::new();
        let mut ignored = None;

        if let Some(tagged) = self.table.hosts_for_tag(name) {
            hosts.extend(tagged.iter().cloned());
        }

        if self.table.is_server(name) {
            hosts.push(name.to_string());
        }

        if hosts.is_empty() {
            let question = format!(
                "No server or tag named \"{name}\" found in host list. Should we deploy directly to \"{name}\"?"
            );
            if self.confirmer.confirm(&question)? {
                hosts.push(name.to_string());
            } else {
                ui::warn(format!(
                    "Ignoring \"{name}\" because it is not a valid server or tag name."
                ));
                ignored = Some(name.to_string());
            }
        }

        tracing::debug!(name, ?hosts, "resolved hosts");
        Ok(Resolution { hosts, ignored })
    }
}
