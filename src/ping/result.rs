//! Result types for ping sessions

use serde::{Deserialize, Serialize};
use std::collections::hash_map::{self, HashMap};
use std::time::Duration;

/// Outcome of a multi-host ping session, keyed by host as given
///
/// A host maps to `Some(rtt)` when a matching echo reply came back in time
/// and to `None` when it did not resolve, timed out, or failed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PingResults {
    entries: HashMap<String, Option<Duration>>,
}

impl PingResults {
    /// Create an empty result set
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, host: impl Into<String>, rtt: Option<Duration>) {
        self.entries.insert(host.into(), rtt);
    }

    /// Round-trip time recorded for `host`
    ///
    /// The outer `Option` is `None` when `host` was not part of the session.
    pub fn get(&self, host: &str) -> Option<Option<Duration>> {
        self.entries.get(host).copied()
    }

    /// Whether `host` was part of the session
    pub fn contains(&self, host: &str) -> bool {
        self.entries.contains_key(host)
    }

    /// Number of hosts in the result set
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the result set is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(host, rtt)` pairs in no particular order
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<Duration>)> {
        self.entries.iter().map(|(host, rtt)| (host.as_str(), *rtt))
    }

    /// Hosts that answered, sorted by round-trip time
    pub fn reachable(&self) -> Vec<(&str, Duration)> {
        let mut hosts: Vec<_> = self
            .entries
            .iter()
            .filter_map(|(host, rtt)| rtt.map(|rtt| (host.as_str(), rtt)))
            .collect();
        hosts.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(b.0)));
        hosts
    }

    /// Hosts that did not answer, sorted by name
    pub fn unreachable(&self) -> Vec<&str> {
        let mut hosts: Vec<_> = self
            .entries
            .iter()
            .filter(|(_, rtt)| rtt.is_none())
            .map(|(host, _)| host.as_str())
            .collect();
        hosts.sort_unstable();
        hosts
    }

    /// Mean round-trip time over the hosts that answered
    pub fn average_rtt(&self) -> Option<Duration> {
        let rtts: Vec<Duration> = self.entries.values().filter_map(|rtt| *rtt).collect();
        if rtts.is_empty() {
            return None;
        }
        let total: Duration = rtts.iter().sum();
        Some(total / rtts.len() as u32)
    }
}

impl IntoIterator for PingResults {
    type Item = (String, Option<Duration>);
    type IntoIter = hash_map::IntoIter<String, Option<Duration>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl FromIterator<(String, Option<Duration>)> for PingResults {
    fn from_iter<I: IntoIterator<Item = (String, Option<Duration>)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
