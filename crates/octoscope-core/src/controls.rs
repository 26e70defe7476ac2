//! Control parameters supplied by the rendering shell.
//!
//! The shell speaks a query-string interface: `node`, `nofakes`, `nonull`,
//! and `valid_time`. `nofakes=1` and `nonull=1` disable the matching
//! placeholder; any other value, or an absent key, enables it.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::synthesis::SynthesisOptions;

/// Naive valid-time format accepted from the shell, read as UTC.
pub const VALID_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Current control parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlParams {
    /// Store node to read from. `None` keeps the current node.
    pub node: Option<String>,
    /// Insert Fake nodes for dangling origin endpoints.
    pub include_fake_nodes: bool,
    /// Route empty origins to the Null sentinel.
    pub include_null_sentinel: bool,
    /// Valid-time override. `None` or unparseable means "now".
    pub valid_time: Option<String>,
}

impl Default for ControlParams {
    fn default() -> Self {
        Self {
            node: None,
            include_fake_nodes: true,
            include_null_sentinel: true,
            valid_time: None,
        }
    }
}

impl ControlParams {
    /// Parse a raw query string. Unknown keys are ignored; for repeated
    /// keys the first occurrence wins.
    pub fn from_query(query: &str) -> Self {
        let mut node = None;
        let mut nofakes = None;
        let mut nonull = None;
        let mut valid_time = None;

        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            let slot = match &*key {
                "node" => &mut node,
                "nofakes" => &mut nofakes,
                "nonull" => &mut nonull,
                "valid_time" => &mut valid_time,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }

        Self {
            node: node.filter(|node| !node.is_empty()),
            include_fake_nodes: nofakes.as_deref() != Some("1"),
            include_null_sentinel: nonull.as_deref() != Some("1"),
            valid_time: valid_time.filter(|time| !time.is_empty()),
        }
    }

    /// Render back to the query-string form the shell uses.
    pub fn to_query(&self) -> String {
        let mut query = url::form_urlencoded::Serializer::new(String::new());
        if let Some(node) = &self.node {
            query.append_pair("node", node);
        }
        if !self.include_fake_nodes {
            query.append_pair("nofakes", "1");
        }
        if !self.include_null_sentinel {
            query.append_pair("nonull", "1");
        }
        if let Some(valid_time) = &self.valid_time {
            query.append_pair("valid_time", valid_time);
        }
        query.finish()
    }

    /// The synthesis flags these parameters select.
    pub const fn options(&self) -> SynthesisOptions {
        SynthesisOptions {
            include_fake_nodes: self.include_fake_nodes,
            include_null_sentinel: self.include_null_sentinel,
        }
    }
}

/// Resolve a valid-time override against `now`.
///
/// Accepts [`VALID_TIME_FORMAT`] (as UTC) and RFC 3339. Anything else,
/// including an empty string, yields `now`.
pub fn resolve_valid_time(raw: Option<&str>, now: DateTime<Utc>) -> DateTime<Utc> {
    let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return now;
    };
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, VALID_TIME_FORMAT) {
        return naive.and_utc();
    }
    DateTime::parse_from_rfc3339(raw).map_or(now, |time| time.with_timezone(&Utc))
}
