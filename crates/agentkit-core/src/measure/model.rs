//! Trace snapshot wire shapes
//!
//! Durations are carried as human-readable strings (`15ms`, `500ns`).
//! Field names follow the camelCase wire form.

use serde::{Deserialize, Serialize};

/// One recorded latency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TracedEntry {
    /// Position in the tracer's append sequence (starts at 1)
    pub index: u32,
    /// Name of the timed entity
    pub msg_name: String,
    /// Measured duration
    pub duration: String,
}

/// Mean latency of all entries sharing a name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Average {
    /// Name of the timed entity
    pub msg_name: String,
    /// Truncated integer-nanosecond mean
    pub average_time: String,
}

/// Point-in-time copy of a tracer ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trace {
    /// Entries in append order
    pub traced_entries: Vec<TracedEntry>,
    /// Per-name averages; order is not significant
    pub average_times: Vec<Average>,
    /// Sum of all recorded durations
    pub overall: String,
}

impl Trace {
    /// Snapshot of an empty ledger
    pub fn empty() -> Self {
        Self {
            traced_entries: Vec::new(),
            average_times: Vec::new(),
            overall: format_duration(std::time::Duration::ZERO),
        }
    }

    /// Look up the average for a name
    pub fn average_for(&self, name: &str) -> Option<&str> {
        self.average_times
            .iter()
            .find(|avg| avg.msg_name == name)
            .map(|avg| avg.average_time.as_str())
    }

    /// Serialize the snapshot to JSON
    pub fn to_json(&self) -> Result<String, crate::Error> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Default for Trace {
    fn default() -> Self {
        Self::empty()
    }
}

/// Render a duration in its compact human form
pub fn format_duration(duration: std::time::Duration) -> String {
    format!("{duration:?}")
}
