//! Core types for the failover engine.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::time::Duration;

/// One candidate stream endpoint belonging to a channel group.
///
/// Only `url` means anything to the engine. Everything else is display
/// metadata owned by the channel-list collaborator and carried through to
/// the read API untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Upstream stream URL
    pub url: String,

    /// Optional display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Any further fields supplied by the channel list, passed through
    /// unmodified
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Candidate {
    /// Create a bare candidate from a URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            name: None,
            extra: Map::new(),
        }
    }
}

/// Channel groups as supplied by the channel-list collaborator: canonical
/// group name to ordered candidate list.
pub type ChannelGroups = HashMap<String, Vec<Candidate>>;

/// The selection served to readers: one believed-working candidate per
/// group. Groups with no working candidate are simply absent.
pub type ActiveStreams = HashMap<String, Candidate>;

/// Engine tuning knobs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSettings {
    /// How long a completed selection stays fresh
    #[serde(with = "humantime_serde")]
    pub cache_ttl: Duration,

    /// Probe pool width for full passes and monitor sweeps
    pub concurrency: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(300),
            concurrency: 3,
        }
    }
}
