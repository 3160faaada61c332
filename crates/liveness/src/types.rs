//! Probe types and settings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// HTTP status codes accepted as proof of a live stream endpoint.
pub const LIVE_STATUS_CODES: [u16; 3] = [200, 301, 302];

/// Outcome classification for one probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProbeStatus {
    /// Endpoint answered with an accepted status
    Live,
    /// Endpoint answered, but not with an accepted status
    Dead,
    /// Probe timed out
    Timeout,
    /// Transport-level failure (DNS, connect, TLS, reset)
    Error,
}

impl fmt::Display for ProbeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeStatus::Live => write!(f, "LIVE"),
            ProbeStatus::Dead => write!(f, "DEAD"),
            ProbeStatus::Timeout => write!(f, "TIMEOUT"),
            ProbeStatus::Error => write!(f, "ERROR"),
        }
    }
}

/// Full report for one probe attempt
#[derive(Debug, Clone)]
pub struct ProbeOutcome {
    /// Status of the probe
    pub status: ProbeStatus,

    /// Duration of the probe
    pub duration: Duration,

    /// Optional failure detail
    pub message: Option<String>,

    /// HTTP status code, when a response was received
    pub response_code: Option<u16>,
}

impl ProbeOutcome {
    /// Create a live outcome
    pub fn live(duration: Duration, response_code: u16) -> Self {
        Self {
            status: ProbeStatus::Live,
            duration,
            message: None,
            response_code: Some(response_code),
        }
    }

    /// Create a dead outcome
    pub fn dead(duration: Duration, message: impl Into<String>) -> Self {
        Self {
            status: ProbeStatus::Dead,
            duration,
            message: Some(message.into()),
            response_code: None,
        }
    }

    /// Create a timeout outcome
    pub fn timeout(duration: Duration) -> Self {
        Self {
            status: ProbeStatus::Timeout,
            duration,
            message: Some("Probe timed out".to_string()),
            response_code: None,
        }
    }

    /// Create a transport-error outcome
    pub fn error(duration: Duration, message: impl Into<String>) -> Self {
        Self {
            status: ProbeStatus::Error,
            duration,
            message: Some(message.into()),
            response_code: None,
        }
    }

    /// Whether this outcome counts as a working endpoint
    pub fn is_live(&self) -> bool {
        self.status == ProbeStatus::Live
    }
}

/// Prober configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProberSettings {
    /// Total timeout for connection plus response head
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,

    /// User-agent header sent with every probe. Some upstreams reject the
    /// default library agent outright.
    pub user_agent: String,
}

impl Default for ProberSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            user_agent: "Mozilla/5.0 (X11; Linux x86_64; rv:125.0) Gecko/20100101 Firefox/125.0"
                .to_string(),
        }
    }
}
