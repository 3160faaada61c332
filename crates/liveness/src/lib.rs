//! Stream endpoint liveness checking for Switchboard.
//!
//! This crate provides the probing machinery used by the failover engine:
//! - HTTP liveness probes that read only the response head
//! - bounded-concurrency batch scheduling with lossless result collection
//! - round-robin first-live candidate selection
//!
//! # Example
//!
//! ```no_run
//! use liveness::{HttpProber, ProbeScheduler, ProbeTask, ProberSettings};
//! use std::sync::Arc;
//!
//! # async fn example() -> common::Result<()> {
//! let prober = Arc::new(HttpProber::new(ProberSettings::default())?);
//! let scheduler = ProbeScheduler::new(prober, 3);
//!
//! let results = scheduler
//!     .run(vec![
//!         ProbeTask::new("news", 0, "http://upstream-a/news.ts"),
//!         ProbeTask::new("news", 1, "http://upstream-b/news.ts"),
//!     ])
//!     .await;
//!
//! let chosen = liveness::selection::pick_live(
//!     2,
//!     0,
//!     &results
//!         .iter()
//!         .filter(|((group, _), _)| group == "news")
//!         .map(|((_, idx), live)| (*idx, *live))
//!         .collect(),
//! );
//! # let _ = chosen;
//! # Ok(())
//! # }
//! ```

pub mod prober;
pub mod scheduler;
pub mod selection;
pub mod types;

pub use prober::{EndpointProber, HttpProber};
pub use scheduler::{ProbeKey, ProbeScheduler, ProbeTask};
pub use types::{LIVE_STATUS_CODES, ProbeOutcome, ProbeStatus, ProberSettings};

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_probe_status_display() {
        assert_eq!(ProbeStatus::Live.to_string(), "LIVE");
        assert_eq!(ProbeStatus::Dead.to_string(), "DEAD");
        assert_eq!(ProbeStatus::Timeout.to_string(), "TIMEOUT");
        assert_eq!(ProbeStatus::Error.to_string(), "ERROR");
    }

    #[test]
    fn test_probe_outcome() {
        let outcome = ProbeOutcome::live(Duration::from_millis(80), 200);
        assert!(outcome.is_live());
        assert_eq!(outcome.response_code, Some(200));
        assert!(outcome.message.is_none());

        let outcome = ProbeOutcome::timeout(Duration::from_secs(10));
        assert!(!outcome.is_live());
        assert_eq!(outcome.status, ProbeStatus::Timeout);
    }

    #[test]
    fn test_default_settings() {
        let settings = ProberSettings::default();
        assert_eq!(settings.timeout, Duration::from_secs(10));
        assert!(settings.user_agent.starts_with("Mozilla/5.0"));
    }
}
