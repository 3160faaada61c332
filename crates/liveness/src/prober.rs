//! Stream endpoint probing over HTTP.

use crate::types::{LIVE_STATUS_CODES, ProbeOutcome, ProberSettings};
use async_trait::async_trait;
use std::time::Instant;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Probes one endpoint URL for liveness.
///
/// Implementations must never fault to the caller: every transport error,
/// timeout or rejected status folds into `false`.
#[async_trait]
pub trait EndpointProber: Send + Sync {
    /// Check whether `url` currently serves a working stream.
    async fn probe(&self, url: &str) -> bool;
}

/// HTTP prober backed by a shared client.
///
/// Only the response head is read; stream bodies are never downloaded. A
/// 200 is accepted, as are 301/302 (an upstream that redirects is treated
/// as working even when the hop limit stops the client short of the final
/// target).
pub struct HttpProber {
    client: reqwest::Client,
    settings: ProberSettings,
}

impl HttpProber {
    /// Create a new HTTP prober
    pub fn new(settings: ProberSettings) -> common::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .user_agent(settings.user_agent.clone())
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(common::Error::probe)?;

        Ok(Self { client, settings })
    }

    /// Probe `url` and return the full outcome
    pub async fn check(&self, url: &str) -> ProbeOutcome {
        let start = Instant::now();

        if url.trim().is_empty() {
            debug!("probe skipped: empty URL");
            return ProbeOutcome::dead(start.elapsed(), "Empty URL");
        }

        match timeout(self.settings.timeout, self.client.get(url).send()).await {
            Ok(Ok(response)) => {
                let duration = start.elapsed();
                let status_code = response.status().as_u16();

                if LIVE_STATUS_CODES.contains(&status_code) {
                    debug!(url, status = status_code, duration_ms = duration.as_millis() as u64,
                           "probe passed");
                    ProbeOutcome::live(duration, status_code)
                } else {
                    debug!(url, status = status_code, "probe failed: rejected status code");
                    let mut outcome = ProbeOutcome::dead(
                        duration,
                        format!("Rejected status code: {}", status_code),
                    );
                    outcome.response_code = Some(status_code);
                    outcome
                }
            }
            Ok(Err(e)) => {
                let duration = start.elapsed();
                if e.is_timeout() {
                    debug!(url, "probe timed out");
                    ProbeOutcome::timeout(duration)
                } else {
                    debug!(url, error = %e, "probe failed");
                    ProbeOutcome::error(duration, format!("Request failed: {}", e))
                }
            }
            Err(_) => {
                let duration = start.elapsed();
                warn!(url, "probe exceeded total deadline");
                ProbeOutcome::timeout(duration)
            }
        }
    }
}

#[async_trait]
impl EndpointProber for HttpProber {
    async fn probe(&self, url: &str) -> bool {
        self.check(url).await.is_live()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProbeStatus;
    use std::time::Duration;

    fn test_prober() -> HttpProber {
        HttpProber::new(ProberSettings {
            timeout: Duration::from_millis(200),
            ..ProberSettings::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_empty_url_is_dead_without_network() {
        let prober = test_prober();

        let outcome = prober.check("").await;
        assert_eq!(outcome.status, ProbeStatus::Dead);
        // No network call: resolved essentially instantly
        assert!(outcome.duration < Duration::from_millis(50));

        let outcome = prober.check("   ").await;
        assert_eq!(outcome.status, ProbeStatus::Dead);
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_not_live() {
        // Nothing listens on port 1; connection refused folds to false
        let prober = test_prober();
        assert!(!prober.probe("http://127.0.0.1:1/stream.ts").await);
    }

    #[tokio::test]
    async fn test_malformed_url_is_not_live() {
        let prober = test_prober();
        assert!(!prober.probe("not a url").await);
    }
}
