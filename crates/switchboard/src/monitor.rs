//! Background monitoring of the currently-selected candidates.

use crate::engine::Engine;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::info;

/// Periodic low-frequency watcher.
///
/// Each cycle probes only the candidate at every group's current index and
/// triggers failover for the ones that died, keeping the selection
/// self-healing between TTL-driven full passes.
pub struct ChannelMonitor {
    engine: Arc<Engine>,
    period: Duration,
    stop_signal: Arc<tokio::sync::Notify>,
}

impl ChannelMonitor {
    /// Create a monitor sweeping every `period`
    pub fn new(engine: Arc<Engine>, period: Duration) -> Self {
        Self {
            engine,
            period,
            stop_signal: Arc::new(tokio::sync::Notify::new()),
        }
    }

    /// Start the monitor loop on its own task
    pub async fn start(&self) {
        let engine = self.engine.clone();
        let period = self.period;
        let stop_signal = self.stop_signal.clone();

        tokio::spawn(async move {
            info!(period_secs = period.as_secs(), "channel monitor started");
            let mut sweep_interval = interval(period);
            sweep_interval.tick().await; // Skip first immediate tick

            loop {
                tokio::select! {
                    _ = sweep_interval.tick() => {
                        engine.monitor_sweep().await;
                    }
                    _ = stop_signal.notified() => {
                        info!("channel monitor stopping");
                        break;
                    }
                }
            }
        });
    }

    /// Stop the monitor loop
    pub async fn stop(&self) {
        self.stop_signal.notify_one();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Candidate, EngineSettings};
    use async_trait::async_trait;
    use liveness::EndpointProber;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Prober whose single upstream can be killed at runtime.
    struct SwitchableProber {
        primary_up: AtomicBool,
    }

    #[async_trait]
    impl EndpointProber for SwitchableProber {
        async fn probe(&self, url: &str) -> bool {
            if url.contains("primary") {
                self.primary_up.load(Ordering::SeqCst)
            } else {
                true
            }
        }
    }

    #[tokio::test]
    async fn test_monitor_fails_over_dying_current_candidate() {
        let prober = Arc::new(SwitchableProber {
            primary_up: AtomicBool::new(true),
        });
        let engine = Arc::new(Engine::new(
            prober.clone(),
            EngineSettings::default(),
            None,
        ));

        engine
            .replace_channels(HashMap::from([(
                "news".to_string(),
                vec![
                    Candidate::new("http://primary/news.ts"),
                    Candidate::new("http://backup/news.ts"),
                ],
            )]))
            .await;

        let monitor = ChannelMonitor::new(engine.clone(), Duration::from_millis(50));
        monitor.start().await;

        // Current candidate healthy: selection stays on the primary
        tokio::time::sleep(Duration::from_millis(120)).await;
        let streams = engine.active_streams().await;
        assert_eq!(streams["news"].url, "http://primary/news.ts");

        // Kill the primary; the next sweep must advance the index
        prober.primary_up.store(false, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(150)).await;

        let streams = engine.active_streams().await;
        assert_eq!(streams["news"].url, "http://backup/news.ts");

        monitor.stop().await;
    }

    #[tokio::test]
    async fn test_monitor_sweep_is_noop_without_groups() {
        let prober = Arc::new(SwitchableProber {
            primary_up: AtomicBool::new(true),
        });
        let engine = Arc::new(Engine::new(prober, EngineSettings::default(), None));

        // Must not panic or deadlock on an empty store
        engine.monitor_sweep().await;
    }
}
