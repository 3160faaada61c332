//! Bounded fan-out scheduling of probes.

use crate::prober::EndpointProber;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// One probe submission: the group it belongs to, the candidate's position
/// within that group, and the URL to check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeTask {
    pub group: String,
    pub index: usize,
    pub url: String,
}

impl ProbeTask {
    /// Create a new probe task
    pub fn new(group: impl Into<String>, index: usize, url: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            index,
            url: url.into(),
        }
    }
}

/// Result key: one slot per submitted (group, index) pair.
pub type ProbeKey = (String, usize);

/// Runs batches of probes with a bounded number in flight.
///
/// Every submitted task gets exactly one slot in the result map, pre-seeded
/// `false`. A task that completes overwrites its slot; a task that dies
/// leaves the default in place, so a fault reads as "not working" rather
/// than as a missing entry.
pub struct ProbeScheduler {
    prober: Arc<dyn EndpointProber>,
    width: usize,
}

impl ProbeScheduler {
    /// Create a scheduler running at most `width` probes concurrently.
    /// The width is kept deliberately low by callers to avoid hammering
    /// upstream providers.
    pub fn new(prober: Arc<dyn EndpointProber>, width: usize) -> Self {
        Self {
            prober,
            width: width.max(1),
        }
    }

    /// Execute every task and block until the whole batch has drained.
    pub async fn run(&self, tasks: Vec<ProbeTask>) -> HashMap<ProbeKey, bool> {
        let mut results: HashMap<ProbeKey, bool> = tasks
            .iter()
            .map(|task| ((task.group.clone(), task.index), false))
            .collect();

        if tasks.is_empty() {
            return results;
        }

        debug!(tasks = tasks.len(), width = self.width, "running probe batch");

        let limiter = Arc::new(Semaphore::new(self.width));
        let mut batch = JoinSet::new();

        for task in tasks {
            let prober = self.prober.clone();
            let limiter = limiter.clone();

            batch.spawn(async move {
                // The semaphore is never closed while the batch drains, but
                // a closed permit must still resolve to a result slot.
                let _permit = match limiter.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => return ((task.group, task.index), false),
                };

                let live = prober.probe(&task.url).await;
                ((task.group, task.index), live)
            });
        }

        while let Some(joined) = batch.join_next().await {
            match joined {
                Ok((key, live)) => {
                    results.insert(key, live);
                }
                Err(e) => {
                    // The slot keeps its pre-seeded false
                    warn!(error = %e, "probe task died before reporting");
                }
            }
        }

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Prober that reports live iff the URL ends with "/ok", tracking the
    /// peak number of concurrent probes.
    struct ScriptedProber {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    impl ScriptedProber {
        fn new() -> Self {
            Self {
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl EndpointProber for ScriptedProber {
        async fn probe(&self, url: &str) -> bool {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            url.ends_with("/ok")
        }
    }

    /// Prober that panics on a marker URL.
    struct PanickyProber;

    #[async_trait]
    impl EndpointProber for PanickyProber {
        async fn probe(&self, url: &str) -> bool {
            if url.contains("boom") {
                panic!("probe blew up");
            }
            true
        }
    }

    #[tokio::test]
    async fn test_every_submission_gets_a_result() {
        let prober = Arc::new(ScriptedProber::new());
        let scheduler = ProbeScheduler::new(prober, 3);

        let tasks = vec![
            ProbeTask::new("news", 0, "http://a/ok"),
            ProbeTask::new("news", 1, "http://b/down"),
            ProbeTask::new("sports", 0, "http://c/ok"),
        ];

        let results = scheduler.run(tasks).await;
        assert_eq!(results.len(), 3);
        assert!(results[&("news".to_string(), 0)]);
        assert!(!results[&("news".to_string(), 1)]);
        assert!(results[&("sports".to_string(), 0)]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrency_stays_within_width() {
        let prober = Arc::new(ScriptedProber::new());
        let scheduler = ProbeScheduler::new(prober.clone(), 3);

        let tasks: Vec<_> = (0..12)
            .map(|i| ProbeTask::new("bulk", i, format!("http://host-{}/ok", i)))
            .collect();

        let results = scheduler.run(tasks).await;
        assert_eq!(results.len(), 12);
        assert!(results.values().all(|live| *live));
        assert!(prober.peak.load(Ordering::SeqCst) <= 3);
    }

    #[tokio::test]
    async fn test_panicking_task_yields_false_and_spares_the_rest() {
        let scheduler = ProbeScheduler::new(Arc::new(PanickyProber), 2);

        let tasks = vec![
            ProbeTask::new("movies", 0, "http://fine"),
            ProbeTask::new("movies", 1, "http://boom"),
            ProbeTask::new("movies", 2, "http://also-fine"),
        ];

        let results = scheduler.run(tasks).await;
        assert_eq!(results.len(), 3);
        assert!(results[&("movies".to_string(), 0)]);
        assert!(!results[&("movies".to_string(), 1)]);
        assert!(results[&("movies".to_string(), 2)]);
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let scheduler = ProbeScheduler::new(Arc::new(ScriptedProber::new()), 3);
        let results = scheduler.run(Vec::new()).await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_zero_width_is_clamped() {
        let scheduler = ProbeScheduler::new(Arc::new(ScriptedProber::new()), 0);
        let results = scheduler.run(vec![ProbeTask::new("news", 0, "http://a/ok")]).await;
        assert!(results[&("news".to_string(), 0)]);
    }
}
