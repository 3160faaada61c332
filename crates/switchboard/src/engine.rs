//! The failover engine: single-flight verification passes, a TTL'd
//! selection cache, and per-group index failover.

use crate::cache::SelectionCache;
use crate::metrics::MetricsRegistry;
use crate::store::GroupStore;
use crate::types::{ActiveStreams, ChannelGroups, EngineSettings};
use liveness::selection::pick_live;
use liveness::{EndpointProber, ProbeScheduler, ProbeTask};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Clears the in-flight flag on every exit path of a pass, fault paths
/// included. Leaking the flag would starve all future passes.
struct PassGuard<'a>(&'a AtomicBool);

impl Drop for PassGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// The liveness and failover engine.
///
/// Holds the group store, the selection cache and the probe scheduler
/// behind three independent synchronization points (store lock, cache
/// lock, pass flag). None of them is ever held across probe I/O, and none
/// is acquired while another is held.
pub struct Engine {
    store: GroupStore,
    cache: SelectionCache,
    scheduler: ProbeScheduler,
    pass_in_flight: AtomicBool,
    metrics: Option<Arc<MetricsRegistry>>,
}

impl Engine {
    /// Create an engine probing through `prober`
    pub fn new(
        prober: Arc<dyn EndpointProber>,
        settings: EngineSettings,
        metrics: Option<Arc<MetricsRegistry>>,
    ) -> Self {
        Self {
            store: GroupStore::new(),
            cache: SelectionCache::new(settings.cache_ttl),
            scheduler: ProbeScheduler::new(prober, settings.concurrency),
            pass_in_flight: AtomicBool::new(false),
            metrics,
        }
    }

    /// Current best-known live selection, one candidate per group.
    ///
    /// Served straight from the cache when fresh; a miss triggers (or
    /// joins) a full verification pass. Never faults to the caller.
    pub async fn active_streams(&self) -> ActiveStreams {
        if let Some(streams) = self.cache.read().await {
            if let Some(ref m) = self.metrics {
                m.record_cache_read(true);
            }
            return streams;
        }

        if let Some(ref m) = self.metrics {
            m.record_cache_read(false);
        }
        self.run_full_pass().await
    }

    /// One complete probe-all-candidates-and-reselect cycle.
    ///
    /// At most one pass runs at a time. A caller that loses the race does
    /// not wait: it gets the cache's current contents, whatever their age,
    /// instead of doubling the upstream load.
    pub async fn run_full_pass(&self) -> ActiveStreams {
        if self
            .pass_in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("full pass already in flight, serving cached selection");
            return self.cache.peek().await;
        }
        let _guard = PassGuard(&self.pass_in_flight);

        let started = Instant::now();

        // Point-in-time copy: probes run against this snapshot with no
        // lock held, while reloads and failovers proceed against the
        // live store.
        let snapshot = self.store.snapshot().await;

        let mut tasks = Vec::new();
        for (name, entry) in &snapshot {
            if entry.candidates.is_empty() {
                debug!(group = %name, "skipping group with no candidates");
                continue;
            }
            for (idx, candidate) in entry.candidates.iter().enumerate() {
                tasks.push(ProbeTask::new(name.clone(), idx, candidate.url.clone()));
            }
        }

        let probed = tasks.len();
        let results = self.scheduler.run(tasks).await;

        if let Some(ref m) = self.metrics {
            for live in results.values() {
                m.record_probe(*live);
            }
        }

        let mut chosen: HashMap<String, usize> = HashMap::new();
        let mut streams = ActiveStreams::new();

        for (name, entry) in &snapshot {
            if entry.candidates.is_empty() {
                continue;
            }

            let by_index: HashMap<usize, bool> = results
                .iter()
                .filter(|((group, _), _)| group == name)
                .map(|((_, idx), live)| (*idx, *live))
                .collect();

            match pick_live(entry.candidates.len(), entry.current, &by_index) {
                Some(idx) => {
                    chosen.insert(name.clone(), idx);
                    streams.insert(name.clone(), entry.candidates[idx].clone());
                }
                None => {
                    warn!(
                        group = %name,
                        candidates = entry.candidates.len(),
                        "no live candidate, group omitted from selection"
                    );
                }
            }
        }

        // Indices move only for groups that survived any concurrent
        // reload; the cache swap is one atomic publication of the pass.
        self.store.commit_indices(&chosen).await;
        self.cache.store(streams.clone()).await;

        info!(
            groups = snapshot.len(),
            live = streams.len(),
            probed,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "full verification pass complete"
        );
        if let Some(ref m) = self.metrics {
            m.record_pass(started.elapsed(), snapshot.len(), streams.len());
        }

        streams
    }

    /// Report a group's current candidate as dead.
    ///
    /// Advances the group's index by one (wrapping) and invalidates the
    /// cache so the next read re-selects from the new position. Unknown
    /// and empty groups are a logged no-op; safe to call repeatedly.
    pub async fn mark_failed(&self, group: &str) {
        match self.store.advance(group).await {
            Some(next) => {
                self.cache.invalidate().await;
                info!(group, next, "failover: advanced to next candidate");
                if let Some(ref m) = self.metrics {
                    m.record_failover(group);
                }
            }
            None => {
                debug!(group, "failover request ignored");
            }
        }
    }

    /// Swap in a new channel list and optimistically publish it.
    ///
    /// Surviving groups keep their index when still in range. The cache
    /// is immediately filled with each group's current candidate,
    /// untested, so readers get a plausible answer at zero latency.
    pub async fn replace_channels(&self, groups: ChannelGroups) {
        info!(groups = groups.len(), "applying channel configuration");
        self.store.replace_all(groups).await;
        self.populate_optimistic().await;
    }

    /// Full configuration reload: replace, publish optimistically, then
    /// verify for real in a detached task.
    pub async fn update_config(self: &Arc<Self>, groups: ChannelGroups) {
        self.replace_channels(groups).await;

        let engine = self.clone();
        tokio::spawn(async move {
            engine.run_full_pass().await;
        });
    }

    /// Fill the cache with the candidate at each non-empty group's
    /// current index, unverified. Counts as a fresh write.
    pub async fn populate_optimistic(&self) {
        let selection = self.store.current_selection().await;
        let streams: ActiveStreams = selection
            .into_iter()
            .map(|(name, (_, candidate))| (name, candidate))
            .collect();
        debug!(groups = streams.len(), "optimistic selection published");
        self.cache.store(streams).await;
    }

    /// One background-monitor sweep: probe only the current candidate of
    /// every non-empty group and fail over the ones that no longer answer.
    ///
    /// Deliberately narrow: it never probes alternates and never runs a
    /// full pass, so a silently dying active stream is caught at a
    /// fraction of a pass's cost.
    pub async fn monitor_sweep(&self) {
        let selection = self.store.current_selection().await;
        if selection.is_empty() {
            return;
        }

        let tasks: Vec<ProbeTask> = selection
            .iter()
            .map(|(name, (idx, candidate))| ProbeTask::new(name.clone(), *idx, candidate.url.clone()))
            .collect();

        debug!(groups = tasks.len(), "monitor sweep of current candidates");
        let results = self.scheduler.run(tasks).await;

        for ((group, _), live) in results {
            if let Some(ref m) = self.metrics {
                m.record_probe(live);
            }
            if !live {
                warn!(group = %group, "current candidate stopped answering");
                self.mark_failed(&group).await;
            }
        }
    }

    /// Number of configured groups
    pub async fn group_count(&self) -> usize {
        self.store.len().await
    }
}
