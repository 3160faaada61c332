//! Per-group candidate lists and current indices.

use crate::types::{Candidate, ChannelGroups};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

/// One group's ordered candidates plus the position currently considered
/// active.
#[derive(Debug, Clone, Default)]
pub struct GroupEntry {
    pub candidates: Vec<Candidate>,
    pub current: usize,
}

impl GroupEntry {
    /// Current index clamped into range. A stale index left behind by a
    /// shrinking reload reads as 0, never as a fault.
    pub fn current_in_range(&self) -> usize {
        if self.current < self.candidates.len() {
            self.current
        } else {
            0
        }
    }
}

/// The group -> (candidates, current index) mapping.
///
/// Mutated only through atomic operations under a single lock; every other
/// component works on point-in-time copies, so probes never run with this
/// lock held. Critical sections are short in-memory work only.
#[derive(Debug, Default)]
pub struct GroupStore {
    groups: RwLock<HashMap<String, GroupEntry>>,
}

impl GroupStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Deep copy of every group. Out-of-range indices are corrected in
    /// place while the lock is held.
    pub async fn snapshot(&self) -> HashMap<String, GroupEntry> {
        let mut groups = self.groups.write().await;
        for entry in groups.values_mut() {
            entry.current = entry.current_in_range();
        }
        groups.clone()
    }

    /// The candidate at each non-empty group's current index.
    pub async fn current_selection(&self) -> HashMap<String, (usize, Candidate)> {
        let groups = self.groups.read().await;
        groups
            .iter()
            .filter(|(_, entry)| !entry.candidates.is_empty())
            .map(|(name, entry)| {
                let idx = entry.current_in_range();
                (name.clone(), (idx, entry.candidates[idx].clone()))
            })
            .collect()
    }

    /// Advance a group's current index by one position, wrapping.
    ///
    /// Returns the new index, or `None` for an unknown or empty group
    /// (a no-op, not an error).
    pub async fn advance(&self, group: &str) -> Option<usize> {
        let mut groups = self.groups.write().await;
        match groups.get_mut(group) {
            Some(entry) if !entry.candidates.is_empty() => {
                let from = entry.current_in_range();
                entry.current = (from + 1) % entry.candidates.len();
                debug!(group, from, to = entry.current, "advanced current index");
                Some(entry.current)
            }
            _ => {
                debug!(group, "index advance for unknown or empty group ignored");
                None
            }
        }
    }

    /// Replace every candidate list wholesale.
    ///
    /// A surviving group keeps its current index when still in range and
    /// falls back to 0 otherwise; vanished groups lose their state; new
    /// groups start at 0.
    pub async fn replace_all(&self, new_groups: ChannelGroups) {
        let mut groups = self.groups.write().await;
        let mut next = HashMap::with_capacity(new_groups.len());

        for (name, candidates) in new_groups {
            let current = groups
                .get(&name)
                .map(|old| old.current)
                .filter(|&idx| idx < candidates.len())
                .unwrap_or(0);
            next.insert(name, GroupEntry { candidates, current });
        }

        *groups = next;
    }

    /// Write chosen indices back after a verification pass.
    ///
    /// Only groups still present are touched; a reload that removed a
    /// group mid-pass must not resurrect it, and an index that no longer
    /// fits the (possibly reloaded) list is discarded.
    pub async fn commit_indices(&self, chosen: &HashMap<String, usize>) {
        let mut groups = self.groups.write().await;
        for (name, idx) in chosen {
            if let Some(entry) = groups.get_mut(name)
                && *idx < entry.candidates.len()
            {
                entry.current = *idx;
            }
        }
    }

    /// Number of groups currently held
    pub async fn len(&self) -> usize {
        self.groups.read().await.len()
    }

    /// Whether the store holds no groups
    pub async fn is_empty(&self) -> bool {
        self.groups.read().await.is_empty()
    }
}
