use std::sync::{Arc, PoisonError, RwLock};

use super::process::ProcessSample;

/// Result of one refresh cycle: at most K samples, highest usage first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TopKSnapshot {
    entries: Vec<ProcessSample>,
    cycle: u64,
}

impl TopKSnapshot {
    pub fn new(entries: Vec<ProcessSample>, cycle: u64) -> Self {
        Self { entries, cycle }
    }

    pub fn entries(&self) -> &[ProcessSample] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProcessSample> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of the refresh cycle that produced this snapshot. 0 before the first refresh.
    pub fn cycle(&self) -> u64 {
        self.cycle
    }
}

/// The published snapshot, shared between the refresh worker and the renderer.
///
/// Publishing swaps the whole `Arc`, so a reader holds either the previous or
/// the next snapshot and never a partially written one. Locks are held only
/// for the swap or the clone.
#[derive(Debug, Clone, Default)]
pub struct SharedSnapshot {
    inner: Arc<RwLock<Arc<TopKSnapshot>>>,
}

impl SharedSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Arc<TopKSnapshot> {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    pub(crate) fn publish(&self, snapshot: TopKSnapshot) -> Arc<TopKSnapshot> {
        let snapshot = Arc::new(snapshot);
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Arc::clone(&snapshot);
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        let shared = SharedSnapshot::new();
        let current = shared.current();
        assert!(current.is_empty());
        assert_eq!(current.cycle(), 0);
    }

    #[test]
    fn publish_replaces_the_whole_list() {
        let shared = SharedSnapshot::new();
        let reader = shared.clone();

        shared.publish(TopKSnapshot::new(
            vec![
                ProcessSample::new(1, "a", 50.0),
                ProcessSample::new(2, "b", 40.0),
                ProcessSample::new(3, "c", 30.0),
            ],
            1,
        ));
        let held = reader.current();

        shared.publish(TopKSnapshot::new(vec![ProcessSample::new(4, "d", 20.0)], 2));

        assert_eq!(held.len(), 3);
        let latest = reader.current();
        assert_eq!(latest.len(), 1);
        assert_eq!(latest.entries()[0].name, "d");
        assert_eq!(latest.cycle(), 2);
    }
}
