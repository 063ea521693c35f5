use std::collections::HashSet;
use std::sync::Arc;

use log::{debug, trace, warn};

use super::error::{MonitorError, Result};
use super::process::ProcessSample;
use super::sampler::CounterTable;
use super::snapshot::{SharedSnapshot, TopKSnapshot};
use super::source::{ProcessSource, SysinfoSource};

pub const DEFAULT_TOP_K: usize = 5;
pub const DEFAULT_THRESHOLD: f64 = 0.1;
pub const MAX_TOP_K: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankingConfig {
    /// How many entries a snapshot holds at most.
    pub top_k: usize,
    /// Samples at or below this usage, in percent, are dropped.
    pub threshold: f64,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl RankingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.top_k == 0 || self.top_k > MAX_TOP_K {
            return Err(MonitorError::InvalidConfig(format!(
                "top_k must be between 1 and {}, got {}",
                MAX_TOP_K, self.top_k
            )));
        }
        if !self.threshold.is_finite() || !(0.0..100.0).contains(&self.threshold) {
            return Err(MonitorError::InvalidConfig(format!(
                "threshold must be in [0, 100), got {}",
                self.threshold
            )));
        }
        Ok(())
    }
}

/// Drops insignificant samples and keeps the `top_k` busiest, highest first.
/// Equal usages keep their input order.
pub fn rank(mut samples: Vec<ProcessSample>, config: &RankingConfig) -> Vec<ProcessSample> {
    samples.retain(|sample| sample.cpu_usage > config.threshold);
    samples.sort_by(|a, b| b.cpu_usage.total_cmp(&a.cpu_usage));
    samples.truncate(config.top_k);
    samples
}

/// Samples every process once per refresh and publishes the busiest ones.
pub struct CpuMonitor<S: ProcessSource = SysinfoSource> {
    source: S,
    counters: CounterTable,
    config: RankingConfig,
    snapshot: SharedSnapshot,
    cycle: u64,
}

impl<S: ProcessSource> CpuMonitor<S> {
    pub fn new(source: S, config: RankingConfig) -> Self {
        Self::with_shared(source, config, SharedSnapshot::new())
    }

    /// Builds a monitor that publishes into an existing snapshot cell.
    ///
    /// Runs one refresh straight away so the first scheduled refresh already
    /// has counters to compare against.
    pub fn with_shared(source: S, config: RankingConfig, snapshot: SharedSnapshot) -> Self {
        let mut instance = Self {
            source,
            counters: CounterTable::new(),
            config,
            snapshot,
            cycle: 0,
        };

        instance.refresh().ok();
        instance
    }

    pub fn snapshot_handle(&self) -> SharedSnapshot {
        self.snapshot.clone()
    }

    /// Number of processes with retained counter state.
    pub fn tracked_processes(&self) -> usize {
        self.counters.len()
    }

    /// Runs one full cycle: enumerate, sample, rank, publish, sweep.
    ///
    /// When the process list cannot be taken the previous snapshot and all
    /// counter state are left as they were.
    pub fn refresh(&mut self) -> Result<Arc<TopKSnapshot>> {
        let entries = match self.source.enumerate() {
            Ok(entries) => entries,
            Err(err) => {
                warn!("refresh abandoned: {}", err);
                return Err(err);
            }
        };

        let priming = self.counters.is_empty();
        let cores = self.source.logical_cores();
        let mut live = HashSet::with_capacity(entries.len());
        let mut samples = Vec::new();

        for entry in entries {
            if !live.insert(entry.pid) {
                continue;
            }

            let reading = match self.source.read_times(entry.pid) {
                Ok(reading) => reading,
                Err(err) => {
                    trace!("skipping {} ({}): {}", entry.pid, entry.name, err);
                    continue;
                }
            };

            let usage = self.counters.observe(entry.pid, &reading, cores);
            samples.push(ProcessSample::new(entry.pid, &entry.name, usage));
        }

        let sampled = samples.len();
        let evicted = self.counters.retain_live(&live);
        let ranked = rank(samples, &self.config);

        self.cycle += 1;
        let snapshot = self.snapshot.publish(TopKSnapshot::new(ranked, self.cycle));
        debug!(
            "cycle {}{}: {} enumerated, {} sampled, {} ranked, {} tracked, {} evicted",
            snapshot.cycle(),
            if priming { " (baseline)" } else { "" },
            live.len(),
            sampled,
            snapshot.len(),
            self.tracked_processes(),
            evicted
        );

        Ok(snapshot)
    }

    /// Forgets all counter state, publishes an empty snapshot and takes a
    /// fresh baseline. Usage figures come back with the next refresh.
    pub fn reset(&mut self) {
        self.counters.clear();
        self.cycle += 1;
        self.snapshot.publish(TopKSnapshot::new(Vec::new(), self.cycle));
        self.refresh().ok();
    }

    #[cfg(test)]
    pub(crate) fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }
}
