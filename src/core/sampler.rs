use std::collections::{HashMap, HashSet};
use std::time::Duration;

use super::process::{CpuReading, CpuTimes};

/// Counters retained from the previous sample of one process.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CounterState {
    pub start_time: u64,
    pub times: CpuTimes,
    pub wall: Duration,
}

impl From<&CpuReading> for CounterState {
    fn from(reading: &CpuReading) -> Self {
        Self {
            start_time: reading.start_time,
            times: reading.times,
            wall: reading.wall,
        }
    }
}

/// Computes CPU usage in percent of the whole machine from the change in
/// counters since `previous`.
///
/// Returns 0 when there is nothing to compare against: no previous state, a
/// previous state that belongs to an earlier process with the same pid, or
/// two readings taken at the same instant.
pub fn sample(
    reading: &CpuReading,
    previous: Option<&CounterState>,
    logical_cores: usize,
) -> (f64, CounterState) {
    let updated = CounterState::from(reading);

    let previous = match previous {
        Some(prev) if prev.start_time == reading.start_time => prev,
        _ => return (0.0, updated),
    };

    let wall_delta = reading.wall.saturating_sub(previous.wall);
    if wall_delta.is_zero() {
        return (0.0, updated);
    }

    let cpu_delta = reading.times.since(&previous.times);
    let cores = logical_cores.max(1) as f64;
    let usage = 100.0 * cpu_delta.as_secs_f64() / (wall_delta.as_secs_f64() * cores);

    (usage.clamp(0.0, 100.0), updated)
}

/// Counter state of every process seen in the latest enumeration, by pid.
#[derive(Debug, Default)]
pub struct CounterTable {
    states: HashMap<u32, CounterState>,
}

impl CounterTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Samples `pid` against its retained state and stores the new state.
    pub fn observe(&mut self, pid: u32, reading: &CpuReading, logical_cores: usize) -> f64 {
        let (usage, updated) = sample(reading, self.states.get(&pid), logical_cores);
        self.states.insert(pid, updated);
        usage
    }

    /// Drops state for every pid not in `live`. Returns how many were evicted.
    pub fn retain_live(&mut self, live: &HashSet<u32>) -> usize {
        let before = self.states.len();
        self.states.retain(|pid, _| live.contains(pid));
        before - self.states.len()
    }

    #[cfg(test)]
    pub fn get(&self, pid: u32) -> Option<&CounterState> {
        self.states.get(&pid)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn clear(&mut self) {
        self.states.clear();
    }
}
