use std::time::{Duration, Instant};

use sysinfo::{CpuRefreshKind, Pid, ProcessRefreshKind, ProcessesToUpdate, RefreshKind, System};

use super::error::{MonitorError, Result};
use super::process::{CpuReading, CpuTimes, ProcessEntry};

/// Where the refresher gets its process list and counters from.
pub trait ProcessSource {
    /// Takes a fresh list of running processes, in a stable order.
    fn enumerate(&mut self) -> Result<Vec<ProcessEntry>>;

    /// Reads the counters of one process from the latest enumeration.
    fn read_times(&self, pid: u32) -> Result<CpuReading>;

    fn logical_cores(&self) -> usize;
}

/// Process source backed by `sysinfo`.
///
/// `sysinfo` reports kernel and user time as one accumulated figure, so the
/// whole amount is carried in `CpuTimes::user`. Only the sum is ever used.
///
/// Threads that `sysinfo` lists as tasks of their own (Linux) are left out:
/// their time is already part of the owning process.
pub struct SysinfoSource {
    system: System,
    origin: Instant,
    refreshed_at: Duration,
    logical_cores: usize,
}

impl SysinfoSource {
    pub fn new() -> Self {
        let refresh_kind = RefreshKind::nothing().with_cpu(CpuRefreshKind::nothing());
        let system = System::new_with_specifics(refresh_kind);
        let logical_cores = system.cpus().len().max(1);

        Self {
            system,
            origin: Instant::now(),
            refreshed_at: Duration::ZERO,
            logical_cores,
        }
    }
}

impl Default for SysinfoSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessSource for SysinfoSource {
    fn enumerate(&mut self) -> Result<Vec<ProcessEntry>> {
        self.system.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::nothing().with_cpu(),
        );
        self.refreshed_at = self.origin.elapsed();

        let processes = self.system.processes();
        if processes.is_empty() {
            return Err(MonitorError::EnumerationFailed(
                "no processes visible".to_string(),
            ));
        }

        let mut entries: Vec<ProcessEntry> = processes
            .iter()
            .filter(|(_, process)| process.thread_kind().is_none())
            .map(|(pid, process)| {
                ProcessEntry::new(pid.as_u32(), process.name().to_string_lossy())
            })
            .collect();
        entries.sort_by_key(|entry| entry.pid);

        Ok(entries)
    }

    fn read_times(&self, pid: u32) -> Result<CpuReading> {
        let process = self
            .system
            .process(Pid::from_u32(pid))
            .filter(|process| process.thread_kind().is_none())
            .ok_or(MonitorError::ProcessUnavailable { pid })?;

        Ok(CpuReading {
            start_time: process.start_time(),
            times: CpuTimes::new(
                Duration::ZERO,
                Duration::from_millis(process.accumulated_cpu_time()),
            ),
            wall: self.refreshed_at,
        })
    }

    fn logical_cores(&self) -> usize {
        self.logical_cores
    }
}
