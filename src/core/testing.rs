use std::collections::HashSet;
use std::time::Duration;

use super::error::{MonitorError, Result};
use super::process::{CpuReading, CpuTimes, ProcessEntry};
use super::source::ProcessSource;

struct FakeProcess {
    pid: u32,
    name: String,
    start_time: u64,
    kernel: Duration,
    user: Duration,
}

/// Scripted process table with a manual clock.
pub struct FakeSource {
    processes: Vec<FakeProcess>,
    unreadable: HashSet<u32>,
    wall: Duration,
    cores: usize,
    enumeration_fails: bool,
}

impl FakeSource {
    pub fn new(cores: usize) -> Self {
        Self {
            processes: Vec::new(),
            unreadable: HashSet::new(),
            wall: Duration::ZERO,
            cores,
            enumeration_fails: false,
        }
    }

    pub fn spawn(&mut self, pid: u32, name: &str, start_time: u64) -> &mut Self {
        self.processes.push(FakeProcess {
            pid,
            name: name.to_string(),
            start_time,
            kernel: Duration::ZERO,
            user: Duration::ZERO,
        });
        self
    }

    pub fn kill(&mut self, pid: u32) -> &mut Self {
        self.processes.retain(|process| process.pid != pid);
        self
    }

    /// Charges `kernel_ms` + `user_ms` of CPU time to `pid`.
    pub fn burn(&mut self, pid: u32, kernel_ms: u64, user_ms: u64) -> &mut Self {
        if let Some(process) = self.processes.iter_mut().find(|process| process.pid == pid) {
            process.kernel += Duration::from_millis(kernel_ms);
            process.user += Duration::from_millis(user_ms);
        }
        self
    }

    pub fn advance(&mut self, ms: u64) -> &mut Self {
        self.wall += Duration::from_millis(ms);
        self
    }

    /// Makes opening `pid` fail, as for a protected or just-exited process.
    pub fn deny(&mut self, pid: u32) -> &mut Self {
        self.unreadable.insert(pid);
        self
    }

    pub fn set_enumeration_fails(&mut self, fails: bool) -> &mut Self {
        self.enumeration_fails = fails;
        self
    }
}

impl ProcessSource for FakeSource {
    fn enumerate(&mut self) -> Result<Vec<ProcessEntry>> {
        if self.enumeration_fails {
            return Err(MonitorError::EnumerationFailed("snapshot refused".to_string()));
        }
        Ok(self
            .processes
            .iter()
            .map(|process| ProcessEntry::new(process.pid, process.name.clone()))
            .collect())
    }

    fn read_times(&self, pid: u32) -> Result<CpuReading> {
        if self.unreadable.contains(&pid) {
            return Err(MonitorError::ProcessUnavailable { pid });
        }
        let process = self
            .processes
            .iter()
            .find(|process| process.pid == pid)
            .ok_or(MonitorError::ProcessUnavailable { pid })?;

        Ok(CpuReading {
            start_time: process.start_time,
            times: CpuTimes::new(process.kernel, process.user),
            wall: self.wall,
        })
    }

    fn logical_cores(&self) -> usize {
        self.cores
    }
}
