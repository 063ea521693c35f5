use std::time::Duration;

/// Longest display name kept for a process, in characters.
pub const MAX_NAME_LEN: usize = 260;

/// One row of the process list as returned by enumeration.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessEntry {
    pub pid: u32,
    pub name: String,
}

impl ProcessEntry {
    pub fn new(pid: u32, name: impl Into<String>) -> Self {
        Self {
            pid,
            name: name.into(),
        }
    }
}

/// Accumulated CPU time a process has spent in kernel and user mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CpuTimes {
    pub kernel: Duration,
    pub user: Duration,
}

impl CpuTimes {
    pub fn new(kernel: Duration, user: Duration) -> Self {
        Self { kernel, user }
    }

    /// Time spent since `earlier`, saturating at zero when a counter went backwards.
    pub fn since(&self, earlier: &CpuTimes) -> Duration {
        self.kernel.saturating_sub(earlier.kernel) + self.user.saturating_sub(earlier.user)
    }
}

/// Counter reading for one process at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CpuReading {
    /// Process start time in seconds since the epoch. Tells a recycled pid
    /// apart from the process that used it before.
    pub start_time: u64,
    pub times: CpuTimes,
    /// Monotonic wall-clock timestamp of the reading.
    pub wall: Duration,
}

/// A ranked entry of a published snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessSample {
    pub pid: u32,
    pub name: String,
    pub cpu_usage: f64,
}

impl ProcessSample {
    pub fn new(pid: u32, name: &str, cpu_usage: f64) -> Self {
        Self {
            pid,
            name: truncate_name(name),
            cpu_usage,
        }
    }
}

fn truncate_name(name: &str) -> String {
    match name.char_indices().nth(MAX_NAME_LEN) {
        Some((idx, _)) => name[..idx].to_string(),
        None => name.to_string(),
    }
}
