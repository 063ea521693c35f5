use thiserror::Error;

pub type Result<T> = std::result::Result<T, MonitorError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MonitorError {
    /// The process list could not be taken at all. Aborts one refresh cycle.
    #[error("process enumeration failed: {0}")]
    EnumerationFailed(String),

    /// The process exited or its counters are not readable.
    #[error("process {pid} is unavailable")]
    ProcessUnavailable { pid: u32 },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
