use std::io;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, PoisonError, TryLockError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use super::monitor::CpuMonitor;
use super::source::ProcessSource;

pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Refreshed,
    Failed,
    /// Another refresh held the monitor.
    Skipped,
}

/// Runs one refresh unless one is already in flight.
pub fn run_tick<S: ProcessSource>(monitor: &Mutex<CpuMonitor<S>>) -> TickOutcome {
    let mut monitor = match monitor.try_lock() {
        Ok(guard) => guard,
        Err(TryLockError::WouldBlock) => {
            debug!("refresh still in flight, skipping tick");
            return TickOutcome::Skipped;
        }
        Err(TryLockError::Poisoned(poisoned)) => {
            warn!("monitor lock poisoned, recovering");
            poisoned.into_inner()
        }
    };

    match monitor.refresh() {
        Ok(_) => TickOutcome::Refreshed,
        Err(_) => TickOutcome::Failed,
    }
}

enum Command {
    Reset,
    Stop,
}

/// Dedicated thread that refreshes the monitor once per interval.
pub struct RefreshWorker {
    commands: Sender<Command>,
    handle: Option<JoinHandle<()>>,
}

impl RefreshWorker {
    pub fn spawn<S>(monitor: Arc<Mutex<CpuMonitor<S>>>, interval: Duration) -> io::Result<Self>
    where
        S: ProcessSource + Send + 'static,
    {
        let (commands, receiver) = mpsc::channel();

        let handle = thread::Builder::new()
            .name("cputop-refresh".to_string())
            .spawn(move || {
                info!("refresh worker started, interval {:?}", interval);
                let mut deadline = Instant::now() + interval;

                loop {
                    let wait = deadline.saturating_duration_since(Instant::now());
                    match receiver.recv_timeout(wait) {
                        Ok(Command::Reset) => {
                            info!("resetting counters");
                            monitor
                                .lock()
                                .unwrap_or_else(PoisonError::into_inner)
                                .reset();
                            continue;
                        }
                        Ok(Command::Stop) | Err(RecvTimeoutError::Disconnected) => break,
                        Err(RecvTimeoutError::Timeout) => {}
                    }

                    run_tick(&*monitor);

                    deadline += interval;
                    let now = Instant::now();
                    if deadline <= now {
                        debug!("refresh overran its interval, coalescing missed ticks");
                        deadline = now + interval;
                    }
                }

                info!("refresh worker stopped");
            })?;

        Ok(Self {
            commands,
            handle: Some(handle),
        })
    }

    /// Drops all counter state on the refresh thread. The panel stays empty
    /// until the next scheduled tick has a second sample to compare against.
    pub fn request_reset(&self) {
        let _ = self.commands.send(Command::Reset);
    }

    /// Stops the thread, letting an in-flight refresh finish first.
    pub fn shutdown(&mut self) {
        let _ = self.commands.send(Command::Stop);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("refresh worker panicked");
            }
        }
    }
}

impl Drop for RefreshWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}
