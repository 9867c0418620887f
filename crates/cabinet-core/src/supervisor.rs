//! Game process discovery and liveness tracking

use cabinet_host_api::{DisplayHost, ProcessHost};
use cabinet_util::ProcessId;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::{Liveness, Pump};

/// Outcome of waiting for the game's window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowWait {
    /// A visible top-level window was seen and the settle period elapsed
    Confirmed,
    /// No visible window before the timeout. Callers proceed anyway.
    TimedOut,
}

/// Finds the game process and answers liveness questions about it
#[derive(Debug, Clone)]
pub struct ProcessSupervisor {
    executable: String,
    poll_interval: Duration,
    window_settle: Duration,
}

impl ProcessSupervisor {
    pub fn new(executable: impl Into<String>, poll_interval: Duration, window_settle: Duration) -> Self {
        Self {
            executable: executable.into(),
            poll_interval,
            window_settle,
        }
    }

    pub fn executable(&self) -> &str {
        &self.executable
    }

    /// Poll the process table until the executable shows up or `timeout`
    /// elapses
    pub async fn find_by_executable_name<P, D>(
        &self,
        process: &P,
        display: &D,
        pump: &Pump,
        timeout: Duration,
    ) -> Option<ProcessId>
    where
        P: ProcessHost + ?Sized,
        D: DisplayHost + ?Sized,
    {
        let start = Instant::now();
        while start.elapsed() < timeout {
            display.pump_messages();
            if let Some(pid) = process.find_process(&self.executable) {
                info!(
                    executable = %self.executable,
                    pid = %pid,
                    after_ms = start.elapsed().as_millis() as u64,
                    "Game process found"
                );
                return Some(pid);
            }
            pump.wait(display, self.poll_interval).await;
        }

        warn!(executable = %self.executable, timeout_secs = timeout.as_secs(), "Game process not found");
        None
    }

    /// Poll until `pid` owns a visible top-level window, then hold for the
    /// settle period so a half-built window is never acted on
    pub async fn wait_for_visible_window<P, D>(
        &self,
        process: &P,
        display: &D,
        pump: &Pump,
        pid: ProcessId,
        timeout: Duration,
    ) -> WindowWait
    where
        P: ProcessHost + ?Sized,
        D: DisplayHost + ?Sized,
    {
        let start = Instant::now();
        while start.elapsed() < timeout {
            display.pump_messages();
            if process.has_visible_window(pid) {
                debug!(pid = %pid, "Visible window seen, settling");
                pump.wait(display, self.window_settle).await;
                return WindowWait::Confirmed;
            }
            pump.wait(display, self.poll_interval).await;
        }

        warn!(pid = %pid, timeout_secs = timeout.as_secs(), "No visible window, proceeding anyway");
        WindowWait::TimedOut
    }

    pub fn is_alive<P: ProcessHost + ?Sized>(&self, process: &P, pid: ProcessId) -> bool {
        process.is_alive(pid)
    }

    /// Restore, focus and raise the game window. False if it has none.
    pub fn bring_to_front<P: ProcessHost + ?Sized>(&self, process: &P, pid: ProcessId) -> bool {
        match process.bring_to_front(pid) {
            Ok(()) => true,
            Err(e) => {
                warn!(pid = %pid, error = %e, "Could not bring game window to front");
                false
            }
        }
    }
}

/// The discovered game and its last acted-upon liveness.
///
/// The identifier is assigned once and never re-validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupervisedProcess {
    pub pid: ProcessId,
    pub liveness: Liveness,
}

impl SupervisedProcess {
    pub fn new(pid: ProcessId) -> Self {
        Self {
            pid,
            liveness: Liveness::Alive,
        }
    }

    /// Record a raw liveness reading. Returns the new state only when it
    /// differs from the last acted-upon one.
    pub fn observe(&mut self, alive: bool) -> Option<Liveness> {
        let next = if alive { Liveness::Alive } else { Liveness::Dead };
        if next == self.liveness {
            return None;
        }
        self.liveness = next;
        Some(next)
    }
}
