//! Core events emitted by the orchestrator

use cabinet_config::Imagery;
use cabinet_util::ProcessId;

use crate::LaunchPhase;

/// Events emitted by one orchestrator step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreEvent {
    /// The active phase changed
    PhaseChanged { from: LaunchPhase, to: LaunchPhase },

    /// Imagery was painted; `complete` is false if any surface failed
    ImageryShown { imagery: Imagery, complete: bool },

    /// Display rotation finished; `all_ok` is false if any display failed
    DisplaysRotated { all_ok: bool },

    /// A reachability probe failed
    ProbeFailed { attempt: u32 },

    /// The external launcher was run
    LaunchInvoked { ok: bool },

    /// The game process was found in the process table
    ProcessFound { pid: ProcessId },

    /// Window wait finished; `confirmed` is false when it timed out
    WindowConfirmed { pid: ProcessId, confirmed: bool },

    /// The game stopped reporting alive
    ProcessExited { pid: ProcessId },

    /// The game reports alive again under the same identifier
    ProcessReturned { pid: ProcessId },
}
