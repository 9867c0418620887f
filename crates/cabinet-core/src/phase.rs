//! Launch phases

use std::fmt;

/// Last acted-upon liveness of the supervised game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveness {
    Alive,
    Dead,
}

/// The orchestrator's current stage. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchPhase {
    /// Surfaces exist; displays are being rotated
    Booting,
    /// About to probe the service host
    AwaitingNetwork,
    /// Last probe failed; network-error imagery is up
    AwaitingNetworkRetry,
    /// Splash shown; the launcher is about to run
    Launching,
    /// The launcher could not be run. Terminal.
    LaunchFailed,
    /// Waiting for the game process and its window
    AwaitingProcess,
    /// The game never appeared. Terminal.
    ProcessTimedOut,
    /// Watching the game's liveness
    Supervising(Liveness),
}

impl LaunchPhase {
    /// Terminal phases idle forever; only an external restart leaves them
    pub fn is_terminal(&self) -> bool {
        matches!(self, LaunchPhase::LaunchFailed | LaunchPhase::ProcessTimedOut)
    }
}

impl fmt::Display for LaunchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LaunchPhase::Booting => write!(f, "booting"),
            LaunchPhase::AwaitingNetwork => write!(f, "awaiting-network"),
            LaunchPhase::AwaitingNetworkRetry => write!(f, "awaiting-network-retry"),
            LaunchPhase::Launching => write!(f, "launching"),
            LaunchPhase::LaunchFailed => write!(f, "launch-failed"),
            LaunchPhase::AwaitingProcess => write!(f, "awaiting-process"),
            LaunchPhase::ProcessTimedOut => write!(f, "process-timed-out"),
            LaunchPhase::Supervising(Liveness::Alive) => write!(f, "supervising(alive)"),
            LaunchPhase::Supervising(Liveness::Dead) => write!(f, "supervising(dead)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_phases() {
        assert!(LaunchPhase::LaunchFailed.is_terminal());
        assert!(LaunchPhase::ProcessTimedOut.is_terminal());
        assert!(!LaunchPhase::Supervising(Liveness::Dead).is_terminal());
        assert!(!LaunchPhase::AwaitingNetworkRetry.is_terminal());
    }

    #[test]
    fn display_names() {
        assert_eq!(
            LaunchPhase::Supervising(Liveness::Dead).to_string(),
            "supervising(dead)"
        );
        assert_eq!(LaunchPhase::AwaitingNetwork.to_string(), "awaiting-network");
    }
}
