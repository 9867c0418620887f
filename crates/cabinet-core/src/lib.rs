//! Core launch orchestration for the cabinet launcher
//!
//! This crate is the heart of the launcher, containing:
//! - The cooperative wait primitive (every wait keeps the message queue pumped)
//! - Splash surface management and display orientation
//! - The reachability gate
//! - Game process discovery and liveness supervision
//! - The launch state machine
//!   (Booting -> AwaitingNetwork -> Launching -> AwaitingProcess -> Supervising)

mod events;
mod gate;
mod orchestrator;
mod orientation;
mod phase;
mod pump;
mod supervisor;
mod surfaces;

pub use events::*;
pub use gate::*;
pub use orchestrator::*;
pub use orientation::*;
pub use phase::*;
pub use pump::*;
pub use supervisor::*;
pub use surfaces::*;
