//! Host adapter trait interfaces for the cabinet launcher
//!
//! This crate defines the interface between the launch orchestrator and the
//! operating system: splash surfaces, display orientation, the process table
//! and network reachability. It contains no platform code itself; the TCP
//! probe is portable and the mock host backs the orchestrator's tests.

mod mock;
mod probe;
mod surface;
mod traits;

pub use mock::*;
pub use probe::*;
pub use surface::*;
pub use traits::*;
