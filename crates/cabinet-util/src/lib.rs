//! Shared utilities for the cabinet launcher
//!
//! This crate provides:
//! - ID types (SurfaceId, DeviceId, ProcessId)
//! - Error types

mod error;
mod ids;

pub use error::*;
pub use ids::*;
